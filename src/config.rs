use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// How long a room (and everything in it) lives, in seconds
    #[arg(long, env = "VANISH_ROOM_LIFETIME_SECS", default_value_t = 600)]
    pub room_lifetime_secs: u64,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub auth: AuthConfig,

    #[command(flatten)]
    pub store: StoreConfig,

    #[command(flatten)]
    pub pubsub: PubSubConfig,

    #[command(flatten)]
    pub rate_limit: RateLimitConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "VANISH_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "VANISH_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the management (health probe) server
    #[arg(long, env = "VANISH_MGMT_PORT", default_value_t = 3001)]
    pub mgmt_port: u16,
}

#[derive(Clone, Debug, Args)]
pub struct AuthConfig {
    /// Secret key for signing room capability tokens
    #[arg(long, env = "VANISH_TOKEN_SECRET")]
    pub token_secret: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Redis-backed store and pub/sub (production)
    Redis,
    /// In-process store and broadcast, nothing survives a restart
    Memory,
}

#[derive(Clone, Debug, Args)]
pub struct StoreConfig {
    /// Which store/broadcast backend to use
    #[arg(long, env = "VANISH_STORE", value_enum, default_value = "redis")]
    pub backend: StoreBackend,

    /// Redis connection URL
    #[arg(long, env = "VANISH_REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,
}

#[derive(Clone, Debug, Args)]
pub struct PubSubConfig {
    /// Capacity of each per-room broadcast channel
    #[arg(long, env = "VANISH_CHANNEL_CAPACITY", default_value_t = 64)]
    pub channel_capacity: usize,

    /// Minimum backoff between pub/sub reconnect attempts
    #[arg(long, env = "VANISH_PUBSUB_MIN_BACKOFF_SECS", default_value_t = 1)]
    pub min_backoff_secs: u64,

    /// Maximum backoff between pub/sub reconnect attempts
    #[arg(long, env = "VANISH_PUBSUB_MAX_BACKOFF_SECS", default_value_t = 30)]
    pub max_backoff_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct RateLimitConfig {
    /// Requests per second allowed per client
    #[arg(long, env = "VANISH_RATE_LIMIT_PER_SECOND", default_value_t = 10)]
    pub per_second: u32,

    /// Burst allowance per client
    #[arg(long, env = "VANISH_RATE_LIMIT_BURST", default_value_t = 20)]
    pub burst: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "VANISH_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }
}
