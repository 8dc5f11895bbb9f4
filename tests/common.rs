use std::net::SocketAddr;
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::sync::watch;
use vanish_server::api::{MgmtState, ServiceContainer};
use vanish_server::config::{
    AuthConfig, Config, LogFormat, PubSubConfig, RateLimitConfig, ServerConfig, StoreBackend, StoreConfig,
    TelemetryConfig,
};
use vanish_server::pubsub::{Broadcast, local::LocalBroadcast};
use vanish_server::services::{HealthService, MessageService, NotificationRelay, RoomService};
use vanish_server::storage::{Store, memory::MemoryStore};

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("vanish_server=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

#[allow(dead_code)]
pub fn get_test_config(lifetime_secs: u64) -> Config {
    Config {
        room_lifetime_secs: lifetime_secs,
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 0, mgmt_port: 0 },
        auth: AuthConfig { token_secret: "test_secret".to_string() },
        store: StoreConfig { backend: StoreBackend::Memory, redis_url: "redis://127.0.0.1:6379".to_string() },
        pubsub: PubSubConfig { channel_capacity: 64, min_backoff_secs: 1, max_backoff_secs: 5 },
        rate_limit: RateLimitConfig { per_second: 10_000, burst: 10_000 },
        telemetry: TelemetryConfig { log_format: LogFormat::Text },
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub api_url: String,
    pub ws_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub bus: Arc<LocalBroadcast>,
    pub shutdown_tx: watch::Sender<bool>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_lifetime(600).await
    }

    pub async fn spawn_with_lifetime(lifetime_secs: u64) -> Self {
        setup_tracing();
        let config = get_test_config(lifetime_secs);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let bus = Arc::new(LocalBroadcast::new(config.pubsub.channel_capacity));
        let broadcast: Arc<dyn Broadcast> = Arc::clone(&bus) as Arc<dyn Broadcast>;

        let relay = NotificationRelay::new(Arc::clone(&broadcast));
        let lifetime = Duration::from_secs(config.room_lifetime_secs);
        let room_service =
            RoomService::new(Arc::clone(&store), relay.clone(), lifetime, config.auth.token_secret.clone());
        let message_service = MessageService::new(Arc::clone(&store), relay);
        let health_service = HealthService::new(Arc::clone(&store));

        let services = ServiceContainer { room_service, message_service, broadcast };
        let app_router = vanish_server::api::app_router(config, services, shutdown_rx.clone());
        let mgmt_app = vanish_server::api::mgmt_router(MgmtState { health_service });

        let api_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let api_addr = api_listener.local_addr().unwrap();
        let mgmt_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_addr = mgmt_listener.local_addr().unwrap();

        let mut api_rx = shutdown_rx.clone();
        tokio::spawn(async move {
            axum::serve(api_listener, app_router.into_make_service_with_connect_info::<SocketAddr>())
                .with_graceful_shutdown(async move {
                    let _ = api_rx.wait_for(|&s| s).await;
                })
                .await
                .unwrap();
        });

        let mut mgmt_rx = shutdown_rx;
        tokio::spawn(async move {
            axum::serve(mgmt_listener, mgmt_app.into_make_service_with_connect_info::<SocketAddr>())
                .with_graceful_shutdown(async move {
                    let _ = mgmt_rx.wait_for(|&s| s).await;
                })
                .await
                .unwrap();
        });

        Self {
            api_url: format!("http://{api_addr}"),
            ws_url: format!("ws://{api_addr}"),
            mgmt_url: format!("http://{mgmt_addr}"),
            client: reqwest::Client::new(),
            bus,
            shutdown_tx,
        }
    }

    /// Creates a room and returns `(room_id, token)`.
    pub async fn create_room(&self) -> (String, String) {
        let resp = self.client.post(format!("{}/v1/rooms", self.api_url)).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = resp.json().await.unwrap();
        (
            body["roomId"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn post_message(&self, token: &str, sender: &str, text: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/v1/messages", self.api_url))
            .bearer_auth(token)
            .json(&serde_json::json!({ "sender": sender, "text": text }))
            .send()
            .await
            .unwrap()
    }

    pub async fn list_messages(&self, token: &str) -> reqwest::Response {
        self.client.get(format!("{}/v1/messages", self.api_url)).bearer_auth(token).send().await.unwrap()
    }

    pub async fn room_ttl(&self, token: &str) -> reqwest::Response {
        self.client.get(format!("{}/v1/rooms/ttl", self.api_url)).bearer_auth(token).send().await.unwrap()
    }

    pub async fn destroy_room(&self, token: &str) -> reqwest::Response {
        self.client.delete(format!("{}/v1/rooms", self.api_url)).bearer_auth(token).send().await.unwrap()
    }
}
