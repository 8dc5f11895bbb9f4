use crate::config::{LogFormat, TelemetryConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the tracing subscriber with an env-filter and the configured
/// output format.
///
/// # Errors
/// Returns an error if a subscriber has already been installed.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into())
        .add_directive("hyper=warn".parse()?)
        .add_directive("tower=warn".parse()?);

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json().with_current_span(true)).try_init()?,
        LogFormat::Text => registry.with(fmt::layer()).try_init()?,
    }

    Ok(())
}
