#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::Instrument;
use vanish_server::api::{MgmtState, ServiceContainer};
use vanish_server::config::Config;
use vanish_server::services::{HealthService, MessageService, NotificationRelay, RoomService};
use vanish_server::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    telemetry::init_telemetry(&config.telemetry)?;

    let boot_span = tracing::info_span!("boot_server");
    let (api_listener, mgmt_listener, app_router, mgmt_app, shutdown_tx, shutdown_rx) = async {
        // Phase 1: Infrastructure
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        vanish_server::spawn_signal_handler(shutdown_tx.clone());

        let (store, broadcast) = vanish_server::init_backends(&config, shutdown_rx.clone()).await?;

        // Phase 2: Component wiring
        let relay = NotificationRelay::new(Arc::clone(&broadcast));
        let lifetime = Duration::from_secs(config.room_lifetime_secs);
        let room_service =
            RoomService::new(Arc::clone(&store), relay.clone(), lifetime, config.auth.token_secret.clone());
        let message_service = MessageService::new(Arc::clone(&store), relay);
        let health_service = HealthService::new(Arc::clone(&store));

        // Phase 3: Listeners and routers
        let services = ServiceContainer { room_service, message_service, broadcast };
        let app_router = vanish_server::api::app_router(config.clone(), services, shutdown_rx.clone());
        let mgmt_app = vanish_server::api::mgmt_router(MgmtState { health_service });

        let api_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let mgmt_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.mgmt_port).parse()?;

        tracing::info!(address = %api_addr, "listening");
        tracing::info!(address = %mgmt_addr, "management server listening");

        let api_listener = tokio::net::TcpListener::bind(api_addr).await?;
        let mgmt_listener = tokio::net::TcpListener::bind(mgmt_addr).await?;

        Ok::<
            (
                tokio::net::TcpListener,
                tokio::net::TcpListener,
                axum::Router,
                axum::Router,
                watch::Sender<bool>,
                watch::Receiver<bool>,
            ),
            anyhow::Error,
        >((api_listener, mgmt_listener, app_router, mgmt_app, shutdown_tx, shutdown_rx))
    }
    .instrument(boot_span)
    .await?;

    // Phase 4: Serve
    let mut api_rx = shutdown_rx.clone();
    let api_server = axum::serve(api_listener, app_router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = api_rx.wait_for(|&s| s).await;
        });

    let mut mgmt_rx = shutdown_rx.clone();
    let mgmt_server = axum::serve(mgmt_listener, mgmt_app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = mgmt_rx.wait_for(|&s| s).await;
        });

    if let Err(e) = tokio::try_join!(api_server, mgmt_server) {
        tracing::error!(error = %e, "Server error");
    }

    // Phase 5: Shutdown. Rooms need no draining: whatever is left in the
    // store dies by its own TTL. The brief pause lets event sessions flush
    // their close frames.
    let _ = shutdown_tx.send(true);
    tokio::time::sleep(Duration::from_millis(100)).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
