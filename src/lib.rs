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

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod pubsub;
pub mod services;
pub mod storage;
pub mod telemetry;

use std::sync::Arc;
use tokio::sync::watch;

/// Spawns a task that flips the shutdown watch channel on SIGINT/SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    return;
                }
            };
            tokio::select! {
                _ = ctrl_c => {}
                _ = sigterm.recv() => {}
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}

/// Builds the store and broadcast backends selected by the configuration.
///
/// # Errors
/// Returns an error if the Redis connection cannot be established.
pub async fn init_backends(
    config: &config::Config,
    shutdown_rx: watch::Receiver<bool>,
) -> anyhow::Result<(Arc<dyn storage::Store>, Arc<dyn pubsub::Broadcast>)> {
    match config.store.backend {
        config::StoreBackend::Redis => {
            let client = pubsub::redis::RedisPubSub::new(&config.store, config.pubsub.clone(), shutdown_rx).await?;
            let store: Arc<dyn storage::Store> = Arc::new(storage::redis::RedisStore::new(client.publisher()));
            let broadcast: Arc<dyn pubsub::Broadcast> = client;
            Ok((store, broadcast))
        }
        config::StoreBackend::Memory => {
            let store: Arc<dyn storage::Store> = Arc::new(storage::memory::MemoryStore::new());
            let broadcast: Arc<dyn pubsub::Broadcast> =
                Arc::new(pubsub::local::LocalBroadcast::new(config.pubsub.channel_capacity));
            Ok((store, broadcast))
        }
    }
}
