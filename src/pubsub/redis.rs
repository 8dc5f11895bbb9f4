use crate::config::{PubSubConfig, StoreConfig};
use crate::pubsub::{Broadcast, BroadcastMessage};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use dashmap::DashMap;
use futures::StreamExt;
use redis::AsyncCommands;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::Instrument;

/// How often an idle listener checks whether anyone is still subscribed.
const IDLE_CHECK_PERIOD: std::time::Duration = std::time::Duration::from_secs(30);

/// Why a channel listener left its message loop.
enum ListenerExit {
    Reconnect,
    Idle,
    Shutdown,
}

/// Redis pub/sub transport. One background listener task per subscribed
/// channel fans messages out over a tokio broadcast channel; listeners
/// reconnect with exponential backoff and exit on shutdown.
///
/// Channels here are per-room and rooms churn constantly, so a listener
/// must not outlive its audience: once the last receiver is gone the task
/// exits and its subscription map entry is reaped, instead of holding a
/// dedicated Redis connection for the life of the process.
#[derive(Debug)]
pub struct RedisPubSub {
    publisher: redis::aio::ConnectionManager,
    subscriptions: Arc<DashMap<String, broadcast::Sender<BroadcastMessage>>>,
    client: redis::Client,
    shutdown: watch::Receiver<bool>,
    config: PubSubConfig,
}

impl RedisPubSub {
    /// Connects to Redis and prepares the shared publisher connection.
    ///
    /// # Errors
    /// Returns an error if the connection fails.
    pub async fn new(
        store: &StoreConfig,
        config: PubSubConfig,
        shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<Arc<Self>> {
        let client = redis::Client::open(store.redis_url.as_str())?;
        let publisher = client.get_connection_manager().await?;
        let subscriptions = Arc::new(DashMap::new());

        Ok(Arc::new(Self { publisher, subscriptions, client, shutdown, config }))
    }

    /// Returns a connection usable for standard Redis commands; the store
    /// shares it.
    #[must_use]
    pub fn publisher(&self) -> redis::aio::ConnectionManager {
        self.publisher.clone()
    }

    async fn run_channel_listener(
        client: redis::Client,
        channel: String,
        tx: broadcast::Sender<BroadcastMessage>,
        mut shutdown: watch::Receiver<bool>,
        subscriptions: Arc<DashMap<String, broadcast::Sender<BroadcastMessage>>>,
        config: PubSubConfig,
        ready_tx: tokio::sync::oneshot::Sender<()>,
    ) {
        let retry_strategy = ExponentialBuilder::default()
            .with_min_delay(std::time::Duration::from_secs(config.min_backoff_secs))
            .with_max_delay(std::time::Duration::from_secs(config.max_backoff_secs));

        let mut ready_tx = Some(ready_tx);
        let mut idle = tokio::time::interval(IDLE_CHECK_PERIOD);

        loop {
            let pubsub_result = (|| async {
                let mut pubsub = client.get_async_pubsub().await?;
                pubsub.subscribe(&channel).await?;
                Ok::<redis::aio::PubSub, redis::RedisError>(pubsub)
            })
            .retry(&retry_strategy)
            .when(|e| {
                tracing::warn!(error = %e, "Failed to subscribe to pubsub, retrying...");
                true
            })
            .notify(|e, duration| {
                tracing::debug!("Pubsub subscription retry in {:?} due to error: {:?}", duration, e);
            })
            .await;

            let pubsub: redis::aio::PubSub = match pubsub_result {
                Ok(ps) => ps,
                Err(e) => {
                    tracing::error!(error = %e, "Pubsub subscription failed after retries");
                    subscriptions.remove(&channel);
                    return;
                }
            };

            tracing::info!(channel = %channel, "Successfully subscribed to pubsub");
            if let Some(rtx) = ready_tx.take() {
                let _ = rtx.send(());
            }

            let mut message_stream = pubsub.into_on_message();

            let exit = loop {
                tokio::select! {
                    _ = shutdown.changed() => break ListenerExit::Shutdown,
                    _ = idle.tick() => {
                        if tx.receiver_count() == 0 {
                            break ListenerExit::Idle;
                        }
                    }
                    msg = message_stream.next() => {
                        if let Some(msg) = msg {
                            let broadcast_msg = BroadcastMessage {
                                channel: msg.get_channel_name().to_string(),
                                payload: msg.get_payload().unwrap_or_default(),
                            };
                            // A send error means the last subscriber is
                            // gone; the room this channel served has been
                            // destroyed or abandoned.
                            if tx.send(broadcast_msg).is_err() {
                                break ListenerExit::Idle;
                            }
                        } else {
                            tracing::warn!(channel = %channel, "Pubsub connection lost, reconnecting...");
                            break ListenerExit::Reconnect;
                        }
                    }
                }
            };

            match exit {
                ListenerExit::Reconnect => {}
                ListenerExit::Shutdown => {
                    subscriptions.remove(&channel);
                    return;
                }
                ListenerExit::Idle => {
                    // A subscriber may have re-attached between the last
                    // check and now; only reap if the channel is still
                    // unwatched, otherwise keep listening for it.
                    if subscriptions.remove_if(&channel, |_, t| t.receiver_count() == 0).is_some() {
                        tracing::debug!(channel = %channel, "Reaped idle pubsub channel");
                        return;
                    }
                }
            }

            if *shutdown.borrow() {
                subscriptions.remove(&channel);
                return;
            }
        }
    }
}

#[async_trait]
impl Broadcast for RedisPubSub {
    async fn publish(&self, channel: &str, payload: &[u8]) -> anyhow::Result<()> {
        let mut conn = self.publisher();
        let _: () = conn.publish(channel, payload).await?;
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> anyhow::Result<broadcast::Receiver<BroadcastMessage>> {
        if let Some(tx) = self.subscriptions.get(channel) {
            return Ok(tx.subscribe());
        }

        let (tx, rx) = broadcast::channel(self.config.channel_capacity);
        self.subscriptions.insert(channel.to_string(), tx.clone());

        let channel_str = channel.to_string();
        let client = self.client.clone();
        let shutdown = self.shutdown.clone();
        let subscriptions = Arc::clone(&self.subscriptions);
        let config = self.config.clone();

        // Used to wait for the first successful subscription, so no event
        // published right after this call returns can be missed.
        let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();

        tokio::spawn(
            async move {
                Self::run_channel_listener(client, channel_str, tx, shutdown, subscriptions, config, ready_tx).await;
            }
            .instrument(tracing::debug_span!("pubsub_listener", channel = %channel)),
        );

        let _ = ready_rx.await;

        Ok(rx)
    }
}
