use async_trait::async_trait;
use std::fmt;
use tokio::sync::broadcast;

pub mod local;
pub mod redis;

/// Name of the broadcast channel carrying a room's events.
#[must_use]
pub fn room_channel(room_id: &str) -> String {
    format!("room:{room_id}")
}

#[derive(Debug, Clone)]
pub struct BroadcastMessage {
    pub channel: String,
    pub payload: Vec<u8>,
}

/// The publish/subscribe collaborator, at its interface boundary: named
/// events delivered to all current subscribers of a channel, at-least-once,
/// best-effort ordering, no backlog for late joiners.
#[async_trait]
pub trait Broadcast: fmt::Debug + Send + Sync {
    /// Publishes a payload to a channel. Delivery to any particular
    /// subscriber is best-effort.
    async fn publish(&self, channel: &str, payload: &[u8]) -> anyhow::Result<()>;

    /// Subscribes to a channel. Only events published after this call are
    /// received; reconnecting clients re-derive state instead of replaying.
    async fn subscribe(&self, channel: &str) -> anyhow::Result<broadcast::Receiver<BroadcastMessage>>;
}
