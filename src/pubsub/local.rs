use crate::pubsub::{Broadcast, BroadcastMessage};
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

/// In-process broadcast transport, paired with the in-memory store. Same
/// no-backlog semantics as the Redis transport: events published before a
/// subscribe are gone.
#[derive(Debug)]
pub struct LocalBroadcast {
    channels: DashMap<String, broadcast::Sender<BroadcastMessage>>,
    capacity: usize,
}

impl LocalBroadcast {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { channels: DashMap::new(), capacity }
    }
}

#[async_trait]
impl Broadcast for LocalBroadcast {
    async fn publish(&self, channel: &str, payload: &[u8]) -> anyhow::Result<()> {
        // No receivers attached is not a failure, but it does mean the room
        // this channel served is gone or abandoned; reap the entry so the
        // map does not grow with every room ever subscribed.
        let orphaned = self
            .channels
            .get(channel)
            .is_some_and(|tx| tx.send(BroadcastMessage { channel: channel.to_string(), payload: payload.to_vec() }).is_err());

        if orphaned {
            self.channels.remove_if(channel, |_, tx| tx.receiver_count() == 0);
        }
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> anyhow::Result<broadcast::Receiver<BroadcastMessage>> {
        let tx = self
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Ok(tx.subscribe())
    }
}
