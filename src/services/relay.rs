use crate::domain::{Message, RoomEvent};
use crate::pubsub::{Broadcast, room_channel};
use std::sync::Arc;

/// Publishes room events to the broadcast channel. Delivery is best-effort:
/// a failed publish is logged and swallowed, because a subscriber that
/// misses an event can always recover full state by re-reading the log and
/// polling the remaining lifetime.
#[derive(Debug, Clone)]
pub struct NotificationRelay {
    broadcast: Arc<dyn Broadcast>,
}

impl NotificationRelay {
    #[must_use]
    pub fn new(broadcast: Arc<dyn Broadcast>) -> Self {
        Self { broadcast }
    }

    pub async fn message_appended(&self, room_id: &str, message: &Message) {
        self.publish(room_id, &RoomEvent::MessageAppended(message.clone())).await;
    }

    pub async fn room_destroyed(&self, room_id: &str) {
        self.publish(room_id, &RoomEvent::destroyed()).await;
    }

    async fn publish(&self, room_id: &str, event: &RoomEvent) {
        let payload = match serde_json::to_vec(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, room_id, "Failed to serialize room event");
                return;
            }
        };

        if let Err(e) = self.broadcast.publish(&room_channel(room_id), &payload).await {
            tracing::warn!(error = %e, room_id, "Failed to publish room event");
        }
    }
}
