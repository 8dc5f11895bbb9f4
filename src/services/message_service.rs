use crate::domain::message::{Message, StoredMessage, validate_input};
use crate::error::{AppError, Result};
use crate::services::relay::NotificationRelay;
use crate::storage::Store;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// A message as returned to a reader: the stored record minus the token
/// fingerprint, plus a flag telling the reader whether they posted it. No
/// party's raw token, or hash, is ever echoed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    pub sender: String,
    pub text: String,
    pub timestamp: i64,
    pub room_id: String,
    pub mine: bool,
}

impl MessageView {
    fn from_record(record: StoredMessage, reader_token_hash: &str) -> Self {
        let mine = record.token_hash == reader_token_hash;
        let m = record.message;
        Self { id: m.id, sender: m.sender, text: m.text, timestamp: m.timestamp, room_id: m.room_id, mine }
    }
}

/// Owns append and retrieval of the ordered message log, enforcing
/// room-existence and TTL-alignment invariants.
#[derive(Clone, Debug)]
pub struct MessageService {
    store: Arc<dyn Store>,
    relay: NotificationRelay,
}

impl MessageService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, relay: NotificationRelay) -> Self {
        Self { store, relay }
    }

    /// Appends a message to a room's log.
    ///
    /// Input bounds are checked before any store interaction. The log's and
    /// token record's expiration are re-synchronized to the room's current
    /// remaining lifetime, never the original one, so the log cannot outlive
    /// its room. An append that loses a race against the room's deletion is
    /// rolled back by the store and reported as `RoomNotFound`. The appended
    /// event is published best-effort; the append is successful regardless.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for out-of-bound input and
    /// `AppError::RoomNotFound` if the room expired or was destroyed between
    /// token issuance and this call.
    #[tracing::instrument(err(level = "warn"), skip(self, sender, text, token_hash))]
    pub async fn post(&self, room_id: &str, token_hash: &str, sender: String, text: String) -> Result<Message> {
        validate_input(&sender, &text)?;

        if !self.store.room_exists(room_id).await? {
            return Err(AppError::RoomNotFound);
        }

        let message = Message::new(room_id.to_string(), sender, text);
        let record = StoredMessage { message: message.clone(), token_hash: token_hash.to_string() };

        self.store.append_message(room_id, &record).await?;
        if !self.store.sync_expiry(room_id).await? {
            // The room vanished while the append was in flight; the store
            // has reaped the orphaned records and the poster learns the
            // room is gone. No event is published for the lost message.
            return Err(AppError::RoomNotFound);
        }

        self.relay.message_appended(room_id, &message).await;

        tracing::debug!(room_id, message_id = %message.id, "Message appended");
        Ok(message)
    }

    /// Returns the full log, oldest first.
    ///
    /// # Errors
    /// Returns `AppError::RoomNotFound` once the room is gone; a validated
    /// token alone grants nothing after that.
    #[tracing::instrument(err(level = "warn"), skip(self, reader_token_hash))]
    pub async fn list(&self, room_id: &str, reader_token_hash: &str) -> Result<Vec<MessageView>> {
        if !self.store.room_exists(room_id).await? {
            return Err(AppError::RoomNotFound);
        }

        let records = self.store.list_messages(room_id).await?;
        Ok(records.into_iter().map(|r| MessageView::from_record(r, reader_token_hash)).collect())
    }
}
