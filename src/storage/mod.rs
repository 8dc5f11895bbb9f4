use crate::domain::{RoomMeta, StoredMessage};
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

pub mod memory;
pub mod redis;

/// The durable key-value collaborator, at its interface boundary: per-key
/// expiration, list append/range, existence checks. Three records exist per
/// room (metadata, message log, token fingerprint) and are expected to
/// vanish together.
#[async_trait]
pub trait Store: fmt::Debug + Send + Sync {
    /// Writes the metadata and token records for a fresh room, both expiring
    /// after `lifetime`.
    async fn create_room(&self, meta: &RoomMeta, token_hash: &str, lifetime: Duration) -> Result<()>;

    /// Whether the room's metadata record is present. Absence is the one and
    /// only signal that a room expired or was destroyed.
    async fn room_exists(&self, room_id: &str) -> Result<bool>;

    /// Remaining lifetime of the metadata record in whole seconds, or `None`
    /// if the record is absent.
    async fn room_ttl(&self, room_id: &str) -> Result<Option<u64>>;

    async fn append_message(&self, room_id: &str, record: &StoredMessage) -> Result<()>;

    /// The full log, oldest first. Empty if the log record is absent.
    async fn list_messages(&self, room_id: &str) -> Result<Vec<StoredMessage>>;

    /// Re-arms the log and token records to the metadata record's current
    /// remaining lifetime. Re-synchronized, never reset: the basis is always
    /// the remaining TTL, so no record can outlive the room.
    ///
    /// Returns `false` if the metadata record is gone. In that case any log
    /// or token record present is an orphan from an append that raced the
    /// room's deletion, and the implementation must have reaped it before
    /// returning.
    async fn sync_expiry(&self, room_id: &str) -> Result<bool>;

    /// Deletes all three room records as one logical deletion. Deleting an
    /// absent room is a no-op.
    async fn delete_room(&self, room_id: &str) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}

pub(crate) fn meta_key(room_id: &str) -> String {
    format!("meta:{room_id}")
}

pub(crate) fn messages_key(room_id: &str) -> String {
    format!("messages:{room_id}")
}

pub(crate) fn token_key(room_id: &str) -> String {
    format!("token:{room_id}")
}
