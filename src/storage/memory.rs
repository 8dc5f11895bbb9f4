use crate::domain::{RoomMeta, StoredMessage};
use crate::error::Result;
use crate::storage::Store;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct RoomEntry {
    // The metadata and token records are held for parity with the durable
    // backend even though only the deadline is ever consulted here.
    #[allow(dead_code)]
    meta: RoomMeta,
    #[allow(dead_code)]
    token_hash: String,
    messages: Vec<StoredMessage>,
    deadline: Instant,
}

/// In-process store for development and tests. A store without native TTL
/// has to sweep expired records itself; this one does it lazily, on access,
/// which is enough because absence only ever matters at access time.
///
/// All three logical records of a room live in one entry, so the
/// synchronized-expiration invariant holds trivially.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rooms: DashMap<String, RoomEntry>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn evict_if_expired(&self, room_id: &str) {
        let expired = self.rooms.get(room_id).is_some_and(|e| e.deadline <= Instant::now());
        if expired {
            self.rooms.remove(room_id);
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_room(&self, meta: &RoomMeta, token_hash: &str, lifetime: Duration) -> Result<()> {
        self.rooms.insert(
            meta.room_id.clone(),
            RoomEntry {
                meta: meta.clone(),
                token_hash: token_hash.to_string(),
                messages: Vec::new(),
                deadline: Instant::now() + lifetime,
            },
        );
        Ok(())
    }

    async fn room_exists(&self, room_id: &str) -> Result<bool> {
        self.evict_if_expired(room_id);
        Ok(self.rooms.contains_key(room_id))
    }

    async fn room_ttl(&self, room_id: &str) -> Result<Option<u64>> {
        self.evict_if_expired(room_id);
        Ok(self.rooms.get(room_id).map(|e| {
            let remaining = e.deadline.saturating_duration_since(Instant::now());
            // Whole seconds rounded up, matching how Redis reports TTL.
            remaining.as_millis().div_ceil(1000) as u64
        }))
    }

    async fn append_message(&self, room_id: &str, record: &StoredMessage) -> Result<()> {
        self.evict_if_expired(room_id);
        if let Some(mut entry) = self.rooms.get_mut(room_id) {
            entry.messages.push(record.clone());
        }
        Ok(())
    }

    async fn list_messages(&self, room_id: &str) -> Result<Vec<StoredMessage>> {
        self.evict_if_expired(room_id);
        Ok(self.rooms.get(room_id).map(|e| e.messages.clone()).unwrap_or_default())
    }

    async fn sync_expiry(&self, room_id: &str) -> Result<bool> {
        // Single entry per room: the log and token already share the
        // metadata deadline, and an append after deletion was a no-op, so
        // there is never an orphan to reap here.
        self.evict_if_expired(room_id);
        Ok(self.rooms.contains_key(room_id))
    }

    async fn delete_room(&self, room_id: &str) -> Result<()> {
        self.rooms.remove(room_id);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(room_id: &str, text: &str) -> StoredMessage {
        StoredMessage {
            message: crate::domain::Message::new(room_id.to_string(), "sender".to_string(), text.to_string()),
            token_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_records_vanish_together() {
        let store = MemoryStore::new();
        let meta = RoomMeta::new("r1".to_string());

        store.create_room(&meta, "hash", Duration::from_millis(20)).await.unwrap();
        store.append_message("r1", &record("r1", "hello")).await.unwrap();
        assert!(store.room_exists("r1").await.unwrap());

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(!store.room_exists("r1").await.unwrap());
        assert_eq!(store.room_ttl("r1").await.unwrap(), None);
        assert!(store.list_messages("r1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let store = MemoryStore::new();
        let meta = RoomMeta::new("r2".to_string());

        store.create_room(&meta, "hash", Duration::from_secs(60)).await.unwrap();
        store.append_message("r2", &record("r2", "first")).await.unwrap();
        store.append_message("r2", &record("r2", "second")).await.unwrap();

        let log = store.list_messages("r2").await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].message.text, "first");
        assert_eq!(log[1].message.text, "second");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let meta = RoomMeta::new("r3".to_string());

        store.create_room(&meta, "hash", Duration::from_secs(60)).await.unwrap();
        store.delete_room("r3").await.unwrap();
        store.delete_room("r3").await.unwrap();
        assert!(!store.room_exists("r3").await.unwrap());
    }
}
