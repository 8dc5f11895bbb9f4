use crate::domain::{RoomMeta, StoredMessage};
use crate::error::{AppError, Result};
use crate::storage::{Store, messages_key, meta_key, token_key};
use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;

/// Redis-backed store. Expiry is delegated entirely to Redis TTLs; the
/// server never runs its own sweeper.
#[derive(Debug, Clone)]
pub struct RedisStore {
    conn: redis::aio::ConnectionManager,
}

impl RedisStore {
    #[must_use]
    pub const fn new(conn: redis::aio::ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn create_room(&self, meta: &RoomMeta, token_hash: &str, lifetime: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let body = serde_json::to_string(meta).map_err(|_| AppError::Internal)?;
        let secs = lifetime.as_secs();

        let _: () = conn.set_ex(meta_key(&meta.room_id), body, secs).await?;
        let _: () = conn.set_ex(token_key(&meta.room_id), token_hash, secs).await?;
        Ok(())
    }

    async fn room_exists(&self, room_id: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(meta_key(room_id)).await?;
        Ok(exists)
    }

    async fn room_ttl(&self, room_id: &str) -> Result<Option<u64>> {
        let mut conn = self.conn.clone();
        // TTL returns -2 for a missing key and -1 for a key without expiry;
        // a room metadata record always carries one, so both mean "gone".
        let ttl: i64 = conn.ttl(meta_key(room_id)).await?;
        Ok(u64::try_from(ttl).ok())
    }

    async fn append_message(&self, room_id: &str, record: &StoredMessage) -> Result<()> {
        let mut conn = self.conn.clone();
        let body = serde_json::to_string(record).map_err(|_| AppError::Internal)?;
        let _: () = conn.rpush(messages_key(room_id), body).await?;
        Ok(())
    }

    async fn list_messages(&self, room_id: &str) -> Result<Vec<StoredMessage>> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn.lrange(messages_key(room_id), 0, -1).await?;

        let mut records = Vec::with_capacity(raw.len());
        for body in raw {
            match serde_json::from_str::<StoredMessage>(&body) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(error = %e, room_id, "Skipping undecodable message record");
                }
            }
        }
        Ok(records)
    }

    async fn sync_expiry(&self, room_id: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let remaining: i64 = conn.ttl(meta_key(room_id)).await?;

        if remaining > 0 {
            let _: () = conn.expire(messages_key(room_id), remaining).await?;
            let _: () = conn.expire(token_key(room_id), remaining).await?;
            return Ok(true);
        }

        // The room expired or was destroyed between the caller's existence
        // check and now. An append that raced the deletion has re-created
        // the log key without a TTL, so delete the satellite records rather
        // than leaving them behind with no expiry.
        let keys = [messages_key(room_id), token_key(room_id)];
        let _: () = conn.del(&keys[..]).await?;
        Ok(false)
    }

    async fn delete_room(&self, room_id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let keys = [meta_key(room_id), messages_key(room_id), token_key(room_id)];
        let _: () = conn.del(&keys[..]).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}
