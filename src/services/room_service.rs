use crate::domain::RoomMeta;
use crate::domain::room::generate_room_id;
use crate::error::Result;
use crate::services::relay::NotificationRelay;
use crate::services::token::{RoomClaims, hash_token};
use crate::storage::Store;
use std::sync::Arc;
use std::time::Duration;

/// A freshly created room: the identifier plus the one capability token that
/// will ever be minted for it.
#[derive(Debug, Clone)]
pub struct CreatedRoom {
    pub room_id: String,
    pub token: String,
}

/// Owns room creation, TTL reads, and destruction. A room is `ACTIVE`
/// exactly while its metadata record exists; expiry (store-driven) and
/// explicit destruction both end in plain absence, indistinguishable after
/// the fact.
#[derive(Clone, Debug)]
pub struct RoomService {
    store: Arc<dyn Store>,
    relay: NotificationRelay,
    lifetime: Duration,
    token_secret: String,
}

impl RoomService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, relay: NotificationRelay, lifetime: Duration, token_secret: String) -> Self {
        Self { store, relay, lifetime, token_secret }
    }

    /// Creates a room with the configured lifetime and mints its token.
    ///
    /// # Errors
    /// Returns `AppError::Store` if the records cannot be written.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn create(&self) -> Result<CreatedRoom> {
        let meta = RoomMeta::new(generate_room_id());
        let token = RoomClaims::new(meta.room_id.clone()).encode(&self.token_secret)?;

        self.store.create_room(&meta, &hash_token(&token), self.lifetime).await?;

        tracing::info!(room_id = %meta.room_id, lifetime_secs = self.lifetime.as_secs(), "Room created");
        Ok(CreatedRoom { room_id: meta.room_id, token })
    }

    /// Remaining lifetime in seconds. A vanished room reads as 0, never as
    /// an error; callers infer destruction from zero.
    ///
    /// # Errors
    /// Returns `AppError::Store` if the TTL read fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn remaining_lifetime(&self, room_id: &str) -> Result<u64> {
        Ok(self.store.room_ttl(room_id).await?.unwrap_or(0))
    }

    /// Destroys a room. Idempotent: destroying an already-gone room is a
    /// no-op so clients can retry freely.
    ///
    /// The destroyed event is published before deletion; once this returns
    /// successfully the room is unreachable for every subsequent operation.
    ///
    /// # Errors
    /// Returns `AppError::Store` if the deletion fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn destroy(&self, room_id: &str) -> Result<()> {
        if !self.store.room_exists(room_id).await? {
            tracing::debug!(room_id, "Destroy requested for absent room");
            return Ok(());
        }

        self.relay.room_destroyed(room_id).await;
        self.store.delete_room(room_id).await?;

        tracing::info!(room_id, "Room destroyed");
        Ok(())
    }
}
