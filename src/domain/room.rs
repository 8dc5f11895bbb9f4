use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Metadata record for a room. Existence of this record in the store is the
/// sole representation of room existence; there is no deleted flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMeta {
    pub room_id: String,
    /// Unix timestamp in milliseconds, server-assigned at creation.
    pub created_at: i64,
}

impl RoomMeta {
    #[must_use]
    pub fn new(room_id: String) -> Self {
        Self { room_id, created_at: unix_millis_now() }
    }
}

/// Generates a fresh, URL-safe room identifier (16 random bytes -> Base64).
///
/// Collisions are treated as statistically impossible and not handled.
#[must_use]
pub fn generate_room_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[must_use]
pub fn unix_millis_now() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_generation() {
        let id1 = generate_room_id();
        let id2 = generate_room_id();

        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 22); // 16 bytes Base64 no pad
        assert!(id1.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
