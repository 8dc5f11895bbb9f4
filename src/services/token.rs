use crate::error::{AppError, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Claims of a room capability token.
///
/// Deliberately no `exp` claim: the token is invalidated implicitly the
/// instant the room's metadata record disappears from the store. Structural
/// validation here says nothing about whether the room still exists; that
/// check belongs to the lifecycle and message services.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomClaims {
    pub room_id: String,
    pub iat: usize,
}

impl RoomClaims {
    #[must_use]
    pub fn new(room_id: String) -> Self {
        let issued_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(std::time::Duration::from_secs(0))
            .as_secs() as usize;

        Self { room_id, iat: issued_at }
    }

    /// Mints the opaque token bound to this room.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if signing fails.
    pub fn encode(&self, secret: &str) -> Result<String> {
        encode(&Header::default(), self, &EncodingKey::from_secret(secret.as_bytes()))
            .map_err(|_| AppError::Internal)
    }

    /// Decodes and authenticates the token binding.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` if the token is malformed or the
    /// signature does not verify.
    pub fn decode(token: &str, secret: &str) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let token_data = decode::<Self>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
            .map_err(|_| AppError::AuthError)?;

        Ok(token_data.claims)
    }
}

/// Hashes a token using SHA-256. The hash is what gets persisted alongside
/// messages; the raw token never touches the store.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
