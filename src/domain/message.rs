use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_SENDER_LEN: usize = 100;
pub const MAX_TEXT_LEN: usize = 1000;

/// A chat message as seen by clients. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender: String,
    pub text: String,
    /// Unix timestamp in milliseconds, server-assigned.
    pub timestamp: i64,
    pub room_id: String,
}

/// The persisted form of a message. Carries the SHA-256 fingerprint of the
/// posting token so a reader can be told "this one is yours" without the raw
/// token of any party ever leaving the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    #[serde(flatten)]
    pub message: Message,
    pub token_hash: String,
}

impl Message {
    #[must_use]
    pub fn new(room_id: String, sender: String, text: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender,
            text,
            timestamp: crate::domain::room::unix_millis_now(),
            room_id,
        }
    }
}

/// Validates sender and text bounds. Runs before any store interaction.
///
/// Lengths are counted in characters, not bytes, so multi-byte senders are
/// not penalized.
///
/// # Errors
/// Returns `AppError::Validation` if either field is empty or too long.
pub fn validate_input(sender: &str, text: &str) -> Result<()> {
    if sender.is_empty() {
        return Err(AppError::Validation("sender must not be empty".to_string()));
    }
    if sender.chars().count() > MAX_SENDER_LEN {
        return Err(AppError::Validation(format!("sender exceeds {MAX_SENDER_LEN} characters")));
    }
    if text.is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::Validation(format!("text exceeds {MAX_TEXT_LEN} characters")));
    }
    Ok(())
}
