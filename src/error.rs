use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] redis::RedisError),
    #[error("Authentication failed")]
    AuthError,
    #[error("Room not found")]
    RoomNotFound,
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Store(e) => {
                tracing::error!(error = %e, "Store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::AuthError => {
                tracing::debug!("Authentication failed");
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            // Expected terminal state of every room; clients treat it as
            // "the room has vanished", not as a fault.
            Self::RoomNotFound => {
                tracing::debug!("Room not found");
                (StatusCode::NOT_FOUND, "Room not found".to_string())
            }
            Self::Validation(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
