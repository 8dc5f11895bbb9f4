use crate::api::AppState;
use crate::api::middleware::AuthRoom;
use crate::api::schemas::{ListMessagesResponse, PostMessageRequest};
use crate::error::Result;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Appends a message to the room's log.
///
/// # Errors
/// Returns `AppError::Validation` for out-of-bound sender/text and
/// `AppError::RoomNotFound` once the room is gone.
pub async fn post_message(
    auth: AuthRoom,
    State(state): State<AppState>,
    Json(body): Json<PostMessageRequest>,
) -> Result<impl IntoResponse> {
    let message = state.message_service.post(&auth.room_id, &auth.token_hash, body.sender, body.text).await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Returns the full message log, oldest first.
pub async fn list_messages(auth: AuthRoom, State(state): State<AppState>) -> Result<Json<ListMessagesResponse>> {
    let messages = state.message_service.list(&auth.room_id, &auth.token_hash).await?;

    Ok(Json(ListMessagesResponse { messages }))
}
