use crate::api::AppState;
use crate::api::middleware::AuthRoom;
use crate::api::schemas::{CreateRoomResponse, TtlResponse};
use crate::error::Result;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Creates a room and mints its capability token. The token is returned
/// exactly once, here; hold on to it.
pub async fn create_room(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let created = state.room_service.create().await?;

    Ok((StatusCode::CREATED, Json(CreateRoomResponse { room_id: created.room_id, token: created.token })))
}

/// Reports the room's remaining lifetime in seconds. Zero means the room has
/// already vanished.
pub async fn remaining_lifetime(auth: AuthRoom, State(state): State<AppState>) -> Result<Json<TtlResponse>> {
    let seconds = state.room_service.remaining_lifetime(&auth.room_id).await?;

    Ok(Json(TtlResponse { seconds }))
}

/// Destroys the room and everything in it. Idempotent; destroying an
/// already-gone room acks the same way.
pub async fn destroy_room(auth: AuthRoom, State(state): State<AppState>) -> Result<impl IntoResponse> {
    state.room_service.destroy(&auth.room_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
