use crate::api::AppState;
use crate::error::AppError;
use crate::services::token::{RoomClaims, hash_token};
use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, Request, header, request::Parts},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// A structurally validated room capability. Carrying this proves the bearer
/// presented a well-formed token bound to `room_id`; it does NOT prove the
/// room still exists. The effective authorization check is the existence
/// gate inside the services.
#[derive(Debug)]
pub struct AuthRoom {
    pub room_id: String,
    pub token_hash: String,
}

impl FromRequestParts<AppState> for AuthRoom {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts.headers.get(header::AUTHORIZATION).ok_or(AppError::AuthError)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::AuthError)?;
        let token = auth_str.strip_prefix("Bearer ").ok_or(AppError::AuthError)?;

        let claims = RoomClaims::decode(token, &state.config.auth.token_secret)?;

        tracing::Span::current().record("room_id", claims.room_id.as_str());

        Ok(Self { room_id: claims.room_id, token_hash: hash_token(token) })
    }
}

/// Uses the inbound `x-request-id` header when present, otherwise mints a
/// fresh UUID.
#[derive(Clone, Copy, Debug)]
pub struct MakeRequestUuidOrHeader;

impl MakeRequestId for MakeRequestUuidOrHeader {
    fn make_request_id<B>(&mut self, request: &Request<B>) -> Option<RequestId> {
        request.headers().get("x-request-id").map_or_else(
            || {
                let id = Uuid::new_v4().to_string();
                HeaderValue::from_str(&id).ok().map(RequestId::new)
            },
            |id| Some(RequestId::new(id.clone())),
        )
    }
}
