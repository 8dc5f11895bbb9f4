use crate::api::AppState;
use crate::domain::RoomEvent;
use crate::pubsub::room_channel;
use crate::services::token::RoomClaims;
use axum::{
    extract::{
        Query, State,
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{Instrument, warn};

#[derive(Debug, Deserialize)]
pub struct WsParams {
    // Browsers cannot set headers on a WebSocket handshake, so the token
    // rides in the query string here.
    token: String,
}

/// Live event feed for a room: every `message-appended` and the final
/// `room-destroyed` are forwarded as JSON text frames. Subscribers joining
/// late get no backlog; they re-derive state by listing messages.
pub async fn events_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match RoomClaims::decode(&params.token, &state.config.auth.token_secret) {
        Ok(claims) => ws.on_upgrade(move |socket| handle_socket(socket, state, claims.room_id)),
        Err(e) => {
            tracing::warn!(error = %e, "WebSocket handshake failed: invalid token");
            axum::http::StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

async fn handle_socket(mut socket: WebSocket, state: AppState, room_id: String) {
    let span = tracing::info_span!("event_session", room_id = %room_id);

    async move {
        // Subscribe before the existence check, so a destroy racing this
        // handshake cannot slip between the two.
        let mut rx = match state.broadcast.subscribe(&room_channel(&room_id)).await {
            Ok(rx) => rx,
            Err(e) => {
                warn!(error = %e, "Failed to subscribe to room channel");
                let _ = socket.close().await;
                return;
            }
        };

        match state.room_service.remaining_lifetime(&room_id).await {
            Ok(0) | Err(_) => {
                let _ = socket.close().await;
                return;
            }
            Ok(_) => {}
        }

        tracing::info!("Event feed connected");
        let mut shutdown_rx = state.shutdown_rx.clone();

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    let _ = socket
                        .send(WsMessage::Close(Some(axum::extract::ws::CloseFrame {
                            code: axum::extract::ws::close_code::AWAY,
                            reason: "Server shutting down".into(),
                        })))
                        .await;
                    break;
                }

                msg = socket.recv() => {
                    match msg {
                        Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                        _ => {}
                    }
                }

                result = rx.recv() => {
                    match result {
                        Ok(event_msg) => {
                            let destroyed = serde_json::from_slice::<RoomEvent>(&event_msg.payload)
                                .is_ok_and(|e| matches!(e, RoomEvent::RoomDestroyed { .. }));

                            let text = String::from_utf8_lossy(&event_msg.payload).into_owned();
                            if socket.send(WsMessage::Text(text.into())).await.is_err() {
                                break;
                            }
                            if destroyed {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // Dropped events are recoverable: the client
                            // re-reads the log.
                            warn!(skipped, "Event feed lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }

        let _ = socket.close().await;
        tracing::info!("Event feed disconnected");
    }
    .instrument(span)
    .await;
}
