use crate::config::Config;
use crate::pubsub::Broadcast;
use crate::services::health_service::HealthService;
use crate::services::message_service::MessageService;
use crate::services::room_service::RoomService;
use axum::body::Body;
use axum::http::Request;
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod events;
pub mod health;
pub mod messages;
pub mod middleware;
pub mod rooms;
pub mod schemas;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub room_service: RoomService,
    pub message_service: MessageService,
    pub broadcast: Arc<dyn Broadcast>,
    pub shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub room_service: RoomService,
    pub message_service: MessageService,
    pub broadcast: Arc<dyn Broadcast>,
}

/// Configures and returns the primary application router.
///
/// # Panics
/// Panics if the rate limiter configuration cannot be constructed.
pub fn app_router(
    config: Config,
    services: ServiceContainer,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
) -> Router {
    let interval_ns = 1_000_000_000 / config.rate_limit.per_second.max(1);
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_nanosecond(u64::from(interval_ns))
            .burst_size(config.rate_limit.burst)
            .finish()
            .expect("Failed to build rate limiter config"),
    );

    let state = AppState {
        config,
        room_service: services.room_service,
        message_service: services.message_service,
        broadcast: services.broadcast,
        shutdown_rx,
    };

    let api_routes = Router::new()
        .route("/rooms", post(rooms::create_room))
        .route("/rooms", delete(rooms::destroy_room))
        .route("/rooms/ttl", get(rooms::remaining_lifetime))
        .route("/rooms/events", get(events::events_handler))
        .route("/messages", post(messages::post_message))
        .route("/messages", get(messages::list_messages))
        .layer(GovernorLayer::new(governor_conf));

    Router::new()
        .nest("/v1", api_routes)
        .layer(PropagateRequestIdLayer::new(axum::http::HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "room_id" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static("x-request-id"),
            middleware::MakeRequestUuidOrHeader,
        ))
        .with_state(state)
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new().route("/livez", get(health::livez)).route("/readyz", get(health::readyz)).with_state(state)
}
