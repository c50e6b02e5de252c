pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use service_core::middleware::{
    create_ip_rate_limiter, ip_rate_limit_middleware, request_id_middleware,
    security_headers_middleware,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::startup::AppState;

pub fn build_router(state: AppState) -> Router {
    let ip_limiter = create_ip_rate_limiter(state.config.rate_limit_per_min, 60);

    // Chat routes share one limiter; anything but POST gets a 405.
    let api_routes = Router::new()
        .route(
            "/api/chat",
            post(handlers::chat::chat).fallback(handlers::chat::method_not_allowed),
        )
        .route(
            "/api/chat-local-rag",
            post(handlers::chat::chat_local_rag).fallback(handlers::chat::method_not_allowed),
        )
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware));

    let static_dir = state.config.assets.static_dir.clone();

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .merge(api_routes)
        // Everything else is the map frontend.
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
        // Add metrics middleware
        .layer(from_fn(services::metrics::track_http))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Add security headers middleware
        .layer(from_fn(security_headers_middleware))
}
