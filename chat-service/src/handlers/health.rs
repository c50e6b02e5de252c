use crate::startup::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Liveness probe with basic service metadata.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "chat-service",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.provider.name(),
        "provider_configured": state.provider.ensure_configured().is_ok(),
    }))
}

/// Readiness probe: 200 only once the provider has its credentials.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.provider.ensure_configured() {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
