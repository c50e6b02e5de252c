//! Prometheus metrics for chat-service.
//!
//! HTTP, upstream-provider and retrieval metrics for observability.

use axum::{extract::Request, middleware::Next, response::Response};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;
use std::time::Instant;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// HTTP metrics
pub static HTTP_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static HTTP_REQUEST_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

// Upstream provider metrics
pub static UPSTREAM_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static UPSTREAM_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

// Retrieval metrics
pub static RETRIEVAL_SELECTIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Must be called once at startup.
pub fn init_metrics() {
    let registry = Registry::new();

    let http_requests_total = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"],
    )
    .expect("Failed to create http_requests_total metric");

    let http_request_duration = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["method", "path"],
    )
    .expect("Failed to create http_request_duration_seconds metric");

    let upstream_requests = IntCounterVec::new(
        Opts::new(
            "upstream_requests_total",
            "Total generative-API requests by outcome",
        ),
        &["provider", "outcome"],
    )
    .expect("Failed to create upstream_requests_total metric");

    let upstream_latency = HistogramVec::new(
        HistogramOpts::new(
            "upstream_latency_seconds",
            "Generative-API request latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        &["provider"],
    )
    .expect("Failed to create upstream_latency_seconds metric");

    let retrieval_selections = IntCounterVec::new(
        Opts::new(
            "retrieval_selections_total",
            "Context selections by outcome",
        ),
        &["outcome"], // matched, fallback, empty
    )
    .expect("Failed to create retrieval_selections_total metric");

    registry
        .register(Box::new(http_requests_total.clone()))
        .expect("Failed to register http_requests_total");
    registry
        .register(Box::new(http_request_duration.clone()))
        .expect("Failed to register http_request_duration_seconds");
    registry
        .register(Box::new(upstream_requests.clone()))
        .expect("Failed to register upstream_requests_total");
    registry
        .register(Box::new(upstream_latency.clone()))
        .expect("Failed to register upstream_latency_seconds");
    registry
        .register(Box::new(retrieval_selections.clone()))
        .expect("Failed to register retrieval_selections_total");

    // Initialize globals
    let _ = REGISTRY.set(registry);
    let _ = HTTP_REQUESTS_TOTAL.set(http_requests_total);
    let _ = HTTP_REQUEST_DURATION_SECONDS.set(http_request_duration);
    let _ = UPSTREAM_REQUESTS_TOTAL.set(upstream_requests);
    let _ = UPSTREAM_LATENCY_SECONDS.set(upstream_latency);
    let _ = RETRIEVAL_SELECTIONS_TOTAL.set(retrieval_selections);

    tracing::info!("Prometheus metrics initialized");
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

/// Middleware recording per-request counters and latency.
pub async fn track_http(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status().as_u16().to_string();

    if let Some(counter) = HTTP_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[&method, path, &status]).inc();
    }
    if let Some(histogram) = HTTP_REQUEST_DURATION_SECONDS.get() {
        histogram
            .with_label_values(&[&method, path])
            .observe(duration.as_secs_f64());
    }

    response
}

/// Collapse the static fallback into one label value; every asset path
/// would otherwise become its own series.
fn normalize_path(path: &str) -> &'static str {
    match path {
        "/api/chat" => "/api/chat",
        "/api/chat-local-rag" => "/api/chat-local-rag",
        "/health" => "/health",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        _ => "static",
    }
}

/// Record a completed upstream call.
pub fn record_upstream_request(provider: &str, outcome: &str, duration_secs: f64) {
    if let Some(counter) = UPSTREAM_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[provider, outcome]).inc();
    }
    if let Some(histogram) = UPSTREAM_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[provider])
            .observe(duration_secs);
    }
}

/// Record a context selection outcome.
pub fn record_selection(outcome: &str) {
    if let Some(counter) = RETRIEVAL_SELECTIONS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}
