//! Chat endpoints: the plain proxy and the RAG-augmented variant.
//!
//! Both run one parameterized pipeline: validate, optionally retrieve
//! context, compose turns, call the provider, shape the response.

use crate::models::chat::{ChatRequest, ChatResponse, DebugInfo};
use crate::services::providers::{GenerationParams, ProviderError};
use crate::services::{dataset, metrics, prompt, retrieval, ChatMode};
use crate::startup::AppState;
use crate::utils::ValidatedJson;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use service_core::error::AppError;
use std::time::Instant;

/// `POST /api/chat`: proxy the message (and caller history) upstream.
pub async fn chat(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> Result<Response, AppError> {
    run_pipeline(state, req, ChatMode::Plain).await
}

/// `POST /api/chat-local-rag`: augment the prompt with keyword-matched
/// context from the places dataset.
pub async fn chat_local_rag(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> Result<Response, AppError> {
    run_pipeline(state, req, ChatMode::LocalRag).await
}

/// Fallback for non-POST methods on the chat routes.
pub async fn method_not_allowed() -> Response {
    let mut response = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Method not allowed" })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("POST"));
    response
}

async fn run_pipeline(
    state: AppState,
    req: ChatRequest,
    mode: ChatMode,
) -> Result<Response, AppError> {
    // Configuration problems surface before any retrieval or upstream I/O.
    state.provider.ensure_configured()?;

    let contexts = match mode {
        ChatMode::LocalRag => {
            let places = dataset::load_places(&state.config.dataset_path()).await;
            let tokens = retrieval::tokenize(&req.message);
            let selection =
                retrieval::select_contexts(&places, &tokens, state.config.retrieval.top_k);

            let outcome = if selection.chosen.is_empty() {
                "empty"
            } else if selection.used_fallback {
                "fallback"
            } else {
                "matched"
            };
            metrics::record_selection(outcome);

            tracing::debug!(
                tokens = tokens.len(),
                chosen = selection.chosen.len(),
                fallback = selection.used_fallback,
                "Selected context snippets"
            );

            retrieval::render_snippets(&selection.chosen)
        }
        ChatMode::Plain => Vec::new(),
    };

    let turns = prompt::compose(&req.message, &req.history, &contexts, mode);

    let params = GenerationParams {
        model: req.model.clone(),
        temperature: req.temperature,
        max_output_tokens: req.max_output_tokens,
    };

    let started = Instant::now();
    let result = state.provider.generate(&turns, &params).await;
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => outcome_label(e),
    };
    metrics::record_upstream_request(
        state.provider.name(),
        outcome,
        started.elapsed().as_secs_f64(),
    );
    let reply = result?;

    let debug = if state.config.environment.is_prod() {
        None
    } else {
        Some(DebugInfo {
            model: reply.model.clone(),
            candidates: reply.candidates,
        })
    };

    let body = ChatResponse {
        answer: reply.text,
        contexts,
        debug,
    };

    // Answers may quote user input; keep them out of shared caches.
    let mut response = (StatusCode::OK, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}

fn outcome_label(err: &ProviderError) -> &'static str {
    match err {
        ProviderError::NotConfigured(_) => "not_configured",
        ProviderError::Api { .. } => "api_error",
        ProviderError::Format { .. } => "format_error",
        ProviderError::Network(_) => "network_error",
        ProviderError::Timeout => "timeout",
    }
}
