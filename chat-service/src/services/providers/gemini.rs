//! Gemini provider implementation.
//!
//! Talks to the `generateContent` endpoint and extracts the reply via
//! an ordered list of named strategies, since deployed API versions
//! have answered with several different body shapes.

use super::{
    truncate_chars, ChatProvider, GenerationParams, MessageTurn, ProviderError, ProviderReply,
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, NO_ANSWER_PLACEHOLDER,
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const PROVIDER: &str = "Gemini";

/// Upstream error diagnostics are cut to this many characters before
/// they reach a client-visible `details` field.
const MAX_ERROR_DETAIL_CHARS: usize = 500;

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Build the API URL for the given model. The key rides in the
    /// query string, so the URL must never be logged or echoed. The
    /// model can be caller-supplied, so it goes through path-segment
    /// percent-encoding instead of string formatting.
    fn api_url(&self, model: &str, api_key: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.config.api_base).map_err(|e| {
            ProviderError::NotConfigured(format!("Invalid GEMINI_API_BASE: {}", e))
        })?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::NotConfigured("Invalid GEMINI_API_BASE".to_string()))?
            .pop_if_empty()
            .push("models")
            .push(&format!("{}:generateContent", model));
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }

    async fn exchange(
        &self,
        url: Url,
        request: &GenerateContentRequest,
        model: &str,
    ) -> Result<ProviderReply, ProviderError> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.without_url().to_string()))?;

        // Parse before the status check: an unparsable body is its own
        // failure mode whatever the status was.
        let body: Value = serde_json::from_str(&raw).map_err(|_| ProviderError::Format {
            provider: PROVIDER,
            detail: truncate_chars(&raw, MAX_ERROR_DETAIL_CHARS),
        })?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                provider: PROVIDER,
                detail: upstream_error_detail(&body, &raw),
            });
        }

        let candidates = body
            .get("candidates")
            .and_then(Value::as_array)
            .map(Vec::len);

        let text = match extract_reply(&body) {
            Some((strategy, text)) => {
                tracing::debug!(strategy, "Extracted Gemini reply");
                text
            }
            None => {
                tracing::warn!("No extraction strategy matched the Gemini response");
                NO_ANSWER_PLACEHOLDER.to_string()
            }
        };

        Ok(ProviderReply {
            text: text.trim().to_string(),
            candidates,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_none() {
            return Err(ProviderError::NotConfigured(
                "Missing GEMINI_API_KEY".to_string(),
            ));
        }
        Ok(())
    }

    async fn generate(
        &self,
        turns: &[MessageTurn],
        params: &GenerationParams,
    ) -> Result<ProviderReply, ProviderError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured("Missing GEMINI_API_KEY".to_string())
        })?;

        let model = params.model.as_deref().unwrap_or(&self.config.model);
        let url = self.api_url(model, api_key)?;

        let request = GenerateContentRequest {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: turn.role.clone(),
                    parts: vec![Part {
                        text: turn.text.clone(),
                    }],
                })
                .collect(),
            temperature: params.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_output_tokens: params.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
        };

        tracing::debug!(
            model = %model,
            turns = turns.len(),
            "Sending request to Gemini API"
        );

        // One bound covers the whole exchange; expiry drops the
        // in-flight request.
        match tokio::time::timeout(self.config.timeout, self.exchange(url, &request, model)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout),
        }
    }
}

/// Prefer the structured `error.message`, tolerate a bare-string
/// `error`, fall back to the raw body. Every branch is truncated and
/// never carries the API key.
fn upstream_error_detail(body: &Value, raw: &str) -> String {
    let detail = body
        .pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .unwrap_or(raw);
    truncate_chars(detail, MAX_ERROR_DETAIL_CHARS)
}

// ============================================================================
// Reply extraction strategies
// ============================================================================

type Extractor = fn(&Value) -> Option<String>;

/// Ordered extraction strategies; the first match wins.
const EXTRACTORS: &[(&str, Extractor)] = &[
    ("candidate_parts", extract_candidate_parts),
    ("candidate_content_list", extract_candidate_content_list),
    ("candidate_content_text", extract_candidate_content_text),
    ("output_content", extract_output_content),
    ("result_outputs", extract_result_outputs),
    ("bare_string", extract_bare_string),
];

pub(crate) fn extract_reply(body: &Value) -> Option<(&'static str, String)> {
    EXTRACTORS
        .iter()
        .find_map(|(name, extract)| extract(body).map(|text| (*name, text)))
}

fn extract_candidate_parts(body: &Value) -> Option<String> {
    pointer_str(body, "/candidates/0/content/parts/0/text")
}

fn extract_candidate_content_list(body: &Value) -> Option<String> {
    pointer_str(body, "/candidates/0/content/0/text")
}

fn extract_candidate_content_text(body: &Value) -> Option<String> {
    pointer_str(body, "/candidates/0/content/text")
}

fn extract_output_content(body: &Value) -> Option<String> {
    pointer_str(body, "/output/0/content/0/text")
}

fn extract_result_outputs(body: &Value) -> Option<String> {
    pointer_str(body, "/result/outputs/0/content/parts/0/text")
}

fn extract_bare_string(body: &Value) -> Option<String> {
    body.as_str().map(str::to_string)
}

fn pointer_str(body: &Value, pointer: &str) -> Option<String> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}

// ============================================================================
// Gemini API request types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    temperature: f32,
    max_output_tokens: i32,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}
