//! Chat provider abstractions and implementations.
//!
//! This module provides a trait-based abstraction over the upstream
//! generative-language APIs, allowing easy swapping between backends
//! (Gemini, OpenAI-compatible, mock).

pub mod gemini;
pub mod mock;
pub mod openai;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

/// Answer substituted when no extraction strategy matches the upstream
/// body. The request still succeeds.
pub const NO_ANSWER_PLACEHOLDER: &str = "⚠️ Жауап табылмады.";

/// Tuning defaults applied when the request carries no overrides.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_OUTPUT_TOKENS: i32 = 512;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0}")]
    NotConfigured(String),

    #[error("{provider} API error")]
    Api {
        provider: &'static str,
        detail: String,
    },

    #[error("Invalid response from {provider}")]
    Format {
        provider: &'static str,
        detail: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream request timed out")]
    Timeout,
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => AppError::ConfigError(msg),
            ProviderError::Api { provider, detail } => AppError::BadGateway {
                message: format!("{} API error", provider),
                details: Some(detail),
            },
            ProviderError::Format { provider, detail } => AppError::BadGateway {
                message: format!("Invalid response from {}", provider),
                details: if detail.is_empty() {
                    None
                } else {
                    Some(detail)
                },
            },
            ProviderError::Network(detail) => {
                AppError::InternalError(anyhow::anyhow!("upstream request failed: {}", detail))
            }
            ProviderError::Timeout => {
                AppError::GatewayTimeout("Upstream request timed out".to_string())
            }
        }
    }
}

/// One turn of the outbound conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTurn {
    pub role: String,
    pub text: String,
}

impl MessageTurn {
    pub fn new(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            text: text.into(),
        }
    }
}

/// Generation parameters for upstream requests. `None` fields fall
/// back to the shared defaults.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    /// Per-request model override.
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<i32>,
}

/// Result of a provider call with the extracted answer.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    /// Trimmed answer text; the placeholder when nothing was extracted.
    pub text: String,
    /// Candidate count reported by the upstream body, when present.
    pub candidates: Option<usize>,
    /// Model the call actually used.
    pub model: String,
}

/// Trait for chat generation providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short label used in error messages and metrics.
    fn name(&self) -> &'static str;

    /// Fails when the provider cannot make upstream calls (missing API
    /// key). Checked by the handler before any I/O.
    fn ensure_configured(&self) -> Result<(), ProviderError>;

    /// Send the composed turns upstream and extract the reply.
    async fn generate(
        &self,
        turns: &[MessageTurn],
        params: &GenerationParams,
    ) -> Result<ProviderReply, ProviderError>;
}

/// Truncate a diagnostic string to at most `max` characters.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
