use crate::utils::validation::validate_message_not_blank;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/chat` and `POST /api/chat-local-rag`.
///
/// `message` is the only required field; a missing field deserializes
/// to an empty string and fails the blank check, matching the wire
/// contract (400 "No message provided").
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default)]
    #[validate(
        custom(function = "validate_message_not_blank", message = "No message provided"),
        length(max = 6000, message = "Message too long (max 6000 chars)")
    )]
    pub message: String,

    /// Prior turns, oldest first. Entries missing role or text are
    /// skipped, not rejected.
    #[serde(default)]
    pub history: Vec<HistoryTurn>,

    pub model: Option<String>,

    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: Option<i32>,

    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryTurn {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Context snippet attached to a RAG answer. `text` feeds the outbound
/// prompt only; the response exposes id/score/meta.
#[derive(Debug, Clone, Serialize)]
pub struct ContextSnippet {
    pub id: String,
    pub score: u32,
    pub meta: ContextMeta,
    #[serde(skip_serializing)]
    pub text: String,
}

/// All four keys serialize, with explicit nulls for absent fields.
#[derive(Debug, Clone, Serialize)]
pub struct ContextMeta {
    pub name: Option<String>,
    pub cat: Option<String>,
    pub century: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub contexts: Vec<ContextSnippet>,
    #[serde(rename = "_debug", skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

/// Candidate-count summary attached outside production. Never the raw
/// upstream payload.
#[derive(Debug, Serialize)]
pub struct DebugInfo {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<usize>,
}
