//! OpenAI-compatible provider implementation.
//!
//! Drives any `chat/completions` endpoint with bearer auth; the reply
//! lives at `choices[0].message.content`.

use super::{
    truncate_chars, ChatProvider, GenerationParams, MessageTurn, ProviderError, ProviderReply,
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, NO_ANSWER_PLACEHOLDER,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const PROVIDER: &str = "OpenAI";

const MAX_ERROR_DETAIL_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    async fn exchange(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
        model: &str,
    ) -> Result<ProviderReply, ProviderError> {
        let url = format!("{}/chat/completions", self.config.api_base);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.without_url().to_string()))?;

        let body: Value = serde_json::from_str(&raw).map_err(|_| ProviderError::Format {
            provider: PROVIDER,
            detail: truncate_chars(&raw, MAX_ERROR_DETAIL_CHARS),
        })?;

        if !status.is_success() {
            let detail = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or(&raw);
            return Err(ProviderError::Api {
                provider: PROVIDER,
                detail: truncate_chars(detail, MAX_ERROR_DETAIL_CHARS),
            });
        }

        let candidates = body.get("choices").and_then(Value::as_array).map(Vec::len);

        let text = body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                tracing::warn!("No reply content in the OpenAI response");
                NO_ANSWER_PLACEHOLDER.to_string()
            });

        Ok(ProviderReply {
            text: text.trim().to_string(),
            candidates,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_none() {
            return Err(ProviderError::NotConfigured(
                "Missing OPENAI_API_KEY".to_string(),
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
            ProviderError::NotConfigured("Missing OPENAI_API_KEY".to_string())
        })?;

        let model = params.model.as_deref().unwrap_or(&self.config.model);

        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: turns.iter().map(to_chat_message).collect(),
            max_tokens: params.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
            temperature: params.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        };

        tracing::debug!(
            model = %model,
            turns = turns.len(),
            "Sending request to OpenAI-compatible API"
        );

        match tokio::time::timeout(self.config.timeout, self.exchange(api_key, &request, model))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout),
        }
    }
}

/// Clients speak the Gemini role vocabulary; this API calls the
/// assistant role "assistant".
fn to_chat_message(turn: &MessageTurn) -> ChatMessage {
    let role = if turn.role == "model" {
        "assistant"
    } else {
        &turn.role
    };
    ChatMessage {
        role: role.to_string(),
        content: turn.text.clone(),
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: i32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}
