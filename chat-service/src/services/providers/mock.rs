//! Mock provider for tests.

use super::{ChatProvider, GenerationParams, MessageTurn, ProviderError, ProviderReply};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Echo provider that records its calls so tests can assert whether
/// and with what turns the upstream was reached.
pub struct MockProvider {
    enabled: bool,
    reply: String,
    calls: AtomicUsize,
    last_turns: Mutex<Vec<MessageTurn>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_reply("Mock reply")
    }

    pub fn with_reply(reply: &str) -> Self {
        Self {
            enabled: true,
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            last_turns: Mutex::new(Vec::new()),
        }
    }

    /// A provider that fails `ensure_configured`, standing in for a
    /// deployment without an API key.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            reply: String::new(),
            calls: AtomicUsize::new(0),
            last_turns: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_turns(&self) -> Vec<MessageTurn> {
        self.last_turns
            .lock()
            .expect("mock turn log poisoned")
            .clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &'static str {
        "Mock"
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if !self.enabled {
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
        self.ensure_configured()?;

        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_turns.lock().expect("mock turn log poisoned") = turns.to_vec();

        Ok(ProviderReply {
            text: self.reply.clone(),
            candidates: Some(1),
            model: params
                .model
                .clone()
                .unwrap_or_else(|| "mock".to_string()),
        })
    }
}
