//! Outbound prompt composition.
//!
//! One payload-construction path serves both endpoints; the mode flag
//! decides whether retrieved context and the fixed system instruction
//! are injected or the caller-supplied history is passed through.

use crate::models::chat::{ContextSnippet, HistoryTurn};
use crate::services::providers::MessageTurn;

/// Fixed Kazakh system instruction for grounded answers: answer from
/// the contexts, name the source used, hedge with "мүмкін" when unsure.
pub const SYSTEM_INTRO: &str = "Сен Маңғыстау картасының көмекші ботысың. Төмендегі контексттерге сүйене отырып нақты әрі қысқа жауап бер. Қай дереккөз пайдаланылғанын көрсет. Егер сенімді болмасаң \"мүмкін\" деп белгіле.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    /// Proxy the message (plus caller history) with no local context.
    Plain,
    /// Inject retrieved snippets and the system instruction; caller
    /// history is ignored.
    LocalRag,
}

pub fn compose(
    message: &str,
    history: &[HistoryTurn],
    contexts: &[ContextSnippet],
    mode: ChatMode,
) -> Vec<MessageTurn> {
    match mode {
        ChatMode::LocalRag => {
            let context_text = contexts
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    format!(
                        "#{} • {}\n{}",
                        i + 1,
                        c.meta.name.as_deref().unwrap_or(""),
                        c.text
                    )
                })
                .collect::<Vec<_>>()
                .join("\n\n---\n\n");

            let user_content = format!(
                "Пайдаланушы сұрағы:\n{}\n\nКонтексттер:\n{}",
                message, context_text
            );

            vec![
                MessageTurn::new("system", SYSTEM_INTRO),
                MessageTurn::new("user", user_content),
            ]
        }
        ChatMode::Plain => {
            let mut turns: Vec<MessageTurn> = history
                .iter()
                .filter_map(|h| match (h.role.as_deref(), h.text.as_deref()) {
                    (Some(role), Some(text)) if !role.is_empty() && !text.is_empty() => {
                        Some(MessageTurn::new(role, text))
                    }
                    _ => None,
                })
                .collect();

            turns.push(MessageTurn::new("user", message));
            turns
        }
    }
}
