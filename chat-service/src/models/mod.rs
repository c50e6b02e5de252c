pub mod chat;
pub mod place;

pub use chat::{ChatRequest, ChatResponse, ContextMeta, ContextSnippet, DebugInfo, HistoryTurn};
pub use place::PlaceRecord;
