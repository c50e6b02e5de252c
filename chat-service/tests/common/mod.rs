//! Test helpers for chat-service integration tests.

#![allow(dead_code)]

use chat_service::build_router;
use chat_service::config::{
    AssetsConfig, ChatConfig, GeminiSettings, OpenAiSettings, ProviderKind, RetrievalConfig,
};
use chat_service::services::providers::ChatProvider;
use chat_service::startup::AppState;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use http_body_util::BodyExt;
use service_core::config::{Config, Environment};
use std::sync::Arc;
use tempfile::TempDir;

/// Configuration pointing at a throwaway static directory.
pub fn test_config(static_dir: &TempDir) -> ChatConfig {
    ChatConfig {
        common: Config { port: 0 },
        environment: Environment::Dev,
        provider: ProviderKind::Mock,
        gemini: GeminiSettings {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            api_base: "http://127.0.0.1:1".to_string(),
            timeout_secs: 30,
        },
        openai: OpenAiSettings {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            api_base: "http://127.0.0.1:1".to_string(),
            timeout_secs: 30,
        },
        retrieval: RetrievalConfig { top_k: 4 },
        assets: AssetsConfig {
            static_dir: static_dir.path().to_str().unwrap().to_string(),
        },
        rate_limit_per_min: 60,
    }
}

/// Router wired to the given provider, serving statics from a tempdir.
pub fn test_router(config: ChatConfig, provider: Arc<dyn ChatProvider>) -> Router {
    build_router(AppState { config, provider })
}

/// Small dataset with one obvious match per query used in the RAG tests.
pub const PLACES_FIXTURE: &str = r#"[
  {
    "id": 1,
    "name": "Бекет-Ата",
    "desc": "Оғыланды шатқалындағы жерасты мешіті, басты зиярат орны.",
    "cat": "мешіт",
    "century": 18,
    "tags": ["әулие", "зиярат"],
    "lat": 43.596,
    "lng": 54.072
  },
  {
    "id": "sherkala",
    "name": "Шерқала",
    "desc": "Шетпе маңындағы жалғыз тау.",
    "cat": "тау",
    "tags": ["шетпе"],
    "lat": 44.3,
    "lng": 52.08
  },
  {
    "id": "shopan-ata",
    "name": "Шопан-Ата",
    "desc": "Жерасты мешіті мен қорымы.",
    "cat": "мешіт",
    "century": "X—XII",
    "tags": ["қорым"],
    "lat": 43.545,
    "lng": 53.8
  }
]"#;

pub fn write_places(dir: &TempDir, json: &str) {
    std::fs::write(dir.path().join("places.json"), json).expect("Failed to write places fixture");
}

/// POST a JSON payload to the given path.
pub fn post_json(path: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Response body was not valid JSON")
}
