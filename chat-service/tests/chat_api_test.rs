//! End-to-end tests for the chat endpoints against an in-process router.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chat_service::services::providers::mock::MockProvider;
use common::{post_json, read_json, test_config, test_router, write_places, PLACES_FIXTURE};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

#[tokio::test]
async fn non_post_methods_get_405_with_allow_header() {
    let dir = TempDir::new().unwrap();
    let app = test_router(test_config(&dir), Arc::new(MockProvider::new()));

    for path in ["/api/chat", "/api/chat-local-rag"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
        let body = read_json(response).await;
        assert_eq!(body["error"], "Method not allowed");
    }
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockProvider::new());
    let app = test_router(test_config(&dir), mock.clone());

    for payload in [json!({ "message": "   " }), json!({})] {
        let response = app
            .clone()
            .oneshot(post_json("/api/chat", payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["error"], "No message provided");
    }
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn oversized_message_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockProvider::new());
    let app = test_router(test_config(&dir), mock.clone());

    let response = app
        .oneshot(post_json("/api/chat", json!({ "message": "ж".repeat(6001) })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Message too long (max 6000 chars)");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let dir = TempDir::new().unwrap();
    let app = test_router(test_config(&dir), Arc::new(MockProvider::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Json parse error"));
}

#[tokio::test]
async fn missing_api_key_fails_before_any_upstream_call() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockProvider::disabled());
    let app = test_router(test_config(&dir), mock.clone());

    let response = app
        .oneshot(post_json("/api/chat", json!({ "message": "Сәлем" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Missing GEMINI_API_KEY");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn plain_chat_returns_answer_without_contexts() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockProvider::with_reply("Бекет-Ата Оғыландыда орналасқан."));
    let app = test_router(test_config(&dir), mock.clone());

    let response = app
        .oneshot(post_json("/api/chat", json!({ "message": "Бекет-Ата қайда?" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );

    let body = read_json(response).await;
    assert_eq!(body["answer"], "Бекет-Ата Оғыландыда орналасқан.");
    assert_eq!(body["contexts"], json!([]));
    // Dev responses expose which model answered and how many candidates came back.
    assert_eq!(body["_debug"]["model"], "mock");
    assert_eq!(body["_debug"]["candidates"], 1);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn debug_block_is_absent_in_production() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    config.environment = service_core::config::Environment::Prod;
    let app = test_router(config, Arc::new(MockProvider::new()));

    let response = app
        .oneshot(post_json("/api/chat", json!({ "message": "Сәлем" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body.get("_debug").is_none());
}

#[tokio::test]
async fn plain_chat_forwards_history_in_order() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockProvider::new());
    let app = test_router(test_config(&dir), mock.clone());

    let payload = json!({
        "message": "Ал Шопан-Ата ше?",
        "history": [
            { "role": "user", "text": "Бекет-Ата қайда?" },
            { "role": "model", "text": "Оғыланды шатқалында." },
            { "role": "user" }
        ]
    });
    let response = app.oneshot(post_json("/api/chat", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let turns = mock.last_turns();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0].role, "user");
    assert_eq!(turns[0].text, "Бекет-Ата қайда?");
    assert_eq!(turns[1].role, "model");
    assert_eq!(turns[1].text, "Оғыланды шатқалында.");
    // The incomplete history entry is dropped; the new message comes last.
    assert_eq!(turns[2].role, "user");
    assert_eq!(turns[2].text, "Ал Шопан-Ата ше?");
}

#[tokio::test]
async fn rag_chat_attaches_matching_contexts() {
    let dir = TempDir::new().unwrap();
    write_places(&dir, PLACES_FIXTURE);
    let mock = Arc::new(MockProvider::new());
    let app = test_router(test_config(&dir), mock.clone());

    let response = app
        .oneshot(post_json(
            "/api/chat-local-rag",
            json!({ "message": "Бекет ата қайда орналасқан?" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;

    let contexts = body["contexts"].as_array().unwrap();
    assert_eq!(contexts.len(), 2);
    assert_eq!(contexts[0]["id"], "1");
    assert_eq!(contexts[0]["meta"]["name"], "Бекет-Ата");
    assert_eq!(contexts[1]["id"], "shopan-ata");
    assert!(contexts[0]["score"].as_u64().unwrap() > contexts[1]["score"].as_u64().unwrap());
    // Snippet bodies only travel to the model, never back to the client.
    assert!(contexts[0].get("text").is_none());

    let turns = mock.last_turns();
    assert_eq!(turns[0].role, "system");
    assert_eq!(turns[1].role, "user");
    assert!(turns[1].text.contains("Пайдаланушы сұрағы:\nБекет ата қайда орналасқан?"));
    assert!(turns[1].text.contains("#1 • Бекет-Ата"));
    assert!(turns[1].text.contains("Категория: мешіт"));
}

#[tokio::test]
async fn rag_chat_ignores_client_history() {
    let dir = TempDir::new().unwrap();
    write_places(&dir, PLACES_FIXTURE);
    let mock = Arc::new(MockProvider::new());
    let app = test_router(test_config(&dir), mock.clone());

    let payload = json!({
        "message": "Шерқала туралы айт",
        "history": [{ "role": "user", "text": "бұрынғы сұрақ" }]
    });
    let response = app
        .oneshot(post_json("/api/chat-local-rag", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let turns = mock.last_turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, "system");
    assert!(!turns[1].text.contains("бұрынғы сұрақ"));
}

#[tokio::test]
async fn rag_chat_falls_back_to_top_of_dataset_when_nothing_matches() {
    let dir = TempDir::new().unwrap();
    write_places(&dir, PLACES_FIXTURE);
    let app = test_router(test_config(&dir), Arc::new(MockProvider::new()));

    let response = app
        .oneshot(post_json(
            "/api/chat-local-rag",
            json!({ "message": "qqq zzz www" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let contexts = body["contexts"].as_array().unwrap();
    // Dataset order, zero scores.
    assert_eq!(contexts.len(), 3);
    assert_eq!(contexts[0]["id"], "1");
    assert_eq!(contexts[0]["score"], 0);
}

#[tokio::test]
async fn rag_chat_survives_a_missing_dataset() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockProvider::with_reply("Жауап"));
    let app = test_router(test_config(&dir), mock.clone());

    let response = app
        .oneshot(post_json(
            "/api/chat-local-rag",
            json!({ "message": "Бекет-Ата қайда?" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["answer"], "Жауап");
    assert_eq!(body["contexts"], json!([]));
    assert_eq!(mock.call_count(), 1);
}
