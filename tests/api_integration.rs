//! Integration tests for the HTTP API
//!
//! Tests endpoints through the router, no listener involved

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use carlbot::core::{create_router, IntentMatcher, ThinkingDelay};
use carlbot::RESET_MESSAGE;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_router(delay: ThinkingDelay) -> axum::Router {
    create_router(Arc::new(IntentMatcher::new()), delay)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn new_session(app: &axum::Router) -> String {
    let (status, json) = send(app, "POST", "/session/new", None).await;
    assert_eq!(status, StatusCode::OK);
    json["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router(ThinkingDelay::none());
    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(json["rules"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_match_endpoint() {
    let app = create_test_router(ThinkingDelay::none());

    let (status, json) = send(&app, "POST", "/match", Some(r#"{"text": "Who is Carl?"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rule"], "who_is_carl");
    assert!(!json["reply"].as_str().unwrap().is_empty());

    let (_, json) = send(&app, "POST", "/match", Some(r#"{"text": "xyzzy12345"}"#)).await;
    assert!(json["rule"].is_null());
}

#[tokio::test]
async fn test_quick_actions_listed() {
    let app = create_test_router(ThinkingDelay::none());
    let (status, json) = send(&app, "GET", "/quick-actions", None).await;

    assert_eq!(status, StatusCode::OK);
    let actions = json.as_array().unwrap();
    assert!(!actions.is_empty());
    assert_eq!(actions[0]["index"], 0);
    assert!(actions[0]["prompt"].is_string());
}

#[tokio::test]
async fn test_session_flow() {
    let app = create_test_router(ThinkingDelay::none());
    let id = new_session(&app).await;

    let (status, json) = send(&app, "GET", &format!("/session/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["turns"].as_array().unwrap().len(), 1);
    assert_eq!(json["turns"][0]["role"], "assistant");

    let (status, json) = send(
        &app,
        "POST",
        &format!("/session/{}/message", id),
        Some(r#"{"text": "what are his skills?", "wait": true}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user_turn"]["role"], "user");
    assert_eq!(json["user_turn"]["content"], "what are his skills?");
    assert_eq!(json["reply"]["role"], "assistant");

    let (_, json) = send(&app, "GET", &format!("/session/{}", id), None).await;
    assert_eq!(json["turns"].as_array().unwrap().len(), 3);
    assert_eq!(json["pending"], false);
}

#[tokio::test]
async fn test_message_while_pending_conflicts() {
    let app = create_test_router(ThinkingDelay::fixed(500));
    let id = new_session(&app).await;
    let uri = format!("/session/{}/message", id);

    let (status, json) = send(&app, "POST", &uri, Some(r#"{"text": "hello"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["reply"].is_null());

    let (status, _) = send(&app, "POST", &uri, Some(r#"{"text": "hello again"}"#)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_quick_action_endpoint() {
    let app = create_test_router(ThinkingDelay::none());
    let id = new_session(&app).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/session/{}/quick/0", id),
        Some(r#"{"wait": true}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user_turn"]["content"], "Who is Carl?");
    assert!(json["reply"]["content"].is_string());

    let (status, _) = send(&app, "POST", &format!("/session/{}/quick/42", id), Some("{}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_endpoint() {
    let app = create_test_router(ThinkingDelay::fixed(300));
    let id = new_session(&app).await;

    send(&app, "POST", &format!("/session/{}/message", id), Some(r#"{"text": "who is carl"}"#)).await;
    let (status, json) = send(&app, "POST", &format!("/session/{}/reset", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["turn"]["content"], RESET_MESSAGE);

    // The cancelled reply never shows up
    tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    let (_, json) = send(&app, "GET", &format!("/session/{}", id), None).await;
    let turns = json["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0]["content"], RESET_MESSAGE);
    assert_eq!(json["pending"], false);
}

#[tokio::test]
async fn test_session_not_found() {
    let app = create_test_router(ThinkingDelay::none());

    let (status, _) = send(&app, "GET", "/session/nonexistent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/session/nonexistent/reset", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/session/nonexistent/message",
        Some(r#"{"text": "hi"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_session() {
    let app = create_test_router(ThinkingDelay::fixed(300));
    let id = new_session(&app).await;
    send(&app, "POST", &format!("/session/{}/message", id), Some(r#"{"text": "hello"}"#)).await;

    let (_, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(json["sessions_active"], 1);

    let (status, _) = send(&app, "DELETE", &format!("/session/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/session/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(json["sessions_active"], 0);

    let (status, _) = send(&app, "DELETE", &format!("/session/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
