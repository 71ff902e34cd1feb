//! Tests for routes module

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use github_client::{create_token_client, GitHubClient};
use label_sync_core::{compute_signature, SyncConfig, WebhookProcessor};
use std::sync::Arc;
use tower::ServiceExt;

fn test_state() -> AppState {
    let config = SyncConfig::from_toml_str(
        r#"
github_token = "ghp_test"
webhook_secret = "secret"
target_repos = []

[entity_label_config.issue]
prefix = "issue"
color = "b4f291"
"#,
    )
    .unwrap();
    let octocrab = create_token_client(
        &config.github_token,
        Some("http://127.0.0.1:9"),
        Duration::from_secs(1),
    )
    .unwrap();
    let processor = WebhookProcessor::new(&config, Arc::new(GitHubClient::new(octocrab))).unwrap();
    AppState::new(processor)
}

#[tokio::test]
async fn test_health_route_exists() {
    let app = create_router(test_state(), Duration::from_secs(5));

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_route_only_accepts_post() {
    let app = create_router(test_state(), Duration::from_secs(5));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_router(test_state(), Duration::from_secs(5));

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signed_delivery_is_handled_on_root() {
    let app = create_router(test_state(), Duration::from_secs(5));
    let body = br#"{"action":"opened","issue":{"number":1,"title":"First"}}"#.to_vec();
    let signature = compute_signature(b"secret", &body);

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("X-Github-Event", "issues")
        .header("X-Hub-Signature", signature)
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unsigned_delivery_is_rejected_on_root() {
    let app = create_router(test_state(), Duration::from_secs(5));

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("X-Github-Event", "issues")
        .body(Body::from(r#"{"action":"opened"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
