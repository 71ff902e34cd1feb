//! Tests for handlers module
//!
//! Deliveries go through the full router and a real GitHub client pointed at
//! a wiremock server standing in for both target repositories.

use super::*;
use axum::{body::Body, http::Request, Router};
use github_client::{create_token_client, GitHubClient};
use http_body_util::BodyExt;
use label_sync_core::{compute_signature, SyncConfig, WebhookProcessor};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::routes::create_router;

const SECRET: &str = "It's a Secret to Everybody";

const CONFIG: &str = r#"
github_token = "ghp_test"
webhook_secret = "It's a Secret to Everybody"
target_repos = ["octo/alpha", "octo/beta"]

[entity_label_config.issue]
prefix = "issue"
color = "b4f291"

[entity_label_config.milestone]
prefix = "milestone"
color = "5319e7"
"#;

const TARGETS: [&str; 2] = ["alpha", "beta"];

fn test_app(mock_server: &MockServer) -> Router {
    let config = SyncConfig::from_toml_str(CONFIG).expect("test configuration is valid");
    let octocrab = create_token_client(
        &config.github_token,
        Some(&mock_server.uri()),
        Duration::from_secs(5),
    )
    .expect("client should build");
    let processor = WebhookProcessor::new(&config, Arc::new(GitHubClient::new(octocrab)))
        .expect("processor should build");

    create_router(AppState::new(processor), Duration::from_secs(30))
}

fn issue_body(action: &str, title: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "action": action,
        "issue": { "number": 42, "title": title },
        "repository": { "full_name": "octo/source" }
    }))
    .unwrap()
}

fn delivery(event: &str, body: Vec<u8>, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/")
        .header("Content-Type", "application/json")
        .header("X-Github-Event", event)
        .header("X-Github-Delivery", "72d3162e-cc78-11e3-81ab-4c9367dc0958");
    if let Some(signature) = signature {
        builder = builder.header("X-Hub-Signature", signature);
    }
    builder.body(Body::from(body)).unwrap()
}

fn signed(event: &str, body: Vec<u8>) -> Request<Body> {
    let signature = compute_signature(SECRET.as_bytes(), &body);
    delivery(event, body, Some(signature))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn mount_nothing_expected(mock_server: &MockServer) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(mock_server)
        .await;
}

// ============================================================================
// Webhook Scenarios
// ============================================================================

/// Opened issue: both targets get a new label
#[tokio::test]
async fn test_opened_issue_creates_label_on_every_target() {
    let mock_server = MockServer::start().await;
    for repo in TARGETS {
        Mock::given(method("GET"))
            .and(path(format!("/repos/octo/{repo}/labels/issue:42")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/repos/octo/{repo}/labels")))
            .and(body_json(json!({
                "name": "issue:42",
                "description": "Fix bug",
                "color": "b4f291"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": "issue:42",
                "description": "Fix bug",
                "color": "b4f291"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let app = test_app(&mock_server);
    let response = app
        .oneshot(signed("issues", issue_body("opened", "Fix bug")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OKAY");
}

/// Edited issue: only the description is modified, nothing is created
#[tokio::test]
async fn test_edited_issue_modifies_only_the_description() {
    let mock_server = MockServer::start().await;
    for repo in TARGETS {
        Mock::given(method("GET"))
            .and(path(format!("/repos/octo/{repo}/labels/issue:42")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "issue:42",
                "description": "Fix bug",
                "color": "b4f291"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("PATCH"))
            .and(path(format!("/repos/octo/{repo}/labels/issue:42")))
            .and(body_json(json!({ "description": "Fix bug properly" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "issue:42",
                "description": "Fix bug properly",
                "color": "b4f291"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = test_app(&mock_server);
    let response = app
        .oneshot(signed("issues", issue_body("edited", "Fix bug properly")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OKAY");
}

/// Deleted issue: both targets get a delete, whether the label exists or not
#[tokio::test]
async fn test_deleted_issue_deletes_label_on_every_target() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/repos/octo/alpha/labels/issue:42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/repos/octo/beta/labels/issue:42"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = test_app(&mock_server);
    let response = app
        .oneshot(signed("issues", issue_body("deleted", "Fix bug")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

/// Tampered body: rejected before anything reaches GitHub
#[tokio::test]
async fn test_tampered_body_is_rejected_without_remote_calls() {
    let mock_server = MockServer::start().await;
    mount_nothing_expected(&mock_server).await;

    let signature = compute_signature(SECRET.as_bytes(), &issue_body("opened", "Fix bug"));
    let tampered = issue_body("opened", "Fix bug!");

    let app = test_app(&mock_server);
    let response = app
        .oneshot(delivery("issues", tampered, Some(signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"]["code"], "InvalidSignature");
}

#[tokio::test]
async fn test_missing_signature_is_rejected() {
    let mock_server = MockServer::start().await;
    mount_nothing_expected(&mock_server).await;

    let app = test_app(&mock_server);
    let response = app
        .oneshot(delivery("issues", issue_body("opened", "Fix bug"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unroutable_event_is_rejected() {
    let mock_server = MockServer::start().await;
    mount_nothing_expected(&mock_server).await;

    let app = test_app(&mock_server);
    let response = app
        .oneshot(signed("push", br#"{"ref":"refs/heads/main"}"#.to_vec()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"]["code"], "UnroutableEvent");
}

#[tokio::test]
async fn test_missing_event_header_is_rejected() {
    let mock_server = MockServer::start().await;
    mount_nothing_expected(&mock_server).await;

    let body = issue_body("opened", "Fix bug");
    let signature = compute_signature(SECRET.as_bytes(), &body);
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("X-Hub-Signature", signature)
        .body(Body::from(body))
        .unwrap();

    let response = test_app(&mock_server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ignored_action_is_acknowledged() {
    let mock_server = MockServer::start().await;
    mount_nothing_expected(&mock_server).await;

    let app = test_app(&mock_server);
    let response = app
        .oneshot(signed("issues", issue_body("closed", "Fix bug")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OKAY");
}

#[tokio::test]
async fn test_malformed_payload_is_rejected() {
    let mock_server = MockServer::start().await;
    mount_nothing_expected(&mock_server).await;

    let app = test_app(&mock_server);
    let response = app
        .oneshot(signed("milestone", b"{not json".to_vec()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// One failing target: the other is still updated and the failure is reported
#[tokio::test]
async fn test_failing_target_returns_bad_gateway() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/alpha/labels/milestone:3"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/beta/labels/milestone:3"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/beta/labels"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = serde_json::to_vec(&json!({
        "action": "created",
        "milestone": { "number": 3, "title": "v1.0" }
    }))
    .unwrap();

    let app = test_app(&mock_server);
    let response = app.oneshot(signed("milestone", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let failed = body["error"]["details"]["failedTargets"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["repository"], "octo/alpha");
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_returns_json() {
    let response = health_check().await;

    assert_eq!(response.0.status, "healthy");
    assert_eq!(
        response.0.version,
        Some(env!("CARGO_PKG_VERSION").to_string())
    );
    let parsed = chrono::DateTime::parse_from_rfc3339(&response.0.timestamp);
    assert!(parsed.is_ok(), "Timestamp should be valid ISO 8601 format");
}

#[tokio::test]
async fn test_health_route_is_served() {
    let mock_server = MockServer::start().await;
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = test_app(&mock_server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
