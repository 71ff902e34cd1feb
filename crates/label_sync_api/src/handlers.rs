//! HTTP request handlers
//!
//! The webhook handler only pulls the GitHub headers and the raw body out of
//! the request. Everything else happens in [`label_sync_core`].

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use label_sync_core::{DeliveryOutcome, WebhookDelivery};
use serde::{Deserialize, Serialize};

use crate::{errors::WebhookError, AppState, DELIVERY_HEADER, EVENT_HEADER, SIGNATURE_HEADER};

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;

/// Body returned for every acknowledged delivery
pub const ACK_BODY: &str = "OKAY";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Receive a GitHub webhook delivery.
///
/// `POST /`
///
/// Responds `200 OKAY` when the delivery was applied to every target or its
/// action does not affect labels, `400` when the signature is wrong or the
/// event cannot be routed, and `502` when some targets could not be updated.
/// The body is read as raw bytes so the signature is computed over exactly
/// what GitHub sent.
pub async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let delivery = WebhookDelivery {
        event: header_str(&headers, EVENT_HEADER).unwrap_or_default(),
        signature: header_str(&headers, SIGNATURE_HEADER),
        delivery_id: header_str(&headers, DELIVERY_HEADER),
        body: &body,
    };

    match state.processor.process(delivery).await? {
        DeliveryOutcome::Applied(result) if !result.is_success() => {
            Err(WebhookError::TargetsFailed(result.failed_targets))
        }
        DeliveryOutcome::Applied(_) | DeliveryOutcome::Ignored { .. } => {
            Ok((StatusCode::OK, ACK_BODY))
        }
    }
}

/// Health check endpoint
///
/// `GET /health`
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    /// Service status
    pub status: String,

    /// Service version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Current timestamp (ISO 8601)
    pub timestamp: String,
}
