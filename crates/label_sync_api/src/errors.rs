//! Error handling and HTTP error conversion
//!
//! Domain errors from `label_sync_core` are converted to HTTP responses here.
//! GitHub only looks at the status code of a delivery response; the JSON body
//! is there for whoever reads the delivery log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use label_sync_core::{SyncError, TargetFailure};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Standard error response for all API errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetails,
}

/// Error details structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Additional context (optional, type varies by error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Why a webhook delivery was not acknowledged.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Unroutable event '{0}'")]
    UnroutableEvent(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Some target repositories could not be updated
    #[error("Label update failed for {} target repositories", .0.len())]
    TargetsFailed(Vec<TargetFailure>),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidSignature | Self::UnroutableEvent(_) | Self::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::TargetsFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "InvalidSignature",
            Self::UnroutableEvent(_) => "UnroutableEvent",
            Self::InvalidPayload(_) => "InvalidPayload",
            Self::TargetsFailed(_) => "TargetsFailed",
            Self::Internal(_) => "InternalError",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::TargetsFailed(failures) => Some(json!({
                "failedTargets": failures
                    .iter()
                    .map(|f| json!({ "repository": f.repo.to_string(), "error": f.error }))
                    .collect::<Vec<_>>()
            })),
            _ => None,
        }
    }

    fn to_response_body(&self) -> ErrorResponse {
        let message = match self {
            // Details of internal failures stay in the server log
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        ErrorResponse {
            error: ErrorDetails {
                code: self.code().to_string(),
                message,
                details: self.details(),
            },
        }
    }
}

impl From<SyncError> for WebhookError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::InvalidSignature => Self::InvalidSignature,
            SyncError::UnroutableEvent { event } => Self::UnroutableEvent(event),
            SyncError::InvalidPayload(reason) => Self::InvalidPayload(reason),
            other @ (SyncError::Remote(_) | SyncError::Configuration(_)) => {
                Self::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log error server-side
        log_error(&self, status);

        (status, Json(self.to_response_body())).into_response()
    }
}

/// Log error with appropriate level based on HTTP status
fn log_error(error: &WebhookError, status: StatusCode) {
    match status {
        StatusCode::INTERNAL_SERVER_ERROR | StatusCode::BAD_GATEWAY => {
            tracing::error!("Webhook error: {} - {}", status, error);
        }
        _ => {
            tracing::warn!("Webhook error: {} - {}", status, error);
        }
    }
}
