//! Label Sync webhook server
//!
//! This crate receives GitHub webhook deliveries for issues and milestones and
//! hands them to [`label_sync_core::WebhookProcessor`], which relays them into
//! labels on the configured target repositories.
//!
//! # Architecture
//!
//! This crate exists in the HTTP layer and handles:
//! - Extracting the GitHub headers and the raw body
//! - Error mapping from domain to HTTP
//! - Routing and server configuration
//!
//! The dependency flows: HTTP API → Business Logic, never the reverse.

use std::sync::Arc;

use label_sync_core::WebhookProcessor;

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

// Re-export key types for convenience
pub use errors::{ErrorResponse, WebhookError};
pub use server::{ApiConfig, ApiServer};

/// Default API port
pub const DEFAULT_PORT: u16 = 8080;

/// Header carrying the `sha1=` body signature
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

/// Header naming the event kind
pub const EVENT_HEADER: &str = "x-github-event";

/// Header carrying GitHub's delivery id
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Verifies, routes and applies deliveries
    pub processor: Arc<WebhookProcessor>,
}

impl AppState {
    /// Create new application state around a webhook processor
    pub fn new(processor: WebhookProcessor) -> Self {
        Self {
            processor: Arc::new(processor),
        }
    }
}
