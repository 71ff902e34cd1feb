//! HTTP routing configuration
//!
//! # Route Structure
//!
//! - POST   / - GitHub webhook deliveries
//! - GET    /health - Health check

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{handlers, middleware as api_middleware, AppState};

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;

/// Default bound on handling one request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Create the complete API router with all routes configured.
///
/// This function sets up:
/// - The webhook and health routes
/// - Request tracing
/// - Timeout handling
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    // Headers are not included in spans: the signature header would be logged
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new())
        .on_response(DefaultOnResponse::new());

    let timeout_layer = TimeoutLayer::new(request_timeout);

    Router::new()
        .route("/", post(handlers::webhook_handler))
        .route("/health", get(handlers::health_check))
        .layer(middleware::from_fn(api_middleware::tracing_middleware))
        .layer(timeout_layer)
        .layer(trace_layer)
        .with_state(state)
}
