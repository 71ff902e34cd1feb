//! Request middleware

use axum::{extract::Request, middleware::Next, response::Response};

use crate::{DELIVERY_HEADER, EVENT_HEADER};

#[cfg(test)]
#[path = "middleware_tests.rs"]
mod tests;

/// Request tracing middleware.
///
/// Logs every request with a generated request id, and with GitHub's
/// delivery id and event kind when present, so a delivery in GitHub's log can
/// be matched to the server log.
pub async fn tracing_middleware(request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let delivery_id = header_value(&request, DELIVERY_HEADER);
    let event = header_value(&request, EVENT_HEADER);

    tracing::info!(
        request_id = %request_id,
        delivery = %delivery_id,
        event = %event,
        method = %request.method(),
        uri = %request.uri(),
        "Request started"
    );

    let response = next.run(request).await;

    tracing::info!(
        request_id = %request_id,
        delivery = %delivery_id,
        status = %response.status(),
        "Request completed"
    );

    response
}

fn header_value(request: &Request, name: &str) -> String {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}
