use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;

use cinelog_observability::RequestMetrics;

use crate::app::errors;
use crate::limiter::RateLimiter;

/// Outermost layer: count the request before dispatch, then record the
/// response status and elapsed wall time on the way back out.
pub async fn capture_metrics(
    State(metrics): State<Arc<RequestMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    metrics.record_received();
    let started = Instant::now();

    let response = next.run(req).await;

    metrics.record_response(response.status().as_u16(), started.elapsed());
    response
}

/// Admission control: one token per request, across all clients.
pub async fn enforce_admission(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    if !limiter.allow() {
        return errors::rate_limit_exceeded_response();
    }
    next.run(req).await
}

/// Responder for the catch-panic layer: log the payload, tell the client
/// to drop the connection, and answer with the generic server error. The
/// panic never propagates past this layer.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = detail, "request handler panicked");

    let mut headers = HeaderMap::new();
    headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
    errors::error_response_with_headers(
        StatusCode::INTERNAL_SERVER_ERROR,
        errors::SERVER_ERROR_MESSAGE,
        headers,
    )
}
