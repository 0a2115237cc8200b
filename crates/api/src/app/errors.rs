//! Uniform error responses.
//!
//! Every failure a client can see goes through one of these helpers, so
//! the envelope shape (`{"error": ...}`) and the logging policy stay in
//! one place. Server-side detail is logged here and never serialized.

use std::collections::BTreeMap;

use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::Response;
use serde::Serialize;

use cinelog_store::StoreError;

use crate::app::codec::{self, ReadError};

pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";
pub const RATE_LIMIT_MESSAGE: &str = "rate limit exceeded";

/// The error envelope; `error` is either a message string or a
/// field-to-message map.
#[derive(Debug, Serialize)]
struct ErrorEnvelope<T: Serialize> {
    error: T,
}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    error_response_with_headers(status, message, HeaderMap::new())
}

pub fn error_response_with_headers(
    status: StatusCode,
    message: &str,
    headers: HeaderMap,
) -> Response {
    envelope_response(status, &message, headers)
}

/// 404 for a missing record, an unparseable id, or an unmatched route.
pub fn not_found_response() -> Response {
    error_response(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
}

/// 405 for a known route hit with the wrong method.
pub fn method_not_allowed_response(method: &Method) -> Response {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &format!("the {method} method is not supported for this resource"),
    )
}

/// 400 for any strict-decode failure; the `ReadError` display text is
/// the client-facing message.
pub fn bad_request_response(err: &ReadError) -> Response {
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

/// 422 carrying the full field-to-message map.
pub fn failed_validation_response(errors: &BTreeMap<String, String>) -> Response {
    envelope_response(StatusCode::UNPROCESSABLE_ENTITY, errors, HeaderMap::new())
}

pub fn rate_limit_exceeded_response() -> Response {
    error_response(StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE)
}

/// 500: log the detail, answer with the generic message.
pub fn server_error_response<E: std::fmt::Display>(err: E) -> Response {
    tracing::error!(error = %err, "request failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE)
}

/// Map a store failure onto the HTTP taxonomy: `NotFound` is a 404,
/// everything else is logged and answered generically.
pub fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::NotFound => not_found_response(),
        other => server_error_response(other),
    }
}

fn envelope_response<T: Serialize>(status: StatusCode, error: &T, headers: HeaderMap) -> Response {
    match codec::write_json(status, &ErrorEnvelope { error }, headers) {
        Ok(response) => response,
        // An envelope that cannot encode leaves only a bare 500.
        Err(err) => {
            tracing::error!(error = %err, "failed to encode error envelope");
            let mut response = Response::new(axum::body::Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}
