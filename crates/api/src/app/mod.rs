//! HTTP API application wiring (Axum router + service wiring).
//!
//! If you're new to Rust, this folder is structured like:
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses
//! - `codec.rs`: strict JSON reading and uniform JSON writing

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use cinelog_observability::RequestMetrics;
use cinelog_store::TitleStore;

use crate::limiter::RateLimiter;
use crate::middleware;

pub mod codec;
pub mod dto;
pub mod errors;
pub mod routes;

/// Shared services handed to every handler.
///
/// Constructed once in `main` (or a test harness) and injected; handlers
/// never reach for globals.
pub struct AppServices {
    pub titles: Arc<dyn TitleStore>,
    pub metrics: Arc<RequestMetrics>,
    pub environment: String,
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and
/// the black-box tests).
///
/// Layer order, outermost first: metrics capture, panic recovery,
/// admission control, then the routes. Metrics therefore count every
/// request, including ones the limiter turns away, and a panic response
/// is still measured on the way out.
pub fn build_app(services: Arc<AppServices>, limiter: Arc<RateLimiter>) -> Router {
    let metrics = services.metrics.clone();

    routes::router()
        .fallback(routes::not_found)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    metrics,
                    middleware::capture_metrics,
                ))
                .layer(CatchPanicLayer::custom(middleware::handle_panic))
                .layer(axum::middleware::from_fn_with_state(
                    limiter,
                    middleware::enforce_admission,
                )),
        )
}
