//! HTTP API: server, routing, and request/response mapping.

pub mod app;
pub mod config;
pub mod limiter;
pub mod middleware;

/// Version string reported by the healthcheck and debug endpoints.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
