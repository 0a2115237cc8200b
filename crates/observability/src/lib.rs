//! Tracing, logging, and request metrics (shared setup).

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Request counters and their debug snapshot.
pub mod metrics;

pub use metrics::{MetricsSnapshot, RequestMetrics};
