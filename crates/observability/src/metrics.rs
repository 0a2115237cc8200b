//! Request counters captured at the outer edge of the HTTP pipeline.
//!
//! One `RequestMetrics` is constructed at startup and shared behind an
//! `Arc`; there is no global registry. The middleware records into it and
//! the debug endpoint renders `snapshot()`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

/// Process-wide request counters.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    requests_received: AtomicU64,
    responses_sent: AtomicU64,
    processing_time_micros: AtomicU64,
    responses_by_status: Mutex<BTreeMap<u16, u64>>,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request before it is dispatched to the router.
    pub fn record_received(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a finished response and the wall time spent producing it.
    pub fn record_response(&self, status: u16, elapsed: Duration) {
        self.responses_sent.fetch_add(1, Ordering::Relaxed);
        self.processing_time_micros
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        *self.responses_by_status.lock().entry(status).or_insert(0) += 1;
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests_received: self.requests_received.load(Ordering::Relaxed),
            total_responses_sent: self.responses_sent.load(Ordering::Relaxed),
            total_processing_time_microseconds: self
                .processing_time_micros
                .load(Ordering::Relaxed),
            total_responses_sent_by_status: self.responses_by_status.lock().clone(),
        }
    }
}

/// Serializable view of the counters.
///
/// Field names are the wire names served by the debug endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests_received: u64,
    pub total_responses_sent: u64,
    pub total_processing_time_microseconds: u64,
    pub total_responses_sent_by_status: BTreeMap<u16, u64>,
}
