//! Metrics tracking
//!
//! Rolling counters for requests attempted, requests succeeded, and
//! cumulative latency. Pure bookkeeping, no I/O; snapshots feed the poll
//! payload so the dispatcher can make routing decisions.

use std::sync::Mutex;

use relay_core::domain::metrics::MetricsSnapshot;

#[derive(Debug, Default)]
struct Counters {
    total: u64,
    successful: u64,
    cumulative_latency_ms: f64,
}

/// Thread-safe metrics counters shared between the scheduler and the
/// request processors
///
/// Counters only ever move forward, and `successful <= total` holds by
/// construction: both are incremented under the same lock.
#[derive(Debug, Default)]
pub struct MetricsTracker {
    inner: Mutex<Counters>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed request and its wall-clock latency
    pub fn record_success(&self, latency_ms: f64) {
        let mut counters = self.inner.lock().unwrap();
        counters.total += 1;
        counters.successful += 1;
        counters.cumulative_latency_ms += latency_ms;
    }

    /// Records a failed request
    pub fn record_failure(&self) {
        let mut counters = self.inner.lock().unwrap();
        counters.total += 1;
    }

    /// Derives a snapshot for the next poll payload
    pub fn snapshot(&self, current_load: usize) -> MetricsSnapshot {
        let counters = self.inner.lock().unwrap();
        MetricsSnapshot::derive(
            counters.total,
            counters.successful,
            counters.cumulative_latency_ms,
            current_load,
        )
    }
}
