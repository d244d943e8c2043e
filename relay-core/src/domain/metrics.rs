//! Worker health metrics
//!
//! The snapshot is included in every poll payload so the dispatcher can
//! route work toward healthy, under-loaded workers.

use serde::{Deserialize, Serialize};

/// Point-in-time view of a worker's health
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Requests currently being processed
    pub current_load: usize,

    /// Mean completion latency in milliseconds, 0.0 until the first success
    pub avg_latency_ms: f64,

    /// Percentage of attempted requests that succeeded, 100.0 until the
    /// first attempt (an idle worker has not failed anything yet)
    pub success_rate: f64,
}

impl MetricsSnapshot {
    /// Derives a snapshot from raw counters.
    ///
    /// Invariant expected of callers: `successful <= total`.
    pub fn derive(
        total: u64,
        successful: u64,
        cumulative_latency_ms: f64,
        current_load: usize,
    ) -> Self {
        let success_rate = if total == 0 {
            100.0
        } else {
            (successful as f64 / total as f64) * 100.0
        };

        let avg_latency_ms = if successful == 0 {
            0.0
        } else {
            cumulative_latency_ms / successful as f64
        };

        Self {
            current_load,
            avg_latency_ms,
            success_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_is_full_before_any_attempt() {
        let snapshot = MetricsSnapshot::derive(0, 0, 0.0, 0);
        assert_eq!(snapshot.success_rate, 100.0);
        assert_eq!(snapshot.avg_latency_ms, 0.0);
    }

    #[test]
    fn success_rate_tracks_counters() {
        let snapshot = MetricsSnapshot::derive(4, 3, 0.0, 0);
        assert_eq!(snapshot.success_rate, 75.0);

        let snapshot = MetricsSnapshot::derive(10, 0, 0.0, 0);
        assert_eq!(snapshot.success_rate, 0.0);
    }

    #[test]
    fn avg_latency_divides_by_successes_only() {
        // Two successes at 100ms and 300ms; failures do not dilute the mean.
        let snapshot = MetricsSnapshot::derive(5, 2, 400.0, 1);
        assert_eq!(snapshot.avg_latency_ms, 200.0);
        assert_eq!(snapshot.current_load, 1);
    }

    #[test]
    fn avg_latency_is_zero_without_successes() {
        let snapshot = MetricsSnapshot::derive(3, 0, 0.0, 2);
        assert_eq!(snapshot.avg_latency_ms, 0.0);
    }
}
