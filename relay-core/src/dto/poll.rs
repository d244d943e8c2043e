//! Poll DTOs

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::metrics::MetricsSnapshot;
use crate::domain::request::WorkRequest;

/// Poll payload carrying the worker's current health metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollRequest {
    pub current_load: usize,
    pub average_response_time: f64,
    pub success_rate: f64,
    /// Unix timestamp (fractional seconds) of this poll
    pub last_poll: f64,
}

impl PollRequest {
    /// Builds a poll payload from a metrics snapshot, stamped with the
    /// current time.
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        Self {
            current_load: snapshot.current_load,
            average_response_time: snapshot.avg_latency_ms,
            success_rate: snapshot.success_rate,
            last_poll: Utc::now().timestamp_millis() as f64 / 1000.0,
        }
    }
}

/// Wire shape of a poll response
///
/// `has_request: true` implies `request` is present; the client layer
/// converts this into a `PollOutcome` and rejects inconsistent bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResponse {
    pub has_request: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<WorkRequest>,
}
