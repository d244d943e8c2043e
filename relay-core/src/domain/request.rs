//! Work request domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One role/content pair from the request conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// A unit of work assigned by the dispatcher
///
/// Owned by the request processor for the duration of execution and
/// discarded after the terminal report. The same request identifier is
/// never resubmitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkRequest {
    pub request_id: String,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: bool,
    /// Set worker-side when the assignment is received; not on the wire.
    #[serde(skip, default = "Utc::now")]
    pub assigned_at: DateTime<Utc>,
}

/// Result of one poll exchange with the dispatcher
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// No work available; the dispatcher may recommend a cadence for the
    /// next poll, in seconds.
    Idle { poll_interval: Option<u64> },

    /// A request was assigned to this worker.
    Assigned(WorkRequest),
}
