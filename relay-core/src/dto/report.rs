//! Result report DTOs
//!
//! Every terminal or incremental outcome of a request is delivered as a
//! `Report`. The `type` tag on the wire distinguishes the variants.

use serde::{Deserialize, Serialize};

/// One report sent back to the dispatcher for an in-flight request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Report {
    /// Incremental content for a streaming request. Sequence numbers are
    /// zero-based and strictly increasing within one request.
    Chunk {
        request_id: String,
        content: String,
        sequence: u64,
    },

    /// Terminal success, carrying the assembled response and wall-clock
    /// latency in milliseconds.
    Complete {
        request_id: String,
        full_response: String,
        response_time_ms: f64,
    },

    /// Terminal failure.
    Error {
        request_id: String,
        error_message: String,
        error_type: String,
    },
}

impl Report {
    /// The request this report belongs to.
    pub fn request_id(&self) -> &str {
        match self {
            Report::Chunk { request_id, .. }
            | Report::Complete { request_id, .. }
            | Report::Error { request_id, .. } => request_id,
        }
    }
}
