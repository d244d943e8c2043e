//! Session domain model
//!
//! Represents a worker's registered identity with the dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Capability descriptor advertised at registration time
///
/// Immutable after construction; the dispatcher uses it to decide which
/// requests this worker may be assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Modalities this worker can service (e.g., "text", "image")
    pub supported_models: Vec<String>,

    /// Upper bound on requests processed at once
    pub max_concurrent: usize,

    /// Whether the worker can deliver incremental chunks
    pub streaming_support: bool,

    /// Platform identifier (e.g., "linux", "macos")
    pub platform: String,
}

/// A registered session with the dispatcher
///
/// Issued exactly once at startup. A worker without a session is in the
/// unregistered state and must not poll; there is no re-registration
/// path, so losing the session is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Dispatcher-issued session identifier
    pub id: String,

    /// The capabilities this session was registered with
    pub capabilities: Capabilities,

    /// When registration completed
    pub created_at: DateTime<Utc>,
}
