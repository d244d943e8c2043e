//! Registration DTOs

use serde::{Deserialize, Serialize};

use crate::domain::session::Capabilities;

/// Capability descriptor as it appears on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    pub supported_models: Vec<String>,
    pub max_concurrent_requests: usize,
    pub streaming_support: bool,
    pub platform: String,
}

impl From<&Capabilities> for CapabilityDescriptor {
    fn from(caps: &Capabilities) -> Self {
        Self {
            supported_models: caps.supported_models.clone(),
            max_concurrent_requests: caps.max_concurrent,
            streaming_support: caps.streaming_support,
            platform: caps.platform.clone(),
        }
    }
}

/// Request to register a worker with the dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub client_identifier: String,
    pub capabilities: CapabilityDescriptor,
    pub max_concurrent_requests: usize,
    pub geographic_location: String,
}

impl RegisterRequest {
    pub fn new(client_identifier: String, capabilities: &Capabilities, location: String) -> Self {
        Self {
            client_identifier,
            max_concurrent_requests: capabilities.max_concurrent,
            capabilities: capabilities.into(),
            geographic_location: location,
        }
    }
}

/// Successful registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub session_id: String,
}
