//! Relay Dispatcher Client
//!
//! A type-safe HTTP client for the dispatcher API consumed by relay
//! workers. Each operation is a single request/response exchange with a
//! bounded timeout; retry policy belongs to the caller (the scheduler
//! retries polls, registration failure is fatal, report failures are
//! logged and dropped).
//!
//! # Example
//!
//! ```no_run
//! use relay_client::DispatcherClient;
//! use relay_core::domain::session::Capabilities;
//! use relay_core::dto::register::RegisterRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), relay_client::ClientError> {
//!     let client = DispatcherClient::new("http://localhost:8080");
//!
//!     let capabilities = Capabilities {
//!         supported_models: vec!["text".to_string()],
//!         max_concurrent: 5,
//!         streaming_support: true,
//!         platform: "linux".to_string(),
//!     };
//!     let request = RegisterRequest::new("worker-1".to_string(), &capabilities, "local".to_string());
//!     let response = client.register(&request).await?;
//!
//!     println!("registered as {}", response.session_id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod poll;
mod report;
mod session;

pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Header carrying the dispatcher-issued session id on poll and report calls
pub const SESSION_HEADER: &str = "X-Browser-Session-ID";

const DEFAULT_REGISTER_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the dispatcher API
///
/// Operations are grouped into modules by concern:
/// - `session`: one-time worker registration
/// - `poll`: asking the dispatcher for work
/// - `report`: streaming chunks and terminal outcomes back
#[derive(Debug, Clone)]
pub struct DispatcherClient {
    /// Base URL of the dispatcher (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Timeout for the registration call (long, tolerates cold start)
    register_timeout: Duration,
    /// Timeout for poll and report calls (short, these are frequent)
    request_timeout: Duration,
}

impl DispatcherClient {
    /// Create a new dispatcher client with default timeouts
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the dispatcher API
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeouts(
            base_url,
            DEFAULT_REGISTER_TIMEOUT,
            DEFAULT_REQUEST_TIMEOUT,
        )
    }

    /// Create a dispatcher client with explicit timeouts
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the dispatcher API
    /// * `register_timeout` - Timeout applied to the registration call
    /// * `request_timeout` - Timeout applied to poll and report calls
    pub fn with_timeouts(
        base_url: impl Into<String>,
        register_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            register_timeout,
            request_timeout,
        }
    }

    /// Get the base URL of the dispatcher
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Checks the status code and returns an appropriate error if the
    /// request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("failed to parse JSON response: {}", e)))
    }

    /// Handle an API response where only the 2xx acknowledgment matters
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}
