//! Worker configuration
//!
//! Defines all configurable parameters for the worker including polling
//! cadence bounds, concurrency limits, and dispatcher connection settings.

use std::time::Duration;

use relay_core::domain::session::Capabilities;

/// Worker configuration
///
/// All timeouts and intervals are configurable to allow tuning for
/// different deployment scenarios (dev vs prod, fast vs slow networks).
#[derive(Debug, Clone)]
pub struct Config {
    /// Unique identifier for this worker instance
    pub worker_id: String,

    /// Dispatcher base URL (e.g., "http://localhost:8080")
    pub dispatcher_url: String,

    /// Steady-state poll cadence under moderate load
    pub base_poll_interval: Duration,

    /// Lower bound on the adaptive poll interval
    pub min_poll_interval: Duration,

    /// Upper bound on the adaptive poll interval; dispatcher
    /// recommendations are clamped to this as well
    pub max_poll_interval: Duration,

    /// Fixed delay before retrying after a failed poll
    pub poll_retry_delay: Duration,

    /// Max requests the worker processes at once
    pub max_concurrent: usize,

    /// Timeout for the registration call (long, tolerates cold start)
    pub register_timeout: Duration,

    /// Timeout for poll and report calls
    pub request_timeout: Duration,

    /// How often to log a metrics summary
    pub stats_interval: Duration,

    /// Geographic location advertised at registration
    pub location: String,

    /// Modalities advertised at registration
    pub supported_models: Vec<String>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(worker_id: String, dispatcher_url: String) -> Self {
        Self {
            worker_id,
            dispatcher_url,
            base_poll_interval: Duration::from_secs(5),
            min_poll_interval: Duration::from_secs(1),
            max_poll_interval: Duration::from_secs(30),
            poll_retry_delay: Duration::from_secs(5),
            max_concurrent: 5,
            register_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            stats_interval: Duration::from_secs(60),
            location: format!("{}-unknown", std::env::consts::OS),
            supported_models: vec!["text".to_string(), "image".to_string()],
        }
    }

    /// The capability descriptor this worker registers with
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            supported_models: self.supported_models.clone(),
            max_concurrent: self.max_concurrent,
            streaming_support: true,
            platform: std::env::consts::OS.to_string(),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.worker_id.is_empty() {
            anyhow::bail!("worker_id cannot be empty");
        }

        if self.dispatcher_url.is_empty() {
            anyhow::bail!("dispatcher_url cannot be empty");
        }

        if !self.dispatcher_url.starts_with("http://")
            && !self.dispatcher_url.starts_with("https://")
        {
            anyhow::bail!("dispatcher_url must start with http:// or https://");
        }

        if self.max_concurrent == 0 {
            anyhow::bail!("max_concurrent must be greater than 0");
        }

        if self.min_poll_interval.is_zero() {
            anyhow::bail!("min_poll_interval must be greater than 0");
        }

        if self.max_poll_interval < self.min_poll_interval {
            anyhow::bail!("max_poll_interval must be >= min_poll_interval");
        }

        if self.base_poll_interval < self.min_poll_interval
            || self.base_poll_interval > self.max_poll_interval
        {
            anyhow::bail!("base_poll_interval must lie within [min, max] poll interval");
        }

        if self.supported_models.is_empty() {
            anyhow::bail!("supported_models cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            format!("worker-{}", uuid::Uuid::new_v4()),
            "http://localhost:8080".to_string(),
        )
    }
}
