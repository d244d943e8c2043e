//! Poll loop
//!
//! Polls the dispatcher for assigned requests on an adaptive cadence and
//! hands work to the request processor. Each accepted request runs in its
//! own task holding a semaphore permit, so the loop itself never blocks
//! on request execution.

use anyhow::{Context as AnyhowContext, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use relay_client::DispatcherClient;
use relay_core::domain::request::{PollOutcome, WorkRequest};
use relay_core::dto::poll::PollRequest;
use relay_core::dto::report::Report;

use crate::config::Config;
use crate::metrics::MetricsTracker;
use crate::processor::RequestProcessor;

/// Lifecycle state of the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
    /// Shutdown requested; polling has halted, in-flight requests are
    /// draining.
    Stopping,
}

/// Poll scheduler that continuously asks the dispatcher for work
pub struct PollScheduler {
    config: Config,
    client: Arc<DispatcherClient>,
    processor: Arc<RequestProcessor>,
    metrics: Arc<MetricsTracker>,
    semaphore: Arc<Semaphore>,
    session_id: String,
    shutdown: CancellationToken,
    state: Mutex<SchedulerState>,
}

impl PollScheduler {
    pub fn new(
        config: Config,
        client: Arc<DispatcherClient>,
        processor: Arc<RequestProcessor>,
        metrics: Arc<MetricsTracker>,
        session_id: String,
        shutdown: CancellationToken,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent));
        Self {
            config,
            client,
            processor,
            metrics,
            semaphore,
            session_id,
            shutdown,
            state: Mutex::new(SchedulerState::Stopped),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        *self.state.lock().unwrap()
    }

    /// Requests shutdown; the loop observes the signal at its next
    /// suspension point. In-flight requests are never aborted.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Runs the poll loop until shutdown is requested
    ///
    /// After polling halts, waits for in-flight requests to drain before
    /// reporting the Stopped state.
    pub async fn run(&self) -> Result<()> {
        self.set_state(SchedulerState::Running);
        info!(
            base_interval = ?self.config.base_poll_interval,
            max_concurrent = self.config.max_concurrent,
            "starting poll loop"
        );

        let stats_handle = self.spawn_stats_logger();

        let mut interval_secs = self.config.base_poll_interval.as_secs_f64();

        while !self.shutdown.is_cancelled() {
            interval_secs = next_interval(interval_secs, self.current_load(), &self.config);

            match self.poll_once().await {
                Ok(Some(recommended)) => {
                    // Cooperative throttle from the dispatcher, applied to
                    // the next cycle only.
                    interval_secs = clamp_interval(recommended as f64, &self.config);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("poll failed, will retry: {:#}", e);
                    if self.wait(self.config.poll_retry_delay).await {
                        break;
                    }
                    continue;
                }
            }

            debug!(interval_secs, "sleeping until next poll");
            if self.wait(Duration::from_secs_f64(interval_secs)).await {
                break;
            }
        }

        self.set_state(SchedulerState::Stopping);
        info!("shutdown requested, waiting for in-flight requests");
        stats_handle.abort();

        // Every permit back in the semaphore means every request task has
        // finished and reported.
        if let Err(e) = self
            .semaphore
            .acquire_many(self.config.max_concurrent as u32)
            .await
        {
            warn!(error = %e, "semaphore closed while draining in-flight requests");
        }

        self.set_state(SchedulerState::Stopped);
        info!("poll scheduler stopped");
        Ok(())
    }

    /// Performs a single poll exchange
    ///
    /// Returns the dispatcher's recommended interval, if it sent one.
    async fn poll_once(&self) -> Result<Option<u64>> {
        let snapshot = self.metrics.snapshot(self.current_load());
        let payload = PollRequest::from_snapshot(&snapshot);

        let outcome = self
            .client
            .poll(&self.session_id, &payload)
            .await
            .context("poll request failed")?;

        match outcome {
            PollOutcome::Idle { poll_interval } => {
                debug!("no work available");
                Ok(poll_interval)
            }
            PollOutcome::Assigned(request) => {
                self.dispatch(request);
                Ok(None)
            }
        }
    }

    /// Hands an assigned request to the processor on its own task
    ///
    /// Acceptance is gated on a semaphore permit, so the load bound holds
    /// under any interleaving. If the dispatcher assigns work while every
    /// permit is taken, the request is refused with an error report so it
    /// can be requeued elsewhere.
    fn dispatch(&self, request: WorkRequest) {
        match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => {
                info!(request_id = %request.request_id, "accepted request");
                let processor = Arc::clone(&self.processor);
                tokio::spawn(async move {
                    processor.process(request, permit).await;
                });
            }
            Err(_) => {
                warn!(
                    request_id = %request.request_id,
                    "assigned work while at capacity, refusing"
                );
                let client = Arc::clone(&self.client);
                let session_id = self.session_id.clone();
                let report = Report::Error {
                    request_id: request.request_id,
                    error_message: "worker at capacity".to_string(),
                    error_type: "processing_error".to_string(),
                };
                tokio::spawn(async move {
                    if let Err(e) = client.report(&session_id, &report).await {
                        warn!(error = %e, "failed to deliver refusal report, dropping");
                    }
                });
            }
        }
    }

    /// Requests currently being processed
    fn current_load(&self) -> usize {
        self.config
            .max_concurrent
            .saturating_sub(self.semaphore.available_permits())
    }

    /// Sleeps for `duration`, returning true if shutdown was requested
    /// before it elapsed
    async fn wait(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.shutdown.cancelled() => true,
            _ = time::sleep(duration) => false,
        }
    }

    fn set_state(&self, state: SchedulerState) {
        *self.state.lock().unwrap() = state;
    }

    /// Starts a background task logging a metrics summary periodically
    fn spawn_stats_logger(&self) -> tokio::task::JoinHandle<()> {
        let metrics = Arc::clone(&self.metrics);
        let semaphore = Arc::clone(&self.semaphore);
        let max_concurrent = self.config.max_concurrent;
        let shutdown = self.shutdown.clone();
        let period = self.config.stats_interval;

        tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let load = max_concurrent.saturating_sub(semaphore.available_permits());
                let snapshot = metrics.snapshot(load);
                info!(
                    "worker stats: load {}/{}, success rate {:.1}%, avg latency {:.1}ms",
                    snapshot.current_load,
                    max_concurrent,
                    snapshot.success_rate,
                    snapshot.avg_latency_ms
                );
            }
        })
    }
}

/// Computes the next poll interval from the worker's own load
///
/// Saturated workers back off multiplicatively, idle workers accelerate,
/// moderately loaded workers hold the configured base cadence. The result
/// always lies within [min_poll_interval, max_poll_interval].
fn next_interval(current_secs: f64, load: usize, config: &Config) -> f64 {
    let min = config.min_poll_interval.as_secs_f64();
    let max = config.max_poll_interval.as_secs_f64();

    if load >= config.max_concurrent {
        (current_secs * 1.5).min(max)
    } else if load == 0 {
        (current_secs * 0.8).max(min)
    } else {
        config.base_poll_interval.as_secs_f64().clamp(min, max)
    }
}

/// Clamps a dispatcher-recommended interval to the configured bounds
fn clamp_interval(secs: f64, config: &Config) -> f64 {
    secs.clamp(
        config.min_poll_interval.as_secs_f64(),
        config.max_poll_interval.as_secs_f64(),
    )
}
