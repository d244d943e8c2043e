//! Relay Worker
//!
//! A worker node that services an external request dispatcher.
//!
//! Architecture:
//! - Configuration: CLI arguments with environment fallbacks
//! - Session: one-time registration with the dispatcher
//! - Scheduler: adaptive polling and request dispatch
//! - Processor: request execution and result streaming
//!
//! The worker registers its capabilities, polls the dispatcher for work on
//! a cadence driven by its own load and the dispatcher's hints, executes
//! assigned requests through the executor seam, and streams chunks and
//! terminal outcomes back.

mod config;
mod executor;
mod metrics;
mod processor;
mod scheduler;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::executor::{Executor, SimulatedExecutor};
use crate::metrics::MetricsTracker;
use crate::processor::RequestProcessor;
use crate::scheduler::PollScheduler;
use crate::session::SessionManager;
use relay_client::DispatcherClient;

#[derive(Parser)]
#[command(name = "relay-worker")]
#[command(about = "Dispatcher worker node", long_about = None)]
struct Cli {
    /// Dispatcher base URL
    #[arg(long, env = "DISPATCHER_URL", default_value = "http://localhost:8080")]
    dispatcher_url: String,

    /// Worker identifier (random if omitted)
    #[arg(long, env = "WORKER_ID")]
    worker_id: Option<String>,

    /// Max requests processed at once
    #[arg(long, env = "MAX_CONCURRENT_REQUESTS")]
    max_concurrent: Option<usize>,

    /// Steady-state poll cadence in seconds
    #[arg(long, env = "POLL_INTERVAL")]
    poll_interval: Option<u64>,

    /// Stats logging period in seconds
    #[arg(long, env = "STATS_INTERVAL")]
    stats_interval: Option<u64>,

    /// Geographic location advertised at registration
    #[arg(long, env = "WORKER_LOCATION")]
    location: Option<String>,
}

impl Cli {
    fn into_config(self) -> Config {
        let worker_id = self
            .worker_id
            .unwrap_or_else(|| format!("worker-{}", uuid::Uuid::new_v4()));
        let mut config = Config::new(worker_id, self.dispatcher_url);

        if let Some(max) = self.max_concurrent {
            config.max_concurrent = max;
        }
        if let Some(secs) = self.poll_interval {
            config.base_poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.stats_interval {
            config.stats_interval = Duration::from_secs(secs);
        }
        if let Some(location) = self.location {
            config.location = location;
        }

        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Relay Worker");

    let config = Cli::parse().into_config();
    config.validate()?;
    info!(
        worker_id = %config.worker_id,
        dispatcher_url = %config.dispatcher_url,
        max_concurrent = config.max_concurrent,
        "loaded configuration"
    );

    let client = Arc::new(DispatcherClient::with_timeouts(
        config.dispatcher_url.clone(),
        config.register_timeout,
        config.request_timeout,
    ));

    // Registration failure is fatal: a worker cannot operate unregistered
    // and there is no re-registration path.
    let session_manager = SessionManager::new(Arc::clone(&client), config.clone());
    let session = session_manager
        .register()
        .await
        .context("cannot start without a session")?;

    let metrics = Arc::new(MetricsTracker::new());
    let executor: Arc<dyn Executor> = Arc::new(SimulatedExecutor::new());
    let processor = Arc::new(RequestProcessor::new(
        Arc::clone(&client),
        executor,
        Arc::clone(&metrics),
        session.id.clone(),
    ));

    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    let scheduler = PollScheduler::new(
        config,
        client,
        processor,
        metrics,
        session.id,
        shutdown,
    );

    if let Err(e) = scheduler.run().await {
        error!("scheduler error: {:#}", e);
        return Err(e);
    }

    Ok(())
}

/// Cancels the shutdown token when the process receives ctrl-c
fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
            return;
        }
        info!("received shutdown signal");
        shutdown.cancel();
    });
}
