//! Session management
//!
//! Owns the worker's identity, capability descriptor, and the
//! dispatcher-issued session token. Registration happens exactly once at
//! startup; a worker without a session must not poll, and session loss is
//! terminal (there is no re-registration path).

use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use relay_client::DispatcherClient;
use relay_core::domain::session::Session;
use relay_core::dto::register::RegisterRequest;

use crate::config::Config;

/// Performs one-time registration and holds the resulting session
pub struct SessionManager {
    client: Arc<DispatcherClient>,
    config: Config,
    session: OnceLock<Session>,
}

impl SessionManager {
    pub fn new(client: Arc<DispatcherClient>, config: Config) -> Self {
        Self {
            client,
            config,
            session: OnceLock::new(),
        }
    }

    /// Registers this worker with the dispatcher
    ///
    /// Fatal on failure: the caller is expected to propagate the error and
    /// terminate the process rather than operate unregistered.
    pub async fn register(&self) -> Result<Session> {
        if self.session.get().is_some() {
            anyhow::bail!("worker is already registered");
        }

        let capabilities = self.config.capabilities();
        let request = RegisterRequest::new(
            self.config.worker_id.clone(),
            &capabilities,
            self.config.location.clone(),
        );

        let response = self
            .client
            .register(&request)
            .await
            .context("dispatcher registration failed")?;

        let session = Session {
            id: response.session_id,
            capabilities,
            created_at: Utc::now(),
        };
        info!(
            session_id = %session.id,
            worker_id = %self.config.worker_id,
            "registered with dispatcher"
        );

        let _ = self.session.set(session.clone());
        Ok(session)
    }

    /// The registered session, if registration has completed
    pub fn session(&self) -> Option<&Session> {
        self.session.get()
    }
}
