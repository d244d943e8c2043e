//! Poll endpoint

use crate::error::{ClientError, Result};
use crate::{DispatcherClient, SESSION_HEADER};
use relay_core::domain::request::PollOutcome;
use relay_core::dto::poll::{PollRequest, PollResponse};

impl DispatcherClient {
    /// Ask the dispatcher whether work is available
    ///
    /// The payload carries the worker's current health metrics so the
    /// dispatcher can route work toward healthy, under-loaded workers.
    /// Transport failures here are expected under transient network
    /// conditions; the caller retries on its own schedule.
    ///
    /// # Arguments
    /// * `session_id` - The dispatcher-issued session id
    /// * `request` - Current load and health metrics
    pub async fn poll(&self, session_id: &str, request: &PollRequest) -> Result<PollOutcome> {
        let url = format!("{}/api/browser/poll.php", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .header(SESSION_HEADER, session_id)
            .json(request)
            .send()
            .await?;

        let body: PollResponse = self.handle_response(response).await?;

        if body.has_request {
            let work = body.request.ok_or_else(|| {
                ClientError::ParseError(
                    "poll response has_request is set but request body is missing".to_string(),
                )
            })?;
            Ok(PollOutcome::Assigned(work))
        } else {
            Ok(PollOutcome::Idle {
                poll_interval: body.poll_interval,
            })
        }
    }
}
