//! Registration endpoint

use crate::DispatcherClient;
use crate::error::Result;
use relay_core::dto::register::{RegisterRequest, RegisterResponse};

impl DispatcherClient {
    /// Register a worker with the dispatcher
    ///
    /// Called exactly once at startup. Any failure here is fatal for the
    /// worker: there is no re-registration path and a worker cannot
    /// operate unregistered.
    ///
    /// # Arguments
    /// * `request` - Identity and capability descriptor for this worker
    ///
    /// # Returns
    /// The dispatcher-issued session id
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        let url = format!("{}/api/browser/register.php", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(self.register_timeout)
            .json(request)
            .send()
            .await?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::domain::session::Capabilities;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn capabilities() -> Capabilities {
        Capabilities {
            supported_models: vec!["text".to_string(), "image".to_string()],
            max_concurrent: 5,
            streaming_support: true,
            platform: "linux".to_string(),
        }
    }

    #[tokio::test]
    async fn register_returns_session_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/browser/register.php"))
            .and(body_partial_json(serde_json::json!({
                "client_identifier": "worker-1",
                "max_concurrent_requests": 5,
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"session_id": "sess-abc"})),
            )
            .mount(&server)
            .await;

        let client = DispatcherClient::new(server.uri());
        let request =
            RegisterRequest::new("worker-1".to_string(), &capabilities(), "local".to_string());
        let response = client.register(&request).await.unwrap();

        assert_eq!(response.session_id, "sess-abc");
    }

    #[tokio::test]
    async fn register_failure_surfaces_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/browser/register.php"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = DispatcherClient::new(server.uri());
        let request =
            RegisterRequest::new("worker-1".to_string(), &capabilities(), "local".to_string());
        let err = client.register(&request).await.unwrap_err();

        assert!(err.is_server_error());
        assert!(err.to_string().contains("503"));
    }
}
