//! Report endpoint

use crate::error::Result;
use crate::{DispatcherClient, SESSION_HEADER};
use relay_core::dto::report::Report;

impl DispatcherClient {
    /// Deliver one report (chunk, completion, or error) for a request
    ///
    /// Expects a 2xx acknowledgment. The client never retries a report;
    /// on failure the caller logs the error and proceeds.
    ///
    /// # Arguments
    /// * `session_id` - The dispatcher-issued session id
    /// * `report` - The report to deliver
    pub async fn report(&self, session_id: &str, report: &Report) -> Result<()> {
        let url = format!("{}/api/browser/response.php", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .header(SESSION_HEADER, session_id)
            .json(report)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn chunk_report_is_acknowledged() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/browser/response.php"))
            .and(header(SESSION_HEADER, "sess-1"))
            .and(body_partial_json(serde_json::json!({
                "request_id": "req-1",
                "type": "chunk",
                "content": "partial",
                "sequence": 0
            })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = DispatcherClient::new(server.uri());
        let report = Report::Chunk {
            request_id: "req-1".to_string(),
            content: "partial".to_string(),
            sequence: 0,
        };

        client.report("sess-1", &report).await.unwrap();
    }

    #[tokio::test]
    async fn rejected_report_surfaces_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/browser/response.php"))
            .respond_with(ResponseTemplate::new(410).set_body_string("unknown request"))
            .mount(&server)
            .await;

        let client = DispatcherClient::new(server.uri());
        let report = Report::Error {
            request_id: "req-1".to_string(),
            error_message: "boom".to_string(),
            error_type: "processing_error".to_string(),
        };

        let err = client.report("sess-1", &report).await.unwrap_err();
        assert!(err.is_client_error());
    }
}
