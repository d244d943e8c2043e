//! Request processor
//!
//! Executes one assigned request against the executor, sequences and
//! forwards streamed chunks, reports the terminal outcome, and updates
//! the metrics counters. Load accounting is handled by the semaphore
//! permit the caller acquired before dispatching: the permit is moved
//! into `process` and dropped when it returns, whatever the outcome.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio::sync::OwnedSemaphorePermit;
use tracing::{error, info, warn};

use relay_client::DispatcherClient;
use relay_core::domain::request::WorkRequest;
use relay_core::dto::report::Report;

use crate::executor::{Executor, ExecutorError};
use crate::metrics::MetricsTracker;

/// Drives assigned requests from receipt to their terminal report
pub struct RequestProcessor {
    client: Arc<DispatcherClient>,
    executor: Arc<dyn Executor>,
    metrics: Arc<MetricsTracker>,
    session_id: String,
}

impl RequestProcessor {
    pub fn new(
        client: Arc<DispatcherClient>,
        executor: Arc<dyn Executor>,
        metrics: Arc<MetricsTracker>,
        session_id: String,
    ) -> Self {
        Self {
            client,
            executor,
            metrics,
            session_id,
        }
    }

    /// Processes one request end to end
    ///
    /// The caller must have reserved one unit of load; the permit is
    /// released when this returns, which is the single release path for
    /// every outcome (completion, executor failure, report failure).
    pub async fn process(&self, request: WorkRequest, permit: OwnedSemaphorePermit) {
        let request_id = request.request_id.clone();
        info!(request_id = %request_id, model = %request.model, "processing request");

        let started = Instant::now();
        let result = self.run(&request).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(full_response) => {
                self.metrics.record_success(elapsed_ms);
                self.send_report(Report::Complete {
                    request_id: request_id.clone(),
                    full_response,
                    response_time_ms: elapsed_ms,
                })
                .await;
                info!(request_id = %request_id, elapsed_ms, "request completed");
            }
            Err(e) => {
                self.metrics.record_failure();
                error!(request_id = %request_id, error = %e, "request failed");
                self.send_report(Report::Error {
                    request_id: request_id.clone(),
                    error_message: e.to_string(),
                    error_type: e.error_type().to_string(),
                })
                .await;
            }
        }

        drop(permit);
    }

    /// Runs the executor and forwards output, returning the assembled
    /// response text
    async fn run(&self, request: &WorkRequest) -> Result<String, ExecutorError> {
        let mut chunks = self.executor.execute(request).await?;

        let mut full_response = String::new();
        let mut sequence: u64 = 0;

        while let Some(item) = chunks.next().await {
            let content = item?;
            if request.stream {
                // Forwarded immediately, one report per chunk, so the
                // dispatcher can relay partial output as it arrives.
                self.send_report(Report::Chunk {
                    request_id: request.request_id.clone(),
                    content: content.clone(),
                    sequence,
                })
                .await;
                sequence += 1;
            }
            full_response.push_str(&content);
        }

        Ok(full_response)
    }

    /// Delivers a report, logging and dropping any transport failure
    async fn send_report(&self, report: Report) {
        if let Err(e) = self.client.report(&self.session_id, &report).await {
            warn!(
                request_id = %report.request_id(),
                error = %e,
                "failed to deliver report, dropping"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use futures::stream;
    use crate::executor::ChunkStream;
    use tokio::sync::Semaphore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Executor that replays a fixed script of chunk results
    struct ScriptedExecutor {
        script: Vec<Result<String, String>>,
    }

    impl ScriptedExecutor {
        fn chunks(chunks: &[&str]) -> Self {
            Self {
                script: chunks.iter().map(|c| Ok(c.to_string())).collect(),
            }
        }

        fn failing(chunks: &[&str], error: &str) -> Self {
            let mut script: Vec<Result<String, String>> =
                chunks.iter().map(|c| Ok(c.to_string())).collect();
            script.push(Err(error.to_string()));
            Self { script }
        }
    }

    #[async_trait]
    impl Executor for ScriptedExecutor {
        async fn execute(&self, _request: &WorkRequest) -> Result<ChunkStream, ExecutorError> {
            let items: Vec<Result<String, ExecutorError>> = self
                .script
                .iter()
                .map(|item| match item {
                    Ok(c) => Ok(c.clone()),
                    Err(e) => Err(ExecutorError::Processing(e.clone())),
                })
                .collect();
            Ok(Box::pin(stream::iter(items)))
        }
    }

    fn request(id: &str, stream: bool) -> WorkRequest {
        WorkRequest {
            request_id: id.to_string(),
            model: "text".to_string(),
            messages: vec![],
            stream,
            assigned_at: Utc::now(),
        }
    }

    async fn processor_with(
        server: &MockServer,
        executor: ScriptedExecutor,
    ) -> (RequestProcessor, Arc<MetricsTracker>) {
        Mock::given(method("POST"))
            .and(path("/api/browser/response.php"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;

        let metrics = Arc::new(MetricsTracker::new());
        let processor = RequestProcessor::new(
            Arc::new(DispatcherClient::new(server.uri())),
            Arc::new(executor),
            metrics.clone(),
            "sess-1".to_string(),
        );
        (processor, metrics)
    }

    async fn received_reports(server: &MockServer) -> Vec<serde_json::Value> {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }

    async fn acquire(semaphore: &Arc<Semaphore>) -> OwnedSemaphorePermit {
        semaphore.clone().acquire_owned().await.unwrap()
    }

    #[tokio::test]
    async fn streaming_request_reports_ordered_chunks_then_completion() {
        let server = MockServer::start().await;
        let chunks = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let (processor, metrics) =
            processor_with(&server, ScriptedExecutor::chunks(&chunks)).await;

        let semaphore = Arc::new(Semaphore::new(1));
        processor
            .process(request("req-1", true), acquire(&semaphore).await)
            .await;

        let reports = received_reports(&server).await;
        assert_eq!(reports.len(), 9);

        for (i, report) in reports[..8].iter().enumerate() {
            assert_eq!(report["type"], "chunk");
            assert_eq!(report["request_id"], "req-1");
            assert_eq!(report["sequence"], i as u64);
            assert_eq!(report["content"], chunks[i]);
        }

        let completion = &reports[8];
        assert_eq!(completion["type"], "complete");
        assert_eq!(completion["full_response"], "abcdefgh");
        assert!(completion["response_time_ms"].as_f64().unwrap() >= 0.0);

        let snapshot = metrics.snapshot(0);
        assert_eq!(snapshot.success_rate, 100.0);

        // Load unit released through the single finalization path.
        assert_eq!(semaphore.available_permits(), 1);
    }

    #[tokio::test]
    async fn non_streaming_request_sends_only_completion() {
        let server = MockServer::start().await;
        let (processor, _metrics) =
            processor_with(&server, ScriptedExecutor::chunks(&["one", " two"])).await;

        let semaphore = Arc::new(Semaphore::new(1));
        processor
            .process(request("req-2", false), acquire(&semaphore).await)
            .await;

        let reports = received_reports(&server).await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0]["type"], "complete");
        assert_eq!(reports[0]["full_response"], "one two");
    }

    #[tokio::test]
    async fn executor_failure_sends_one_error_report_and_releases_load() {
        let server = MockServer::start().await;
        let (processor, metrics) = processor_with(
            &server,
            ScriptedExecutor::failing(&["partial"], "automation backend crashed"),
        )
        .await;

        let semaphore = Arc::new(Semaphore::new(1));
        processor
            .process(request("req-3", true), acquire(&semaphore).await)
            .await;

        let reports = received_reports(&server).await;
        // One chunk made it out before the failure, then exactly one error.
        let errors: Vec<_> = reports.iter().filter(|r| r["type"] == "error").collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["request_id"], "req-3");
        assert_eq!(errors[0]["error_message"], "automation backend crashed");
        assert_eq!(errors[0]["error_type"], "processing_error");
        assert!(!reports.iter().any(|r| r["type"] == "complete"));

        let snapshot = metrics.snapshot(0);
        assert_eq!(snapshot.success_rate, 0.0);
        assert_eq!(snapshot.avg_latency_ms, 0.0);
        assert_eq!(semaphore.available_permits(), 1);
    }

    #[tokio::test]
    async fn report_transport_failure_does_not_fail_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/browser/response.php"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let metrics = Arc::new(MetricsTracker::new());
        let processor = RequestProcessor::new(
            Arc::new(DispatcherClient::new(server.uri())),
            Arc::new(ScriptedExecutor::chunks(&["ok"])),
            metrics.clone(),
            "sess-1".to_string(),
        );

        let semaphore = Arc::new(Semaphore::new(1));
        processor
            .process(request("req-4", false), acquire(&semaphore).await)
            .await;

        // The request still counts as successful; delivery failures are
        // logged and dropped.
        assert_eq!(metrics.snapshot(0).success_rate, 100.0);
        assert_eq!(semaphore.available_permits(), 1);
    }
}
