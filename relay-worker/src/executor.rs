//! Request execution seam
//!
//! The worker treats task execution as opaque: an executor takes an
//! assigned request and yields a lazy, finite, non-restartable sequence
//! of content chunks followed by a terminal success or failure. The real
//! browser-automation backend integrates across this trait.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use thiserror::Error;
use tokio::time::sleep;

use relay_core::domain::request::WorkRequest;

/// Failure raised by an executor while servicing one request
///
/// A single generic classification for now; the dispatcher only needs
/// enough to decide whether to requeue elsewhere.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("{0}")]
    Processing(String),
}

impl ExecutorError {
    /// Wire-level classification for error reports
    pub fn error_type(&self) -> &'static str {
        match self {
            ExecutorError::Processing(_) => "processing_error",
        }
    }
}

/// Ordered sequence of content chunks produced for one request
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, ExecutorError>> + Send>>;

/// Executes one assigned request, producing its content chunks
///
/// The returned stream is consumed exactly once; an `Err` item is
/// terminal and no further items are polled after it.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, request: &WorkRequest) -> Result<ChunkStream, ExecutorError>;
}

/// Stand-in executor emitting a fixed response
///
/// Placeholder backend for running the worker without a real automation
/// stack attached. Streaming requests get a scripted chunk sequence with
/// a small inter-chunk delay; non-streaming requests get a single body
/// after a simulated processing pause.
pub struct SimulatedExecutor {
    chunk_delay: Duration,
}

impl SimulatedExecutor {
    pub fn new() -> Self {
        Self {
            chunk_delay: Duration::from_millis(100),
        }
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Executor for SimulatedExecutor {
    async fn execute(&self, request: &WorkRequest) -> Result<ChunkStream, ExecutorError> {
        if request.stream {
            let delay = self.chunk_delay;
            let chunks = [
                "Hello", " there", "! This", " is", " a", " simulated", " response", ".",
            ];
            let stream = stream::iter(chunks).then(move |chunk| async move {
                sleep(delay).await;
                Ok(chunk.to_string())
            });
            Ok(stream.boxed())
        } else {
            // One pause standing in for the whole processing time.
            let delay = self.chunk_delay * 10;
            let stream = stream::once(async move {
                sleep(delay).await;
                Ok("Simulated response".to_string())
            });
            Ok(stream.boxed())
        }
    }
}
