use crate::search_jobs::JobStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Context provided to jobs during execution.
#[derive(Clone)]
pub struct JobContext {
    /// Token to check for cancellation/shutdown requests.
    pub cancellation_token: CancellationToken,

    /// Batch search jobs shared with the HTTP server and the processor.
    pub job_store: Arc<JobStore>,
}

impl JobContext {
    pub fn new(cancellation_token: CancellationToken, job_store: Arc<JobStore>) -> Self {
        Self {
            cancellation_token,
            job_store,
        }
    }

    /// Returns a copy of this context bound to another cancellation token.
    pub fn with_token(&self, cancellation_token: CancellationToken) -> Self {
        Self {
            cancellation_token,
            job_store: Arc::clone(&self.job_store),
        }
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
