use super::context::JobContext;
use std::time::Duration;

/// Schedule for when a job should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSchedule {
    /// Run at fixed intervals, the first run happens as soon as the scheduler starts.
    Interval(Duration),
}

/// Errors that can occur during job execution.
#[derive(Debug)]
pub enum JobError {
    ExecutionFailed(String),
    Cancelled,
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobError::ExecutionFailed(msg) => write!(f, "Execution failed: {}", msg),
            JobError::Cancelled => write!(f, "Job was cancelled"),
        }
    }
}

impl std::error::Error for JobError {}

/// Trait for background jobs.
///
/// Jobs are executed synchronously in a blocking context.
pub trait BackgroundJob: Send + Sync {
    /// Unique identifier for this job.
    fn id(&self) -> &'static str;

    /// Human-readable name for this job.
    fn name(&self) -> &'static str;

    /// Description of what this job does.
    fn description(&self) -> &'static str;

    /// When this job should be scheduled to run.
    fn schedule(&self) -> JobSchedule;

    /// Execute the job.
    ///
    /// Called from `spawn_blocking`. Implementations should check
    /// `ctx.is_cancelled()` and return `JobError::Cancelled` when it is set.
    fn execute(&self, ctx: &JobContext) -> Result<(), JobError>;
}
