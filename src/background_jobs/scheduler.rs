use super::context::JobContext;
use super::job::{BackgroundJob, JobError, JobSchedule};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Longest the scheduler sleeps without re-checking its jobs.
const MAX_IDLE_SLEEP: Duration = Duration::from_secs(60);

/// How often a job that is due but still running is checked again.
const RUNNING_JOB_POLL: Duration = Duration::from_millis(100);

const SHUTDOWN_JOB_TIMEOUT: Duration = Duration::from_secs(30);

/// Manages background job scheduling and execution.
pub struct JobScheduler {
    jobs: HashMap<String, Arc<dyn BackgroundJob>>,

    /// Next due time per job, jobs without an entry are due immediately.
    next_runs: HashMap<String, Instant>,

    /// Currently running jobs with their task handles.
    running_handles: HashMap<String, JoinHandle<()>>,

    /// Cancellation tokens for each running job.
    job_cancel_tokens: HashMap<String, CancellationToken>,

    /// Token to signal scheduler shutdown.
    shutdown_token: CancellationToken,

    /// Shared context provided to jobs during execution.
    job_context: JobContext,
}

impl JobScheduler {
    pub fn new(shutdown_token: CancellationToken, job_context: JobContext) -> Self {
        Self {
            jobs: HashMap::new(),
            next_runs: HashMap::new(),
            running_handles: HashMap::new(),
            job_cancel_tokens: HashMap::new(),
            shutdown_token,
            job_context,
        }
    }

    /// Register a job with the scheduler.
    pub fn register_job(&mut self, job: Arc<dyn BackgroundJob>) {
        let job_id = job.id().to_string();
        info!(
            "Registering job: {} ({}) - {}",
            job.name(),
            job_id,
            job.description()
        );
        self.jobs.insert(job_id, job);
    }

    /// Get the number of registered jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Main scheduler loop, returns once the shutdown token is cancelled.
    pub async fn run(&mut self) {
        info!(
            "Starting job scheduler with {} registered jobs",
            self.job_count()
        );

        loop {
            self.cleanup_completed_jobs().await;

            let sleep_duration = self.time_until_next_scheduled_job();
            debug!(
                "Scheduler sleeping for {:?} until next scheduled job",
                sleep_duration
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {
                    self.run_due_jobs();
                }
                _ = self.shutdown_token.cancelled() => {
                    info!("Scheduler received shutdown signal");
                    self.shutdown().await;
                    break;
                }
            }
        }

        info!("Job scheduler stopped");
    }

    fn is_running(&self, job_id: &str) -> bool {
        self.running_handles.contains_key(job_id)
    }

    /// Calculate time until the next scheduled job should run.
    fn time_until_next_scheduled_job(&self) -> Duration {
        let now = Instant::now();
        let mut min_duration = MAX_IDLE_SLEEP;

        for job_id in self.jobs.keys() {
            let until_due = match self.next_runs.get(job_id) {
                Some(next_run) => next_run.saturating_duration_since(now),
                None => Duration::ZERO,
            };
            let until_due = if self.is_running(job_id) {
                until_due.max(RUNNING_JOB_POLL)
            } else {
                until_due
            };
            min_duration = min_duration.min(until_due);
        }

        min_duration
    }

    /// Run all jobs that are due for scheduled execution.
    fn run_due_jobs(&mut self) {
        let now = Instant::now();
        let due: Vec<String> = self
            .jobs
            .keys()
            .filter(|job_id| !self.is_running(job_id))
            .filter(|job_id| {
                self.next_runs
                    .get(*job_id)
                    .map_or(true, |next_run| *next_run <= now)
            })
            .cloned()
            .collect();

        for job_id in due {
            self.spawn_job(&job_id);
        }
    }

    /// Spawn a job execution task.
    fn spawn_job(&mut self, job_id: &str) {
        let Some(job) = self.jobs.get(job_id).map(Arc::clone) else {
            error!("Attempted to spawn unknown job: {}", job_id);
            return;
        };

        // Next run is counted from the start of this one.
        match job.schedule() {
            JobSchedule::Interval(interval) => {
                self.next_runs
                    .insert(job_id.to_string(), Instant::now() + interval);
            }
        }

        debug!("Starting job: {}", job_id);

        let cancel_token = self.job_context.cancellation_token.child_token();
        self.job_cancel_tokens
            .insert(job_id.to_string(), cancel_token.clone());
        let ctx = self.job_context.with_token(cancel_token);

        let job_id_owned = job_id.to_string();
        let handle = tokio::spawn(async move {
            let start_time = std::time::Instant::now();
            let result = tokio::task::spawn_blocking(move || job.execute(&ctx)).await;
            let elapsed = start_time.elapsed();

            match result {
                Ok(Ok(())) => {
                    debug!("Job {} completed in {:?}", job_id_owned, elapsed);
                }
                Ok(Err(JobError::Cancelled)) => {
                    info!("Job {} was cancelled after {:?}", job_id_owned, elapsed);
                }
                Ok(Err(e)) => {
                    error!("Job {} failed after {:?}: {}", job_id_owned, elapsed, e);
                }
                Err(e) => {
                    error!("Job {} panicked after {:?}: {}", job_id_owned, elapsed, e);
                }
            }
        });

        self.running_handles.insert(job_id.to_string(), handle);
    }

    /// Clean up handles for completed jobs.
    async fn cleanup_completed_jobs(&mut self) {
        let completed: Vec<String> = self
            .running_handles
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(job_id, _)| job_id.clone())
            .collect();

        for job_id in completed {
            if let Some(handle) = self.running_handles.remove(&job_id) {
                let _ = handle.await;
            }
            self.job_cancel_tokens.remove(&job_id);
        }
    }

    /// Cancel running jobs and wait for them to return.
    async fn shutdown(&mut self) {
        info!("Shutting down scheduler...");

        for (job_id, token) in &self.job_cancel_tokens {
            debug!("Cancelling job: {}", job_id);
            token.cancel();
        }

        for (job_id, handle) in self.running_handles.drain() {
            if tokio::time::timeout(SHUTDOWN_JOB_TIMEOUT, handle)
                .await
                .is_err()
            {
                warn!("Job {} did not stop within {:?}", job_id, SHUTDOWN_JOB_TIMEOUT);
            }
        }

        self.job_cancel_tokens.clear();
        info!("Scheduler shutdown complete");
    }
}
