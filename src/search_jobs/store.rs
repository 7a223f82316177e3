use super::models::{Job, JobId, JobStatus, SearchCriteria};
use crate::catalog::ToolSummary;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobStoreError {
    #[error("Job already exists: {0}")]
    DuplicateJob(JobId),
}

#[derive(Default)]
struct StoreInner {
    jobs: HashMap<JobId, Job>,
    last_queued_at: Option<DateTime<Utc>>,
}

/// In-memory registry of batch search jobs.
///
/// Every operation takes the same lock and releases it before returning,
/// callers never hold it across catalog scans or `.await` points.
#[derive(Default)]
pub struct JobStore {
    inner: Mutex<StoreInner>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a new pending job queued now.
    pub fn create(&self, job_id: &str, criteria: SearchCriteria) -> Result<Job, JobStoreError> {
        self.create_at(job_id, criteria, Utc::now())
    }

    /// Inserts a new pending job queued at `now`.
    ///
    /// `queued_at` never goes backwards in creation order: a clock step back
    /// reuses the previous creation time.
    pub fn create_at(
        &self,
        job_id: &str,
        criteria: SearchCriteria,
        now: DateTime<Utc>,
    ) -> Result<Job, JobStoreError> {
        let mut inner = self.lock();
        if inner.jobs.contains_key(job_id) {
            return Err(JobStoreError::DuplicateJob(job_id.to_string()));
        }

        let queued_at = match inner.last_queued_at {
            Some(last) if last > now => last,
            _ => now,
        };
        inner.last_queued_at = Some(queued_at);

        let job = Job::new_pending(job_id.to_string(), criteria, queued_at);
        inner.jobs.insert(job_id.to_string(), job.clone());
        Ok(job)
    }

    pub fn read(&self, job_id: &str) -> Option<Job> {
        self.lock().jobs.get(job_id).cloned()
    }

    /// Attaches the result of a pending job.
    ///
    /// Returns false when the job is gone or was already finished, the store
    /// is left untouched in both cases.
    pub fn mark_completed(&self, job_id: &str, result: Vec<ToolSummary>) -> bool {
        self.finish(job_id, |job| {
            job.status = JobStatus::Completed;
            job.result = Some(result);
        })
    }

    pub fn mark_failed(&self, job_id: &str, message: String) -> bool {
        self.finish(job_id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(message);
        })
    }

    fn finish<F: FnOnce(&mut Job)>(&self, job_id: &str, apply: F) -> bool {
        let mut inner = self.lock();
        let Some(job) = inner.jobs.get_mut(job_id) else {
            debug!("Job {} is no longer in the store", job_id);
            return false;
        };
        if !job.is_pending() {
            debug!("Job {} already finished as {}", job_id, job.status);
            return false;
        }
        apply(job);
        job.completed_at = Some(Utc::now());
        true
    }

    /// Removes a job, returns whether it was present.
    pub fn delete(&self, job_id: &str) -> bool {
        self.lock().jobs.remove(job_id).is_some()
    }

    /// Ids and queue times of all live jobs.
    pub fn snapshot(&self) -> Vec<(JobId, DateTime<Utc>)> {
        self.lock()
            .jobs
            .values()
            .map(|job| (job.job_id.clone(), job.queued_at))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
