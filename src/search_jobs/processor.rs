//! Runs batch search jobs in the background.
//!
//! Submissions are answered as soon as the pending job is stored, the catalog
//! scan happens on a tracked task bounded by a semaphore and commits its
//! result back into the [`JobStore`].

use super::models::{CriteriaError, Job, SearchCriteria};
use super::store::{JobStore, JobStoreError};
use crate::catalog::{find_first, CatalogReader, MatchKind, ToolSummary};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Upper bound on jobs scanning the catalog at the same time.
    pub max_concurrent_jobs: usize,
    /// Mark jobs with unsupported criteria as failed instead of leaving them pending.
    pub strict_criteria: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            strict_criteria: false,
        }
    }
}

pub fn default_max_concurrent_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Store(#[from] JobStoreError),

    #[error("Job processor is shutting down")]
    ShuttingDown,
}

#[derive(Clone)]
pub struct JobProcessor {
    store: Arc<JobStore>,
    catalog: Arc<dyn CatalogReader>,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    strict_criteria: bool,
}

impl JobProcessor {
    pub fn new(
        store: Arc<JobStore>,
        catalog: Arc<dyn CatalogReader>,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            permits: Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1))),
            tracker: TaskTracker::new(),
            strict_criteria: config.strict_criteria,
        }
    }

    /// Stores a new pending job and schedules its execution.
    ///
    /// Returns the job as stored, before any processing happened.
    pub fn submit(&self, criteria: SearchCriteria) -> Result<Job, SubmitError> {
        if self.tracker.is_closed() {
            return Err(SubmitError::ShuttingDown);
        }

        let job_id = Uuid::new_v4().to_string();
        let job = self.store.create(&job_id, criteria.clone())?;
        debug!(
            "Queued search job {} with {} lookups",
            job_id,
            criteria.lookup_count()
        );

        let processor = self.clone();
        self.tracker.spawn(async move {
            let _permit = match processor.permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    warn!("Search job {} dropped, processor is closed", job_id);
                    return;
                }
            };
            processor.process(&job_id, criteria).await;
        });

        Ok(job)
    }

    /// Executes one job and commits its outcome.
    ///
    /// The job may have been evicted in the meantime, in which case the
    /// result is discarded.
    pub async fn process(&self, job_id: &str, criteria: SearchCriteria) {
        let catalog = self.catalog.clone();
        let start = Instant::now();

        let outcome =
            tokio::task::spawn_blocking(move || run_search(catalog.as_ref(), &criteria)).await;

        match outcome {
            Ok(Ok(result)) => {
                let matches = result.len();
                if self.store.mark_completed(job_id, result) {
                    info!(
                        "Search job {} completed with {} matches ({}ms)",
                        job_id,
                        matches,
                        start.elapsed().as_millis()
                    );
                } else {
                    debug!("Discarded result of search job {}", job_id);
                }
            }
            Ok(Err(err)) => {
                warn!("Search job {} cannot be processed: {}", job_id, err);
                if self.strict_criteria {
                    self.store.mark_failed(job_id, err.to_string());
                }
            }
            Err(err) => error!("Search job {} aborted: {}", job_id, err),
        }
    }

    /// Stops accepting jobs and waits up to `timeout` for in-flight ones.
    ///
    /// Returns false if some jobs were still running when the timeout hit.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let in_flight = self.tracker.len();
        if in_flight > 0 {
            info!("Waiting for {} search jobs to finish", in_flight);
        }

        match tokio::time::timeout(timeout, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    "{} search jobs still running after {:?}",
                    self.tracker.len(),
                    timeout
                );
                self.permits.close();
                false
            }
        }
    }
}

/// Resolves every lookup of `criteria` against the catalog.
///
/// Each value yields the first matching record in catalog order, results
/// follow the key order of the criteria and the value order within a key.
/// Unmatched values are left out.
pub fn run_search(
    catalog: &dyn CatalogReader,
    criteria: &SearchCriteria,
) -> Result<Vec<ToolSummary>, CriteriaError> {
    let lookups = plan_lookups(criteria)?;
    Ok(lookups
        .into_iter()
        .filter_map(|(kind, value)| find_first(catalog.records(), kind, value))
        .collect())
}

fn plan_lookups(criteria: &SearchCriteria) -> Result<Vec<(MatchKind, &str)>, CriteriaError> {
    let mut lookups = Vec::with_capacity(criteria.lookup_count());
    for (key, values) in criteria.iter() {
        let kind = MatchKind::from_criteria_key(key)
            .ok_or_else(|| CriteriaError::UnsupportedKey(key.to_string()))?;
        lookups.extend(values.iter().map(|value| (kind, value.as_str())));
    }
    Ok(lookups)
}
