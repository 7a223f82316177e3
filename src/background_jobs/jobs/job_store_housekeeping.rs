//! Background job evicting expired batch search jobs.
//!
//! Jobs are removed once they have been in the store longer than the
//! retention window, whatever their status.

use crate::background_jobs::{
    context::JobContext,
    job::{BackgroundJob, JobError, JobSchedule},
};
use crate::config::JobsSettings;
use crate::search_jobs::JobStore;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;
use tracing::{debug, info};

pub struct JobStoreHousekeepingJob {
    interval: Duration,
    retention: Duration,
}

impl JobStoreHousekeepingJob {
    pub fn new(interval: Duration, retention: Duration) -> Self {
        Self {
            interval,
            retention,
        }
    }

    pub fn from_settings(settings: &JobsSettings) -> Self {
        Self::new(
            Duration::from_secs(settings.housekeeping_interval_secs),
            Duration::from_secs(settings.retention_secs),
        )
    }
}

impl BackgroundJob for JobStoreHousekeepingJob {
    fn id(&self) -> &'static str {
        "job_store_housekeeping"
    }

    fn name(&self) -> &'static str {
        "Search Job Housekeeping"
    }

    fn description(&self) -> &'static str {
        "Evicts batch search jobs older than the retention window"
    }

    fn schedule(&self) -> JobSchedule {
        JobSchedule::Interval(self.interval)
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let evicted = evict_expired_jobs(&ctx.job_store, Utc::now(), self.retention);
        if evicted > 0 {
            info!(
                "Evicted {} expired search jobs, {} remaining",
                evicted,
                ctx.job_store.len()
            );
        } else {
            debug!("No expired search jobs");
        }
        Ok(())
    }
}

/// Deletes every job queued more than `retention` before `now`.
///
/// Works on a snapshot so the store lock is only held per operation. A job
/// deleted concurrently is simply not counted. Returns the number of jobs
/// removed.
pub fn evict_expired_jobs(store: &JobStore, now: DateTime<Utc>, retention: Duration) -> usize {
    let retention = TimeDelta::from_std(retention).unwrap_or(TimeDelta::MAX);

    store
        .snapshot()
        .into_iter()
        .filter(|(_, queued_at)| now.signed_duration_since(*queued_at) > retention)
        .filter(|(job_id, _)| store.delete(job_id))
        .count()
}
