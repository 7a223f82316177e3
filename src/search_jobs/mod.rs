//! Asynchronous batch search jobs.

mod models;
mod processor;
mod store;

pub use models::{CriteriaError, Job, JobId, JobStatus, SearchCriteria};
pub use processor::{
    default_max_concurrent_jobs, run_search, JobProcessor, ProcessorConfig, SubmitError,
};
pub use store::{JobStore, JobStoreError};
