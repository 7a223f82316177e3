//! Specific background job implementations.

pub mod job_store_housekeeping;

pub use job_store_housekeeping::{evict_expired_jobs, JobStoreHousekeepingJob};
