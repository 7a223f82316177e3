//! Background job scheduling and execution system.
//!
//! Runs periodic maintenance tasks such as evicting expired search jobs.

mod context;
mod job;
pub mod jobs;
mod scheduler;

pub use context::JobContext;
pub use job::{BackgroundJob, JobError, JobSchedule};
pub use scheduler::JobScheduler;
