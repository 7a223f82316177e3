//! Tool Registry Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod background_jobs;
pub mod catalog;
pub mod config;
pub mod search_jobs;
pub mod server;

// Re-export commonly used types for convenience
pub use catalog::{CatalogReader, DirCatalogReader};
pub use search_jobs::{JobProcessor, JobStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig, ServerState};
