use axum::extract::FromRef;

use crate::catalog::CatalogReader;
use crate::search_jobs::{JobProcessor, JobStore};
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedCatalogReader = Arc<dyn CatalogReader>;
pub type GuardedJobStore = Arc<JobStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalog: GuardedCatalogReader,
    pub job_store: GuardedJobStore,
    pub job_processor: JobProcessor,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        catalog: GuardedCatalogReader,
        job_store: GuardedJobStore,
        job_processor: JobProcessor,
    ) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            catalog,
            job_store,
            job_processor,
        }
    }
}

impl FromRef<ServerState> for GuardedCatalogReader {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog.clone()
    }
}

impl FromRef<ServerState> for GuardedJobStore {
    fn from_ref(input: &ServerState) -> Self {
        input.job_store.clone()
    }
}

impl FromRef<ServerState> for JobProcessor {
    fn from_ref(input: &ServerState) -> Self {
        input.job_processor.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
