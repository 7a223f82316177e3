//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own tools directory, job
//! store and housekeeping scheduler.

use super::constants::*;
use super::fixtures::create_test_tools_dir;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tool_registry_server::background_jobs::jobs::JobStoreHousekeepingJob;
use tool_registry_server::background_jobs::{JobContext, JobScheduler};
use tool_registry_server::config::JobsSettings;
use tool_registry_server::{
    make_app, CatalogReader, DirCatalogReader, JobProcessor, JobStore, RequestsLoggingLevel,
    ServerConfig, ServerState,
};

/// Knobs for the job subsystem of a test server.
#[derive(Debug, Clone)]
pub struct TestServerOptions {
    pub api_prefix: String,
    pub jobs: JobsSettings,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        Self {
            api_prefix: "/api/v1".to_string(),
            jobs: JobsSettings {
                max_concurrent_jobs: 4,
                ..JobsSettings::default()
            },
        }
    }
}

/// Test server instance with an isolated tools directory
///
/// When dropped, the server and its scheduler shut down and the temp
/// directory is cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Base URL including the API prefix
    pub api_url: String,

    /// Job store for direct inspection in tests
    pub job_store: Arc<JobStore>,

    // Private fields - keep resources alive until drop
    _tools_dir: TempDir,
    shutdown_token: CancellationToken,
}

impl TestServer {
    /// Spawns a new test server on a random port with default options
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the fixtures cannot be written, the port cannot be bound
    /// or the server does not become ready within the timeout.
    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let tools_dir = create_test_tools_dir().expect("Failed to create tools dir");

        let catalog: Arc<dyn CatalogReader> = Arc::new(DirCatalogReader::new(tools_dir.path()));
        let job_store = Arc::new(JobStore::new());
        let job_processor = JobProcessor::new(
            job_store.clone(),
            catalog.clone(),
            options.jobs.processor_config(),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);
        let api_url = format!("{}{}", base_url, options.api_prefix);

        let shutdown_token = CancellationToken::new();

        let mut scheduler = JobScheduler::new(
            shutdown_token.clone(),
            JobContext::new(shutdown_token.child_token(), job_store.clone()),
        );
        scheduler.register_job(Arc::new(JobStoreHousekeepingJob::from_settings(
            &options.jobs,
        )));
        tokio::spawn(async move { scheduler.run().await });

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            bind_address: "127.0.0.1".to_string(),
            api_prefix: options.api_prefix.clone(),
        };
        let app = make_app(ServerState::new(
            config,
            catalog,
            job_store.clone(),
            job_processor,
        ));

        let server_token = shutdown_token.clone();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { server_token.cancelled().await })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            api_url,
            job_store,
            _tools_dir: tools_dir,
            shutdown_token,
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the root endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
    }
}
