use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tool_registry_server::background_jobs::jobs::JobStoreHousekeepingJob;
use tool_registry_server::background_jobs::{JobContext, JobScheduler};
use tool_registry_server::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_API_PREFIX, DEFAULT_BIND_ADDRESS,
    DEFAULT_HOUSEKEEPING_INTERVAL_SECS, DEFAULT_PORT, DEFAULT_RETENTION_SECS,
};
use tool_registry_server::{
    run_server, DirCatalogReader, JobProcessor, JobStore, RequestsLoggingLevel, ServerConfig,
    ServerState,
};

const PROCESSOR_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory containing one JSON file per tool.
    #[clap(long, value_parser = parse_path)]
    pub tools_dir: Option<PathBuf>,

    /// Optional TOML config file, its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[clap(long, default_value = DEFAULT_BIND_ADDRESS)]
    pub bind_address: String,

    /// Prefix of the tools and jobs routes.
    #[clap(long, default_value = DEFAULT_API_PREFIX)]
    pub api_prefix: String,

    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Seconds a search job is kept after being queued.
    #[clap(long, default_value_t = DEFAULT_RETENTION_SECS)]
    pub job_retention_secs: u64,

    /// Seconds between two sweeps of expired search jobs.
    #[clap(long, default_value_t = DEFAULT_HOUSEKEEPING_INTERVAL_SECS)]
    pub housekeeping_interval_secs: u64,

    /// Search jobs processed at the same time, defaults to the number of CPUs.
    #[clap(long)]
    pub max_concurrent_jobs: Option<usize>,

    /// Mark search jobs with unsupported criteria as failed.
    #[clap(long)]
    pub strict_criteria: bool,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            tools_dir: self.tools_dir.clone(),
            port: self.port,
            bind_address: self.bind_address.clone(),
            api_prefix: self.api_prefix.clone(),
            logging_level: self.logging_level.clone(),
            retention_secs: self.job_retention_secs,
            housekeeping_interval_secs: self.housekeeping_interval_secs,
            max_concurrent_jobs: self.max_concurrent_jobs,
            strict_criteria: self.strict_criteria,
        }
    }
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, initiating graceful shutdown"),
                    _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
                }
                return;
            }
            Err(e) => warn!("Cannot listen for SIGTERM: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, initiating graceful shutdown");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Serving tools from {:?}", app_config.tools_dir);
    let catalog = Arc::new(DirCatalogReader::new(&app_config.tools_dir));
    let job_store = Arc::new(JobStore::new());
    let job_processor = JobProcessor::new(
        job_store.clone(),
        catalog.clone(),
        app_config.jobs.processor_config(),
    );
    info!(
        "Search jobs: retention {}s, housekeeping every {}s, {} concurrent, strict criteria {}",
        app_config.jobs.retention_secs,
        app_config.jobs.housekeeping_interval_secs,
        app_config.jobs.max_concurrent_jobs,
        app_config.jobs.strict_criteria
    );

    let shutdown_token = CancellationToken::new();

    let job_context = JobContext::new(shutdown_token.child_token(), job_store.clone());
    let mut scheduler = JobScheduler::new(shutdown_token.clone(), job_context);
    scheduler.register_job(Arc::new(JobStoreHousekeepingJob::from_settings(
        &app_config.jobs,
    )));
    let scheduler_task = tokio::spawn(async move { scheduler.run().await });

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_token.cancel();
    });

    let state = ServerState::new(
        ServerConfig::from(&app_config),
        catalog,
        job_store,
        job_processor.clone(),
    );
    let result = run_server(state, shutdown_token.clone()).await;
    info!("HTTP server stopped");

    shutdown_token.cancel();
    if !job_processor.shutdown(PROCESSOR_DRAIN_TIMEOUT).await {
        warn!("Exiting with search jobs still in flight");
    }
    if let Err(e) = scheduler_task.await {
        warn!("Scheduler task ended abnormally: {}", e);
    }

    result
}
