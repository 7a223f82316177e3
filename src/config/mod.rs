mod file_config;

pub use file_config::{FileConfig, JobsConfig};

use crate::search_jobs::{default_max_concurrent_jobs, ProcessorConfig};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 2005;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_RETENTION_SECS: u64 = 3600;
pub const DEFAULT_HOUSEKEEPING_INTERVAL_SECS: u64 = 60;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub tools_dir: Option<PathBuf>,
    pub port: u16,
    pub bind_address: String,
    pub api_prefix: String,
    pub logging_level: RequestsLoggingLevel,
    pub retention_secs: u64,
    pub housekeeping_interval_secs: u64,
    pub max_concurrent_jobs: Option<usize>,
    pub strict_criteria: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tools_dir: PathBuf,
    pub port: u16,
    pub bind_address: String,
    /// Either empty or a path starting with `/` and without trailing `/`.
    pub api_prefix: String,
    pub logging_level: RequestsLoggingLevel,

    pub jobs: JobsSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobsSettings {
    pub retention_secs: u64,
    pub housekeeping_interval_secs: u64,
    pub max_concurrent_jobs: usize,
    pub strict_criteria: bool,
}

impl Default for JobsSettings {
    fn default() -> Self {
        Self {
            retention_secs: DEFAULT_RETENTION_SECS,
            housekeeping_interval_secs: DEFAULT_HOUSEKEEPING_INTERVAL_SECS,
            max_concurrent_jobs: default_max_concurrent_jobs(),
            strict_criteria: false,
        }
    }
}

impl JobsSettings {
    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            max_concurrent_jobs: self.max_concurrent_jobs,
            strict_criteria: self.strict_criteria,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let tools_dir = file
            .tools_dir
            .map(PathBuf::from)
            .or_else(|| cli.tools_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("tools_dir must be specified via --tools-dir or in config file")
            })?;

        if !tools_dir.exists() {
            bail!("Tools directory does not exist: {:?}", tools_dir);
        }
        if !tools_dir.is_dir() {
            bail!("tools_dir is not a directory: {:?}", tools_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());
        let api_prefix = normalize_api_prefix(
            file.api_prefix
                .as_deref()
                .unwrap_or(cli.api_prefix.as_str()),
        );

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let jobs_file = file.jobs.unwrap_or_default();
        let jobs = JobsSettings {
            retention_secs: jobs_file.retention_secs.unwrap_or(cli.retention_secs),
            housekeeping_interval_secs: jobs_file
                .housekeeping_interval_secs
                .unwrap_or(cli.housekeeping_interval_secs),
            max_concurrent_jobs: jobs_file
                .max_concurrent_jobs
                .or(cli.max_concurrent_jobs)
                .unwrap_or_else(default_max_concurrent_jobs),
            strict_criteria: jobs_file.strict_criteria.unwrap_or(cli.strict_criteria),
        };

        if jobs.housekeeping_interval_secs == 0 {
            bail!("housekeeping_interval_secs must be greater than 0");
        }
        if jobs.max_concurrent_jobs == 0 {
            bail!("max_concurrent_jobs must be greater than 0");
        }

        Ok(Self {
            tools_dir,
            port,
            bind_address,
            api_prefix,
            logging_level,
            jobs,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

/// `api/v1/` becomes `/api/v1`, `/` and the empty string mean no prefix.
fn normalize_api_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
