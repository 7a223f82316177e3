use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub tools_dir: Option<String>,
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub api_prefix: Option<String>,
    pub logging_level: Option<String>,

    pub jobs: Option<JobsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct JobsConfig {
    pub retention_secs: Option<u64>,
    pub housekeeping_interval_secs: Option<u64>,
    pub max_concurrent_jobs: Option<usize>,
    pub strict_criteria: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
