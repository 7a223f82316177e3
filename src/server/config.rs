use super::RequestsLoggingLevel;
use crate::config::{AppConfig, DEFAULT_API_PREFIX, DEFAULT_BIND_ADDRESS, DEFAULT_PORT};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub bind_address: String,
    /// Mount point of the tools and jobs routes, empty for none.
    pub api_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
        }
    }
}

impl From<&AppConfig> for ServerConfig {
    fn from(config: &AppConfig) -> Self {
        ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
            bind_address: config.bind_address.clone(),
            api_prefix: config.api_prefix.clone(),
        }
    }
}
