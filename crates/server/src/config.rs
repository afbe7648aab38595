use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ServerError;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8003
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_api_keys() -> Vec<String> {
    vec!["demo-api-key".to_string()]
}

fn default_index_path() -> String {
    "./data/index.redb".to_string()
}

fn default_top_n() -> usize {
    80
}

fn default_rate_limit_per_minute() -> u32 {
    60
}

/// Server configuration, loaded from (in increasing priority) defaults,
/// an optional `config/server.toml` file, a `.env` file, and
/// `CODECHECK_SERVER__*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_body_size_bytes")]
    pub max_body_size_bytes: usize,
    /// Accepted bearer/API-key values. The demo default must never reach a
    /// production deployment — `load()` logs a warning if it's still in
    /// effect.
    #[serde(default = "default_api_keys")]
    pub api_keys: Vec<String>,
    /// Path to the embedded redb index file, used when the `redb-backend`
    /// index feature is enabled.
    #[serde(default = "default_index_path")]
    pub index_path: String,
    /// Default `top_n` for `/api/duplicate-check-v2` when the caller
    /// doesn't specify one.
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,
    /// Requests allowed per API key per 60-second sliding window.
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            max_body_size_bytes: default_max_body_size_bytes(),
            api_keys: default_api_keys(),
            index_path: default_index_path(),
            default_top_n: default_top_n(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from defaults, an optional `config/server.toml`,
    /// a `.env` file if present, and `CODECHECK_SERVER__FIELD` environment
    /// variables (double underscore separates nesting, unused here but
    /// kept consistent with the rest of the stack).
    pub fn load() -> Result<Self, ServerError> {
        dotenvy::dotenv().ok();

        let raw = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::with_name("config/server").required(false))
            .add_source(config::Environment::with_prefix("CODECHECK_SERVER").separator("__"))
            .build()?;

        let cfg: Self = raw.try_deserialize()?;

        if cfg.api_keys == default_api_keys() {
            tracing::warn!("using the demo API key; set CODECHECK_SERVER__API_KEYS for production");
        }

        Ok(cfg)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ServerError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_into_a_socket_addr() {
        let cfg = ServerConfig::default();
        assert!(cfg.socket_addr().is_ok());
    }

    #[test]
    fn default_api_keys_are_the_demo_placeholder() {
        assert_eq!(ServerConfig::default().api_keys, vec!["demo-api-key".to_string()]);
    }
}
