use crate::error::ConfigError;
use serde::Deserialize;
use std::net::SocketAddr;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Deployment name, e.g. "local" or "production". Only used for logging.
    pub env: String,
    /// Path of the SQLite database file.
    pub storage_path: String,
    pub http_server: HttpServer,
}

/// Contains parameters for the HTTP listener.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServer {
    /// The `host:port` to bind, e.g. "127.0.0.1:8082".
    pub address: String,
    /// How long in-flight requests may run after a shutdown signal.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
    /// Upper bound on the time spent handling one request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Config {
    /// Rejects values that deserialize fine but cannot be served with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_path.trim().is_empty() {
            return Err(ConfigError::ValidationError("storage_path must not be empty".to_string()));
        }
        self.http_server.socket_addr()?;
        if self.http_server.shutdown_timeout_secs == 0 || self.http_server.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("timeouts must be greater than zero".to_string()));
        }
        if self.http_server.max_body_bytes == 0 {
            return Err(ConfigError::ValidationError("max_body_bytes must be greater than zero".to_string()));
        }
        Ok(())
    }
}

impl HttpServer {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.address.parse().map_err(|e| {
            ConfigError::ValidationError(format!("invalid http_server.address '{}': {e}", self.address))
        })
    }
}
