use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config path is required (set CONFIG_PATH or pass --config)")]
    MissingPath,

    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to load configuration from file: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}
