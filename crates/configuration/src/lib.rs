use crate::error::ConfigError;
use std::path::{Path, PathBuf};

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, HttpServer};

/// Environment variables with this prefix override file values,
/// e.g. `STUDENTS__HTTP_SERVER__ADDRESS`.
pub const ENV_PREFIX: &str = "STUDENTS";

/// Names the config file when the command line does not.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Loads the application configuration from the file at `path`.
///
/// This function is the primary entry point for this crate. It reads the configuration file
/// (TOML or YAML, chosen by extension), layers environment overrides on top, deserializes it
/// into our strongly-typed `Config` struct, validates it, and returns it.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Picks the config file: `CONFIG_PATH` wins, then the `--config` flag.
pub fn resolve_config_path(from_env: Option<String>, from_flag: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    from_env
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or(from_flag)
        .ok_or(ConfigError::MissingPath)
}

#[cfg(feature = "clap")]
pub mod cli {
    use super::{resolve_config_path, ConfigError, CONFIG_PATH_ENV};
    use std::path::PathBuf;

    /// Command-line arguments for locating the config file.
    #[derive(Debug, Clone, clap::Args)]
    pub struct ConfigArgs {
        /// Path to the config file (ignored when CONFIG_PATH is set).
        #[arg(long = "config")]
        pub config: Option<PathBuf>,
    }

    impl ConfigArgs {
        pub fn resolve(&self) -> Result<PathBuf, ConfigError> {
            resolve_config_path(std::env::var(CONFIG_PATH_ENV).ok(), self.config.clone())
        }
    }
}
