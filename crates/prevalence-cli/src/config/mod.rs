//! Server configuration loaded from the environment.
//!
//! Values are read with the `PREVALENCE` prefix and nested keys use double
//! underscores, e.g. `PREVALENCE__SERVER__PORT=8080`. A `.env` file in the
//! working directory is loaded first if present. Command-line flags given to
//! `prevalence serve` take precedence over anything loaded here.

mod error;
mod server;

pub use error::{ConfigError, ValidationError};
pub use server::ServerConfig;

use serde::Deserialize;
use std::path::PathBuf;

use prevalence_core::table::builtin::DEFAULT_DATASET;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Bind address, logging and timeouts
    #[serde(default)]
    pub server: ServerConfig,

    /// Which rate table to serve
    #[serde(default)]
    pub data: DataConfig,
}

/// Rate table selection. A table file wins over a bundled dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub table_path: Option<PathBuf>,

    #[serde(default = "default_dataset")]
    pub dataset: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            table_path: None,
            dataset: default_dataset(),
        }
    }
}

fn default_dataset() -> String {
    DEFAULT_DATASET.to_string()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PREVALENCE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if self.data.table_path.is_none() && self.data.dataset.trim().is_empty() {
            return Err(ValidationError::EmptyDataset);
        }
        Ok(())
    }
}
