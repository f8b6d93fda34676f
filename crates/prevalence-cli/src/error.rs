use prevalence_core::error::PrevalenceError;

use crate::config::{ConfigError, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] PrevalenceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ValidationError> for CliError {
    fn from(e: ValidationError) -> Self {
        CliError::Config(ConfigError::ValidationFailed(e))
    }
}
