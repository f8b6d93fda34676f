use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PrevalenceError {
    #[error("failed to load rate table from {path}: {reason}")]
    TableLoad { path: PathBuf, reason: String },

    #[error("invalid rate table: {0}")]
    TableInvalid(String),

    /// The table has no entry for a combination the question schema allows.
    /// Raised for a recognized question answered with an unknown option.
    #[error("rate table has no entry for drug '{drug}', question '{question}', option '{option}'")]
    DataIntegrity {
        drug: String,
        question: String,
        option: String,
    },

    #[error("rate table has no drug named '{0}'")]
    UnknownDrug(String),

    #[error("unknown dataset '{0}'")]
    UnknownDataset(String),

    #[error("spreadsheet extraction failed: {0}")]
    Extraction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PrevalenceError {
    pub(crate) fn data_integrity(drug: &str, question: &str, option: &str) -> Self {
        PrevalenceError::DataIntegrity {
            drug: drug.to_string(),
            question: question.to_string(),
            option: option.to_string(),
        }
    }
}
