pub mod extract;
pub mod predict;
pub mod questions;
pub mod serve;
pub mod validate;

use prevalence_core::error::PrevalenceError;
use prevalence_core::table::{builtin, load_table, RateTable};
use std::path::Path;

/// Load the table a command should use: a file if given, else a bundled dataset.
pub fn resolve_table(
    table_file: Option<&Path>,
    dataset: Option<&str>,
) -> Result<RateTable, PrevalenceError> {
    match table_file {
        Some(path) => load_table(path),
        None => builtin::load_dataset(dataset.unwrap_or(builtin::DEFAULT_DATASET)),
    }
}
