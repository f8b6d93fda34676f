pub mod error;
pub mod extraction;
pub mod model;
pub mod predict;
pub mod table;

use std::sync::Arc;

use error::PrevalenceError;
use model::UserAnswers;
use predict::PredictionResult;
use table::RateTable;

/// Main API entry point: predicts drug profiles against one loaded table.
///
/// The table is built once and shared; a `Predictor` is cheap to clone and
/// safe to use from any number of threads at once.
#[derive(Debug, Clone)]
pub struct Predictor {
    table: Arc<RateTable>,
}

impl Predictor {
    pub fn new(table: Arc<RateTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RateTable {
        &self.table
    }

    /// Rank every drug in the table by its adjusted prevalence for `answers`.
    pub fn predict(&self, answers: &UserAnswers) -> Result<Vec<PredictionResult>, PrevalenceError> {
        predict::predict(&self.table, answers)
    }
}

impl From<RateTable> for Predictor {
    fn from(table: RateTable) -> Self {
        Self::new(Arc::new(table))
    }
}
