use prevalence_core::predict::{PredictionResult, RankedRate};

use crate::error::CliError;

pub fn print(results: &[PredictionResult]) -> Result<(), CliError> {
    let ranked: Vec<RankedRate> = results.iter().map(PredictionResult::rounded).collect();
    let json = serde_json::to_string_pretty(&ranked)?;
    println!("{json}");
    Ok(())
}
