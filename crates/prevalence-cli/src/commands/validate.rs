use prevalence_core::predict::RATE_FLOOR;
use prevalence_core::table::{load_table, RateTable};
use std::path::Path;

use crate::error::CliError;

pub fn run(file: &Path) -> Result<(), CliError> {
    let table = load_table(file)?;

    println!("Rate table '{}' (v{}) is valid.", table.name(), table.version());
    let names: Vec<&str> = table.drugs().iter().map(|d| d.name.as_str()).collect();
    println!("  Drugs: {}", names.join(", "));
    let option_count: usize = table.questions().iter().map(|q| q.options.len()).sum();
    println!(
        "  Questions: {} ({} options)",
        table.questions().len(),
        option_count
    );

    let warnings = zero_rate_warnings(&table);
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

/// Zero cells are legal but get replaced by the floor at prediction time.
fn zero_rate_warnings(table: &RateTable) -> Vec<String> {
    let mut warnings = Vec::new();

    for drug in table.drugs() {
        if drug.baseline_rate <= 0.0 {
            warnings.push(format!(
                "'{}' has a zero baseline; {}% is used instead",
                drug.name, RATE_FLOOR
            ));
        }
    }

    for q in table.questions() {
        for option in &q.options {
            for drug in table.drugs() {
                if let Ok(rate) = table.rate_for(&drug.name, &q.id, option) {
                    if rate <= 0.0 {
                        warnings.push(format!(
                            "{}/{} reports 0% for {}; {}% is used instead",
                            q.id, option, drug.name, RATE_FLOOR
                        ));
                    }
                }
            }
        }
    }

    warnings
}
