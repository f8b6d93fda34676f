use prevalence_core::extraction::extract_csew_xlsx;
use std::path::PathBuf;

use crate::error::CliError;

pub fn run(xlsx_file: PathBuf, output_file: Option<PathBuf>) -> Result<(), CliError> {
    let bytes = std::fs::read(&xlsx_file)?;
    let extracted = extract_csew_xlsx(&bytes)?;
    let json = serde_json::to_string_pretty(&extracted.table)?;

    match output_file {
        Some(path) => {
            std::fs::write(&path, json)?;
            let table = &extracted.table;
            eprintln!(
                "Extracted {} drug(s) and {} question(s), written to {}",
                table.drugs.len(),
                table.questions.len(),
                path.display()
            );
            for drug in &table.drugs {
                eprintln!("  baseline {:<16} {}%", drug.name, drug.baseline);
            }
        }
        None => println!("{json}"),
    }

    for w in &extracted.warnings {
        eprintln!("  warning: {w}");
    }

    Ok(())
}
