use std::path::PathBuf;

use crate::error::CliError;
use crate::output;

pub fn run(
    table_file: Option<PathBuf>,
    dataset: Option<String>,
    output_format: &str,
) -> Result<(), CliError> {
    let table = super::resolve_table(table_file.as_deref(), dataset.as_deref())?;

    match output_format {
        "json" => println!("{}", serde_json::to_string_pretty(table.questions())?),
        _ => print!("{}", output::table::format_questions(&table)),
    }

    Ok(())
}
