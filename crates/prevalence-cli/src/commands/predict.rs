use prevalence_core::model::UserAnswers;
use prevalence_core::Predictor;
use std::path::PathBuf;

use crate::error::CliError;
use crate::output;

pub fn run(
    answer_args: Vec<String>,
    answers_file: Option<PathBuf>,
    table_file: Option<PathBuf>,
    dataset: Option<String>,
    output_format: &str,
    verbose: bool,
) -> Result<(), CliError> {
    let table = super::resolve_table(table_file.as_deref(), dataset.as_deref())?;

    // Answers from a file first; -a flags override individual questions
    let mut answers = match answers_file {
        Some(path) => {
            let json = std::fs::read(&path)?;
            serde_json::from_slice::<UserAnswers>(&json)?
        }
        None => UserAnswers::new(),
    };
    for arg in &answer_args {
        let (question, option) = parse_answer(arg)?;
        answers.insert(question, option);
    }

    for (question, _) in answers.iter() {
        if !table.has_question(question) {
            eprintln!("warning: ignoring unknown question '{question}'");
        }
    }

    let predictor = Predictor::from(table);
    let results = predictor.predict(&answers)?;

    match output_format {
        "json" => output::json::print(&results)?,
        _ => output::table::print(&results, predictor.table(), &answers, verbose),
    }

    Ok(())
}

/// Split `question=option`. The option may itself contain '='.
fn parse_answer(arg: &str) -> Result<(&str, &str), CliError> {
    match arg.split_once('=') {
        Some((question, option)) if !question.trim().is_empty() => {
            Ok((question.trim(), option.trim()))
        }
        _ => Err(CliError::InvalidArgument(format!(
            "expected QUESTION=OPTION, got '{arg}'"
        ))),
    }
}
