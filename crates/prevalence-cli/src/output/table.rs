use prevalence_core::model::UserAnswers;
use prevalence_core::predict::{PredictionResult, RATE_FLOOR};
use prevalence_core::table::RateTable;

pub fn print(results: &[PredictionResult], table: &RateTable, answers: &UserAnswers, verbose: bool) {
    print!("{}", format_results(results, table, answers, verbose));
}

pub fn format_results(
    results: &[PredictionResult],
    table: &RateTable,
    answers: &UserAnswers,
    verbose: bool,
) -> String {
    let mut out = String::new();
    let answered = table
        .questions()
        .iter()
        .filter(|q| answers.get(&q.id).is_some())
        .count();

    out.push_str(&format!(
        "Expected drug profile ({} of {} questions answered)\n\n",
        answered,
        table.questions().len()
    ));

    let name_width = results.iter().map(|r| r.drug.len()).max().unwrap_or(10);
    let class_width = results
        .iter()
        .map(|r| r.classification.len())
        .max()
        .unwrap_or(0);

    for (i, r) in results.iter().enumerate() {
        out.push_str(&format!(
            "  {:>2}. {:<nw$}  {:<cw$}  {:>6.2}%  vs {:>5.2}%  (×{:.2})\n",
            i + 1,
            r.drug,
            r.classification,
            r.rate,
            r.baseline_rate,
            r.multiplier,
            nw = name_width,
            cw = class_width,
        ));

        if verbose {
            for f in &r.factors {
                let floored_marker = if f.floored {
                    format!(" (reported 0, using {RATE_FLOOR})")
                } else {
                    String::new()
                };
                out.push_str(&format!(
                    "        {} = {}: {:.2}%, ratio {:.3}{}\n",
                    f.question, f.option, f.rate, f.ratio, floored_marker
                ));
            }
        }
    }

    if verbose {
        out.push_str(
            "\nEach rate is the baseline scaled by the geometric mean of the\n\
             per-question ratios, capped at 95%.\n",
        );
    }

    out
}

pub fn format_questions(table: &RateTable) -> String {
    let mut out = format!("{} (version {})\n", table.name(), table.version());
    if let Some(desc) = table.description() {
        out.push_str(&format!("{desc}\n"));
    }
    out.push('\n');

    for q in table.questions() {
        out.push_str(&format!("  {:<14} {}\n", q.id, q.prompt));
        for option in &q.options {
            out.push_str(&format!("  {:<14}   - {}\n", "", option));
        }
        out.push('\n');
    }
    out
}
