use crate::error::PrevalenceError;
use crate::model::{DrugRecord, Question, UserAnswers};
use crate::predict::outcome::{Factor, PredictionResult};
use crate::table::RateTable;

/// Substitute for zero rates, keeping ratios and logarithms finite.
pub const RATE_FLOOR: f64 = 0.01;

/// Upper bound on any adjusted rate, in percent.
pub const RATE_CAP: f64 = 95.0;

/// Compute an adjusted prevalence for every drug in the table.
///
/// Each drug's baseline is scaled by the geometric mean of the ratios
/// between the rate for each answered group and the baseline. Results are
/// sorted by rate, highest first; ties keep table order.
///
/// Answers to unrecognized questions are ignored. An unknown option for a
/// recognized question aborts the whole prediction.
pub fn predict(
    table: &RateTable,
    answers: &UserAnswers,
) -> Result<Vec<PredictionResult>, PrevalenceError> {
    for (question, _) in answers.iter() {
        if !table.has_question(question) {
            tracing::debug!(question, "ignoring answer to unrecognized question");
        }
    }

    // Walk questions in table order so factor order is independent of the request.
    let answered: Vec<(&Question, &str)> = table
        .questions()
        .iter()
        .filter_map(|q| answers.get(&q.id).map(|option| (q, option)))
        .collect();

    let mut results = table
        .drugs()
        .iter()
        .map(|drug| predict_drug(table, drug, &answered))
        .collect::<Result<Vec<_>, PrevalenceError>>()?;

    // sort_by is stable
    results.sort_by(|a, b| b.rate.total_cmp(&a.rate));

    Ok(results)
}

fn predict_drug(
    table: &RateTable,
    drug: &DrugRecord,
    answered: &[(&Question, &str)],
) -> Result<PredictionResult, PrevalenceError> {
    let baseline = apply_floor(drug.baseline_rate);

    let mut factors = Vec::with_capacity(answered.len());
    for &(question, option) in answered {
        let rate = table.rate_for(&drug.name, &question.id, option)?;
        factors.push(Factor {
            question: question.id.clone(),
            option: option.to_string(),
            rate,
            floored: rate <= 0.0,
            ratio: apply_floor(rate) / baseline,
        });
    }

    let adjusted = baseline * geometric_mean(factors.iter().map(|f| f.ratio));
    let rate = adjusted.clamp(0.0, RATE_CAP);

    Ok(PredictionResult {
        drug: drug.name.clone(),
        classification: drug.classification.clone(),
        rate,
        baseline_rate: drug.baseline_rate,
        multiplier: rate / baseline,
        factors,
    })
}

/// Geometric mean computed in log space. The mean of no ratios is 1.
pub fn geometric_mean(ratios: impl IntoIterator<Item = f64>) -> f64 {
    let (log_sum, count) = ratios
        .into_iter()
        .fold((0.0_f64, 0_usize), |(sum, n), r| (sum + r.ln(), n + 1));

    if count == 0 {
        1.0
    } else {
        (log_sum / count as f64).exp()
    }
}

fn apply_floor(rate: f64) -> f64 {
    if rate <= 0.0 {
        RATE_FLOOR
    } else {
        rate
    }
}
