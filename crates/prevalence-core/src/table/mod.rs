pub mod builtin;
pub mod schema;

use crate::error::PrevalenceError;
use crate::model::{DrugRecord, Question};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use schema::RateTableDef;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Highest prevalence a table may report, in percent.
const MAX_PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// Load a rate table from a JSON file.
pub fn load_table(path: &Path) -> Result<RateTable, PrevalenceError> {
    let content = std::fs::read_to_string(path).map_err(|e| PrevalenceError::TableLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_table(&content, path)
}

/// Parse a rate table from a JSON string.
pub fn parse_table(json: &str, source: &Path) -> Result<RateTable, PrevalenceError> {
    let def: RateTableDef = serde_json::from_str(json).map_err(|e| PrevalenceError::TableLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    let table = RateTable::from_def(&def)?;
    tracing::debug!(
        source = %source.display(),
        drugs = table.drugs().len(),
        questions = table.questions().len(),
        "loaded rate table"
    );
    Ok(table)
}

/// Parse a rate table from a JSON string (no file path context).
pub fn parse_table_str(json: &str) -> Result<RateTable, PrevalenceError> {
    let def: RateTableDef = serde_json::from_str(json).map_err(PrevalenceError::Json)?;
    RateTable::from_def(&def)
}

/// Validate that a table definition is well-formed and complete.
///
/// Every option must carry a rate for every drug, so that any answer drawn
/// from the question schema resolves at prediction time.
pub fn validate_table(def: &RateTableDef) -> Result<(), PrevalenceError> {
    if def.drugs.is_empty() {
        return Err(PrevalenceError::TableInvalid("drugs must not be empty".into()));
    }

    if def.questions.is_empty() {
        return Err(PrevalenceError::TableInvalid(
            "questions must not be empty".into(),
        ));
    }

    let mut drug_names = HashSet::new();
    for drug in &def.drugs {
        if drug.name.is_empty() {
            return Err(PrevalenceError::TableInvalid(
                "drug name must not be empty".into(),
            ));
        }
        if !drug_names.insert(drug.name.as_str()) {
            return Err(PrevalenceError::TableInvalid(format!(
                "duplicate drug '{}'",
                drug.name
            )));
        }
        check_percent(drug.baseline, || format!("baseline for '{}'", drug.name))?;
    }

    let mut question_ids = HashSet::new();
    for question in &def.questions {
        if question.id.is_empty() {
            return Err(PrevalenceError::TableInvalid(
                "question id must not be empty".into(),
            ));
        }
        if !question_ids.insert(question.id.as_str()) {
            return Err(PrevalenceError::TableInvalid(format!(
                "duplicate question '{}'",
                question.id
            )));
        }
        if question.options.is_empty() {
            return Err(PrevalenceError::TableInvalid(format!(
                "question '{}' has no options",
                question.id
            )));
        }

        let mut labels = HashSet::new();
        for option in &question.options {
            if !labels.insert(option.label.as_str()) {
                return Err(PrevalenceError::TableInvalid(format!(
                    "question '{}' lists option '{}' twice",
                    question.id, option.label
                )));
            }

            for (drug, rate) in &option.rates {
                if !drug_names.contains(drug.as_str()) {
                    return Err(PrevalenceError::TableInvalid(format!(
                        "question '{}' option '{}' references unknown drug '{}'",
                        question.id, option.label, drug
                    )));
                }
                check_percent(*rate, || {
                    format!("rate for '{}' in {}/{}", drug, question.id, option.label)
                })?;
            }

            for drug in &def.drugs {
                if !option.rates.contains_key(&drug.name) {
                    return Err(PrevalenceError::TableInvalid(format!(
                        "question '{}' option '{}' has no rate for '{}'",
                        question.id, option.label, drug.name
                    )));
                }
            }
        }
    }

    Ok(())
}

fn check_percent(value: Decimal, what: impl FnOnce() -> String) -> Result<(), PrevalenceError> {
    if value < Decimal::ZERO || value > MAX_PERCENT {
        return Err(PrevalenceError::TableInvalid(format!(
            "{} is {}, expected a percentage between 0 and 100",
            what(),
            value
        )));
    }
    Ok(())
}

fn to_rate(value: Decimal) -> Result<f64, PrevalenceError> {
    value.to_f64().ok_or_else(|| {
        PrevalenceError::TableInvalid(format!("rate {value} is not representable"))
    })
}

/// Validated, immutable demographic rate table.
///
/// Built once per process and shared read-only between predictions.
#[derive(Debug, Clone)]
pub struct RateTable {
    name: String,
    version: String,
    description: Option<String>,
    drugs: Vec<DrugRecord>,
    drug_index: HashMap<String, usize>,
    questions: Vec<Question>,
    question_index: HashMap<String, usize>,
    /// Indexed as `rates[question][option][drug]`.
    rates: Vec<Vec<Vec<f64>>>,
}

impl RateTable {
    /// Validate a definition and convert it into its lookup form.
    pub fn from_def(def: &RateTableDef) -> Result<Self, PrevalenceError> {
        validate_table(def)?;

        let drugs = def
            .drugs
            .iter()
            .map(|d| {
                Ok(DrugRecord {
                    name: d.name.clone(),
                    classification: d.classification.clone(),
                    baseline_rate: to_rate(d.baseline)?,
                })
            })
            .collect::<Result<Vec<_>, PrevalenceError>>()?;

        let drug_index = drugs
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();

        let mut questions = Vec::with_capacity(def.questions.len());
        let mut rates = Vec::with_capacity(def.questions.len());
        for q in &def.questions {
            let mut option_rates = Vec::with_capacity(q.options.len());
            for option in &q.options {
                let per_drug = drugs
                    .iter()
                    .map(|d| {
                        option
                            .rates
                            .get(&d.name)
                            .copied()
                            .map(to_rate)
                            .unwrap_or_else(|| {
                                Err(PrevalenceError::data_integrity(&d.name, &q.id, &option.label))
                            })
                    })
                    .collect::<Result<Vec<_>, PrevalenceError>>()?;
                option_rates.push(per_drug);
            }
            rates.push(option_rates);
            questions.push(Question {
                id: q.id.clone(),
                prompt: q.prompt.clone(),
                options: q.options.iter().map(|o| o.label.clone()).collect(),
            });
        }

        let question_index = questions
            .iter()
            .enumerate()
            .map(|(i, q)| (q.id.clone(), i))
            .collect();

        Ok(RateTable {
            name: def.name.clone(),
            version: def.version.clone(),
            description: def.description.clone(),
            drugs,
            drug_index,
            questions,
            question_index,
            rates,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Tracked drugs in table order. Stable across calls.
    pub fn drugs(&self) -> &[DrugRecord] {
        &self.drugs
    }

    pub fn drug(&self, name: &str) -> Option<&DrugRecord> {
        self.drug_index.get(name).map(|&i| &self.drugs[i])
    }

    /// Overall population prevalence for a drug, in percent.
    pub fn baseline(&self, drug: &str) -> Result<f64, PrevalenceError> {
        self.drug(drug)
            .map(|d| d.baseline_rate)
            .ok_or_else(|| PrevalenceError::UnknownDrug(drug.to_string()))
    }

    pub fn classification(&self, drug: &str) -> Result<&str, PrevalenceError> {
        self.drug(drug)
            .map(|d| d.classification.as_str())
            .ok_or_else(|| PrevalenceError::UnknownDrug(drug.to_string()))
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.question_index.get(id).map(|&i| &self.questions[i])
    }

    pub fn has_question(&self, id: &str) -> bool {
        self.question_index.contains_key(id)
    }

    /// Demographic-specific prevalence for one answer.
    ///
    /// Fails with `DataIntegrity` when the combination is not in the table.
    pub fn rate_for(&self, drug: &str, question: &str, option: &str) -> Result<f64, PrevalenceError> {
        let missing = || PrevalenceError::data_integrity(drug, question, option);

        let &d = self.drug_index.get(drug).ok_or_else(missing)?;
        let &q = self.question_index.get(question).ok_or_else(missing)?;
        let o = self.questions[q].option_index(option).ok_or_else(missing)?;

        Ok(self.rates[q][o][d])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SMALL_TABLE: &str = r#"{
        "name": "Test",
        "version": "1.0",
        "drugs": [
            { "name": "Cannabis", "classification": "Class B", "baseline": "9.4" },
            { "name": "Ketamine", "classification": "Class B", "baseline": "0.8" }
        ],
        "questions": [
            {
                "id": "sex",
                "prompt": "What is your sex?",
                "options": [
                    { "label": "Male", "rates": { "Cannabis": "12.5", "Ketamine": "1.1" } },
                    { "label": "Female", "rates": { "Cannabis": "6.3", "Ketamine": "0" } }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_valid_table() {
        let table = parse_table_str(SMALL_TABLE).unwrap();
        assert_eq!(table.name(), "Test");
        assert_eq!(table.drugs().len(), 2);
        assert_eq!(table.drugs()[0].name, "Cannabis");
        assert_eq!(table.baseline("Cannabis").unwrap(), 9.4);
        assert_eq!(table.classification("Ketamine").unwrap(), "Class B");
        assert_eq!(table.rate_for("Cannabis", "sex", "Female").unwrap(), 6.3);
        assert_eq!(table.rate_for("Ketamine", "sex", "Female").unwrap(), 0.0);
        assert!(table.has_question("sex"));
        assert!(!table.has_question("age"));
        assert_eq!(table.question("sex").unwrap().options, vec!["Male", "Female"]);
    }

    #[test]
    fn test_unknown_option_is_data_integrity_fault() {
        let table = parse_table_str(SMALL_TABLE).unwrap();
        let err = table.rate_for("Cannabis", "sex", "Other").unwrap_err();
        match err {
            PrevalenceError::DataIntegrity {
                drug,
                question,
                option,
            } => {
                assert_eq!(drug, "Cannabis");
                assert_eq!(question, "sex");
                assert_eq!(option, "Other");
            }
            other => panic!("expected DataIntegrity, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_drug_baseline() {
        let table = parse_table_str(SMALL_TABLE).unwrap();
        assert!(matches!(
            table.baseline("Heroin"),
            Err(PrevalenceError::UnknownDrug(_))
        ));
    }

    #[test]
    fn test_empty_drugs_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "drugs": [],
            "questions": [
                { "id": "sex", "prompt": "?", "options": [ { "label": "Male", "rates": {} } ] }
            ]
        }"#;
        assert!(parse_table_str(json).is_err());
    }

    #[test]
    fn test_missing_rate_rejected() {
        let json = SMALL_TABLE.replace(r#""Ketamine": "1.1""#, r#""Ketamine_typo": "1.1""#);
        let err = parse_table_str(&json).unwrap_err();
        assert!(matches!(err, PrevalenceError::TableInvalid(_)));
    }

    #[test]
    fn test_incomplete_option_rejected() {
        let json = SMALL_TABLE.replace(r#", "Ketamine": "0""#, "");
        let err = parse_table_str(&json).unwrap_err();
        assert!(err.to_string().contains("has no rate for 'Ketamine'"));
    }

    #[test]
    fn test_out_of_range_rate_rejected() {
        let json = SMALL_TABLE.replace(r#""12.5""#, r#""120""#);
        assert!(parse_table_str(&json).is_err());

        let json = SMALL_TABLE.replace(r#""9.4""#, r#""-1""#);
        assert!(parse_table_str(&json).is_err());
    }

    #[test]
    fn test_duplicate_option_rejected() {
        let json = SMALL_TABLE.replace(r#""label": "Female""#, r#""label": "Male""#);
        let err = parse_table_str(&json).unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_bare_number_rates_rejected() {
        // Rates are quoted decimal strings, like the bundled datasets.
        let json = SMALL_TABLE.replace(r#""9.4""#, "9.4");
        assert!(parse_table_str(&json).is_err());
    }

    #[test]
    fn test_load_table_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SMALL_TABLE.as_bytes()).unwrap();

        let table = load_table(file.path()).unwrap();
        assert_eq!(table.questions().len(), 1);
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        match load_table(&path) {
            Err(PrevalenceError::TableLoad { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected TableLoad, got {other:?}"),
        }
    }
}
