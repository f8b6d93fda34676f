use crate::error::PrevalenceError;
use crate::table::{parse_table_str, RateTable};

const CSEW_SAMPLE_JSON: &str = include_str!("../../../../data/csew-sample.json");

/// Bundled rate tables.
pub const DATASETS: &[&str] = &["csew-sample"];

/// Dataset used when no table is specified.
pub const DEFAULT_DATASET: &str = "csew-sample";

/// Load a bundled rate table by name.
pub fn load_dataset(name: &str) -> Result<RateTable, PrevalenceError> {
    match name {
        "csew-sample" => parse_table_str(CSEW_SAMPLE_JSON),
        _ => Err(PrevalenceError::UnknownDataset(format!(
            "{}. Available: {}",
            name,
            DATASETS.join(", ")
        ))),
    }
}

pub fn load_default() -> Result<RateTable, PrevalenceError> {
    load_dataset(DEFAULT_DATASET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_sample_dataset() {
        let table = load_dataset("csew-sample").unwrap();
        let names: Vec<&str> = table.drugs().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Cannabis",
                "Powder cocaine",
                "Ecstasy",
                "Hallucinogens",
                "Amphetamines",
                "Ketamine"
            ]
        );
        assert_eq!(table.questions().len(), 13);
    }

    #[test]
    fn test_sample_covers_all_question_ids() {
        let table = load_default().unwrap();
        for id in [
            "age",
            "sex",
            "ethnicity",
            "marital",
            "employment",
            "qualification",
            "religion",
            "nightclub",
            "pub",
            "alcohol",
            "satisfaction",
            "income",
            "region",
        ] {
            assert!(table.has_question(id), "missing question '{id}'");
        }
    }

    #[test]
    fn test_unknown_dataset() {
        assert!(matches!(
            load_dataset("bcs-1996"),
            Err(PrevalenceError::UnknownDataset(_))
        ));
    }
}
