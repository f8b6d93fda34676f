use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// On-disk form of a demographic rate table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTableDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Tracked substances, in the order results are reported for ties.
    pub drugs: Vec<DrugDef>,
    pub questions: Vec<QuestionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugDef {
    pub name: String,
    #[serde(default)]
    pub classification: String,
    /// Overall prevalence in percent (as string for exact decimal).
    pub baseline: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDef {
    pub id: String,
    pub prompt: String,
    pub options: Vec<OptionDef>,
}

/// One answer option with its prevalence per drug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDef {
    pub label: String,
    /// Map of drug name -> prevalence in percent.
    pub rates: BTreeMap<String, Decimal>,
}
