use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places kept when a prediction leaves the engine.
pub const OUTPUT_DECIMALS: u32 = 2;

/// How one answered question moved a drug's estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub question: String,
    pub option: String,
    /// Rate the table reports for this answer, in percent.
    pub rate: f64,
    /// True if the reported rate was zero and the floor was used instead.
    pub floored: bool,
    /// Effective rate divided by the effective baseline.
    pub ratio: f64,
}

/// Adjusted prevalence for one drug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub drug: String,
    pub classification: String,
    /// Adjusted prevalence in percent, within [0, 95].
    pub rate: f64,
    /// Population prevalence from the table, in percent.
    pub baseline_rate: f64,
    /// Adjusted rate relative to the effective baseline.
    pub multiplier: f64,
    /// Per-question ratios, in question order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub factors: Vec<Factor>,
}

impl PredictionResult {
    /// Response form, rounded to [`OUTPUT_DECIMALS`].
    pub fn rounded(&self) -> RankedRate {
        RankedRate {
            drug: self.drug.clone(),
            rate: round_output(self.rate),
            baseline_rate: round_output(self.baseline_rate),
            multiplier: round_output(self.multiplier),
            classification: self.classification.clone(),
        }
    }

    /// Whether the answers pushed this drug above its baseline.
    pub fn is_above_baseline(&self) -> bool {
        self.multiplier > 1.0
    }
}

/// A prediction as serialized for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedRate {
    pub drug: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub baseline_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub multiplier: Decimal,
    pub classification: String,
}

fn round_output(value: f64) -> Decimal {
    Decimal::try_from(value)
        .unwrap_or_default()
        .round_dp(OUTPUT_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn result(rate: f64, baseline: f64) -> PredictionResult {
        PredictionResult {
            drug: "Cannabis".into(),
            classification: "Class B".into(),
            rate,
            baseline_rate: baseline,
            multiplier: rate / baseline,
            factors: vec![],
        }
    }

    #[test]
    fn rounded_keeps_two_decimals() {
        let r = result(18.804_999, 9.4).rounded();
        assert_eq!(r.rate, dec!(18.80));
        assert_eq!(r.baseline_rate, dec!(9.4));
        assert_eq!(r.multiplier, dec!(2.00));
    }

    #[test]
    fn rounded_serializes_numbers() {
        let json = serde_json::to_value(result(18.8, 9.4).rounded()).unwrap();
        assert_eq!(json["drug"], "Cannabis");
        assert_eq!(json["rate"], serde_json::json!(18.8));
        assert_eq!(json["multiplier"], serde_json::json!(2.0));
        assert_eq!(json["classification"], "Class B");
    }

    #[test]
    fn factors_omitted_when_empty() {
        let json = serde_json::to_value(result(9.4, 9.4)).unwrap();
        assert!(json.get("factors").is_none());
        assert!(!result(9.4, 9.4).is_above_baseline());
    }
}
