use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One tracked substance with its population-wide prevalence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugRecord {
    pub name: String,
    /// Legal classification label (e.g., "Class B"). May be empty.
    pub classification: String,
    /// Last-year prevalence across all adults, in percent.
    pub baseline_rate: f64,
}

impl fmt::Display for DrugRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.classification.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.classification)
        }
    }
}

/// A demographic question and its selectable answers, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
}

impl Question {
    pub fn option_index(&self, label: &str) -> Option<usize> {
        self.options.iter().position(|o| o == label)
    }

    pub fn has_option(&self, label: &str) -> bool {
        self.option_index(label).is_some()
    }
}

/// The answers a user submitted: question id -> chosen option label.
///
/// Keys need not be recognized question ids; unknown keys are ignored by
/// the engine. Iteration order is sorted by key and carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserAnswers(BTreeMap<String, String>);

impl UserAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question_id: impl Into<String>, option: impl Into<String>) {
        self.0.insert(question_id.into(), option.into());
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.0.get(question_id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for UserAnswers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        UserAnswers(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
