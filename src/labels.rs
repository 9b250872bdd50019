//! Bidirectional mapping between classifier ordinals and routing
//! targets. Persisted in lock-step with the classifier: the same
//! classifier artifact is meaningless with a mismatched encoder.

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    labels: Vec<String>,
}

impl LabelEncoder {
    /// Fits over the distinct labels; ordinals are assigned
    /// lexicographically so retraining on the same label set is
    /// deterministic.
    pub fn fit(labels: &[&str]) -> Self {
        let mut distinct: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        distinct.sort();
        distinct.dedup();
        Self { labels: distinct }
    }

    /// Ordinal for a label, if known. A linear scan, so a persisted
    /// encoder whose label order was edited by hand still maps each
    /// label to the ordinal the classifier was trained with.
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|known| known == label)
    }

    /// Label for an ordinal, if in range.
    pub fn inverse(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Ordinals for every label; errors on any label the encoder was
    /// not fitted on.
    pub fn encode_all(&self, labels: &[&str]) -> Result<Vec<u32>> {
        labels
            .iter()
            .map(|label| {
                self.transform(label)
                    .map(|i| i as u32)
                    .ok_or_else(|| anyhow::anyhow!("label {label:?} missing from encoder"))
            })
            .collect()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
