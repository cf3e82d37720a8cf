//! LLM-extractable models for zero-shot message classification

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Confidence the classifier assigns to one candidate label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LabelScore {
    /// One of the candidate labels, verbatim
    pub label: String,
    /// Confidence between 0.0 and 1.0
    pub confidence: f64,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// LLM-extractable classification result
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedClassification {
    pub labels: Vec<LabelScore>,
}
