use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of evidence a finding represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    Urgency,
    Fear,
    Authority,
    Financial,
    Credential,
    Spelling,
    Greeting,
    Url,
    Reputation,
    Sender,
    Obfuscation,
    Semantic,
}

impl FindingCategory {
    /// Categories whose findings are lexical cues and may be summarised together
    pub fn is_cue(self) -> bool {
        matches!(
            self,
            FindingCategory::Urgency
                | FindingCategory::Fear
                | FindingCategory::Authority
                | FindingCategory::Financial
                | FindingCategory::Credential
                | FindingCategory::Spelling
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            FindingCategory::Urgency => "Urgency",
            FindingCategory::Fear => "Fear",
            FindingCategory::Authority => "Authority",
            FindingCategory::Financial => "Financial",
            FindingCategory::Credential => "Credential",
            FindingCategory::Spelling => "Spelling",
            FindingCategory::Greeting => "Greeting",
            FindingCategory::Url => "URL",
            FindingCategory::Reputation => "Reputation",
            FindingCategory::Sender => "Sender",
            FindingCategory::Obfuscation => "Obfuscation",
            FindingCategory::Semantic => "Semantic",
        }
    }
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One explanatory unit of evidence contributing to the score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: FindingCategory,
    pub message: String,
    /// Points this finding contributed to its component score
    pub weight: i32,
}

impl Finding {
    pub fn new(category: FindingCategory, message: impl Into<String>, weight: i32) -> Self {
        Self {
            category,
            message: message.into(),
            weight,
        }
    }
}

/// Score and evidence produced by one analysis component
///
/// The score is clamped to `[0, 100]` on construction and the result is never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ComponentResult {
    score: u32,
    findings: Vec<Finding>,
}

impl ComponentResult {
    pub fn new(raw_score: i64, findings: Vec<Finding>) -> Self {
        Self {
            score: clamp_score(raw_score),
            findings,
        }
    }

    /// Build a result whose raw score is the sum of its finding weights
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        let raw: i64 = findings.iter().map(|f| i64::from(f.weight)).sum();
        Self::new(raw, findings)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

/// Clamp any raw score into the `[0, 100]` range
pub fn clamp_score(raw: i64) -> u32 {
    raw.clamp(0, 100) as u32
}
