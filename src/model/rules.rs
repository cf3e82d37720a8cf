//! Versioned lexical cue rule tables
//!
//! Rules are plain data (category -> pattern/weight list) so they can be tuned
//! and tested independently of the scoring code. The built-in table is embedded
//! from `rules/cues.yaml`; a deployment can point `rules_path` at its own file.

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::model::FindingCategory;

const BUILTIN_RULES: &str = include_str!("../../rules/cues.yaml");

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RuleError {
    #[error("Failed to read rule file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rule table: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid pattern '{pattern}' in {context}: {source}")]
    InvalidPattern {
        pattern: String,
        context: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid rule table: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CuePattern {
    pub label: String,
    pub pattern: String,
    pub weight: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CueCategoryRules {
    pub category: FindingCategory,
    pub cap: i32,
    pub patterns: Vec<CuePattern>,
}

/// Rule table as written in YAML
#[derive(Debug, Clone, Deserialize)]
pub struct CueRuleSet {
    pub version: u32,
    pub categories: Vec<CueCategoryRules>,
    #[serde(default)]
    pub misspellings: Vec<String>,
    #[serde(default)]
    pub salutations: Vec<String>,
}

impl CueRuleSet {
    /// The rule table shipped with the crate
    pub fn builtin() -> Result<Self, RuleError> {
        Self::from_yaml(BUILTIN_RULES)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, RuleError> {
        let rules: CueRuleSet = serde_yaml::from_str(contents)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn from_path(path: &Path) -> Result<Self, RuleError> {
        let contents = fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let rules = Self::from_yaml(&contents)?;
        tracing::info!(
            path = %path.display(),
            version = rules.version,
            "Loaded cue rules from file"
        );
        Ok(rules)
    }

    /// Load from `path` when given, otherwise the built-in table
    pub fn load(path: Option<&str>) -> Result<Self, RuleError> {
        match path {
            Some(p) => Self::from_path(Path::new(p)),
            None => Self::builtin(),
        }
    }

    fn validate(&self) -> Result<(), RuleError> {
        for category in &self.categories {
            if !category.category.is_cue() {
                return Err(RuleError::Invalid(format!(
                    "category '{}' is not a lexical cue category",
                    category.category
                )));
            }
            if category.cap <= 0 {
                return Err(RuleError::Invalid(format!(
                    "category '{}' must have a positive cap",
                    category.category
                )));
            }
        }
        Ok(())
    }

    /// Compile every pattern into a case-insensitive regex
    pub fn compile(&self) -> Result<CompiledCueRules, RuleError> {
        let categories = self
            .categories
            .iter()
            .map(|c| {
                let patterns = c
                    .patterns
                    .iter()
                    .map(|p| {
                        Ok(CompiledPattern {
                            label: p.label.clone(),
                            weight: p.weight,
                            regex: compile_pattern(&p.pattern, &c.category.to_string())?,
                        })
                    })
                    .collect::<Result<Vec<_>, RuleError>>()?;
                Ok(CompiledCategory {
                    category: c.category,
                    cap: c.cap,
                    patterns,
                })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;

        let misspellings = self
            .misspellings
            .iter()
            .map(|word| {
                let pattern = format!(r"\b{}\b", regex::escape(word));
                Ok((word.to_lowercase(), compile_pattern(&pattern, "misspellings")?))
            })
            .collect::<Result<Vec<_>, RuleError>>()?;

        let salutations = self
            .salutations
            .iter()
            .map(|s| compile_pattern(s, "salutations"))
            .collect::<Result<Vec<_>, RuleError>>()?;

        Ok(CompiledCueRules {
            version: self.version,
            categories,
            misspellings,
            salutations,
        })
    }
}

fn compile_pattern(pattern: &str, context: &str) -> Result<Regex, RuleError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            context: context.to_string(),
            source,
        })
}

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub label: String,
    pub weight: i32,
    pub regex: Regex,
}

#[derive(Debug, Clone)]
pub struct CompiledCategory {
    pub category: FindingCategory,
    pub cap: i32,
    pub patterns: Vec<CompiledPattern>,
}

/// Rule table ready for matching
#[derive(Debug, Clone)]
pub struct CompiledCueRules {
    pub version: u32,
    pub categories: Vec<CompiledCategory>,
    pub misspellings: Vec<(String, Regex)>,
    pub salutations: Vec<Regex>,
}
