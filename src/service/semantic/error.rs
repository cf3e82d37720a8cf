//! Error types for the semantic capability

use std::time::Duration;

use thiserror::Error;

/// Why a semantic score could not be produced
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SemanticError {
    #[error("Classification failed: {0}")]
    ClassificationFailed(String),

    #[error("Classifier returned unusable output: {0}")]
    InvalidOutput(String),

    #[error("Semantic call timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Semantic capability has been shut down")]
    ShutDown,
}
