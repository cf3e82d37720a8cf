//! Deterministic classifier doubles for tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::model::LabelScore;
use crate::service::semantic::classifier::TextClassifier;
use crate::service::semantic::error::SemanticError;

/// Returns the same label scores for every text
pub struct StaticClassifier {
    scores: Vec<LabelScore>,
}

impl StaticClassifier {
    pub fn new(scores: &[(&str, f64)]) -> Self {
        Self {
            scores: scores
                .iter()
                .map(|(label, confidence)| LabelScore::new(*label, *confidence))
                .collect(),
        }
    }
}

#[async_trait]
impl TextClassifier for StaticClassifier {
    async fn classify(
        &self,
        _text: &str,
        labels: &[&str],
    ) -> Result<Vec<LabelScore>, SemanticError> {
        Ok(self
            .scores
            .iter()
            .filter(|s| labels.contains(&s.label.as_str()))
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}

pub struct FailingClassifier;

#[async_trait]
impl TextClassifier for FailingClassifier {
    async fn classify(
        &self,
        _text: &str,
        _labels: &[&str],
    ) -> Result<Vec<LabelScore>, SemanticError> {
        Err(SemanticError::ClassificationFailed(
            "model backend unreachable".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Sleeps before answering and records peak concurrency
pub struct SlowClassifier {
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl SlowClassifier {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextClassifier for SlowClassifier {
    async fn classify(
        &self,
        _text: &str,
        _labels: &[&str],
    ) -> Result<Vec<LabelScore>, SemanticError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(vec![LabelScore::new("urgent", 0.5)])
    }

    fn name(&self) -> &str {
        "slow"
    }
}
