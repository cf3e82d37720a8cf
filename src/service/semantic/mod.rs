//! Semantic signal adapter
//!
//! Wraps an injected [`TextClassifier`] and converts its label confidences into
//! a component score. The capability is treated as unreliable: failures,
//! timeouts and shutdown all degrade to a zero score with an explanatory
//! finding, never to an error.

pub mod classifier;
pub mod embedding;
pub mod error;
pub mod language;
pub mod prompts;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::model::policy::SemanticWeights;
use crate::model::{ComponentResult, Finding, FindingCategory, LabelScore, SemanticConfig};

pub use classifier::{LlmClassifier, TextClassifier, TextEmbedder};
pub use embedding::{EmbeddingClassifier, HashingEmbedder, cosine_similarity};
pub use error::SemanticError;
pub use language::{Language, detect_language};
pub use prompts::{LABELS, SAFE_LABEL};

#[derive(Clone)]
pub struct SemanticAnalyzer {
    classifier: Option<Arc<dyn TextClassifier>>,
    weights: SemanticWeights,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl SemanticAnalyzer {
    pub fn new(
        classifier: Arc<dyn TextClassifier>,
        weights: SemanticWeights,
        config: &SemanticConfig,
    ) -> Self {
        let permits = config.max_concurrent_calls.max(1);
        tracing::info!(
            classifier = classifier.name(),
            timeout_ms = config.timeout_ms,
            max_concurrent_calls = permits,
            "Semantic analyzer initialized"
        );
        Self {
            classifier: Some(classifier),
            weights,
            timeout: config.timeout(),
            permits: Arc::new(Semaphore::new(permits)),
        }
    }

    /// Analyzer with no capability; always scores zero
    pub fn disabled(weights: SemanticWeights) -> Self {
        tracing::info!("Semantic analyzer disabled");
        Self {
            classifier: None,
            weights,
            timeout: Duration::ZERO,
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.classifier.is_some()
    }

    /// Refuse all further calls; in-flight calls finish normally
    pub fn shutdown(&self) {
        self.permits.close();
        tracing::info!("Semantic analyzer shut down");
    }

    pub async fn analyze(&self, text: &str) -> ComponentResult {
        let Some(classifier) = &self.classifier else {
            return ComponentResult::empty();
        };

        let language = detect_language(text);
        match self.classify(classifier.as_ref(), text).await {
            Ok(labels) => self.score_labels(&labels, language),
            Err(e) => {
                tracing::warn!(
                    classifier = classifier.name(),
                    error = %e,
                    "Semantic signal unavailable, scoring as zero"
                );
                ComponentResult::new(
                    0,
                    vec![Finding::new(
                        FindingCategory::Semantic,
                        format!("Semantic analysis unavailable: {}", e),
                        0,
                    )],
                )
            }
        }
    }

    async fn classify(
        &self,
        classifier: &dyn TextClassifier,
        text: &str,
    ) -> Result<Vec<LabelScore>, SemanticError> {
        // Waiting for a permit counts against the same deadline as the call
        let call = async {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| SemanticError::ShutDown)?;
            classifier.classify(text, LABELS).await
        };

        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| SemanticError::Timeout(self.timeout))?
    }

    /// Convert label confidences into a score
    ///
    /// Labels under the confidence threshold, the safe label and labels
    /// without a factor contribute nothing. The sum is scaled by the
    /// language multiplier and clamped.
    pub fn score_labels(&self, labels: &[LabelScore], language: Language) -> ComponentResult {
        let w = &self.weights;
        let mut raw = 0.0;
        let mut findings = Vec::new();

        for label in labels {
            if label.label == SAFE_LABEL || label.confidence < w.confidence_threshold {
                continue;
            }
            let factor = match label.label.as_str() {
                "urgent" => w.urgent,
                "fear" => w.fear,
                "authority" => w.authority,
                "financial scam" => w.financial_scam,
                _ => continue,
            };
            let contribution = label.confidence * factor;
            raw += contribution;
            findings.push(Finding::new(
                FindingCategory::Semantic,
                format!("Semantic signal: {} ({:.2})", label.label, label.confidence),
                contribution.round() as i32,
            ));
        }

        let multiplier = language.sensitivity_multiplier(w);
        let result = ComponentResult::new((raw * multiplier).round() as i64, findings);
        tracing::debug!(
            language = language.code(),
            multiplier,
            score = result.score(),
            "Semantic analysis complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::semantic::testing::{FailingClassifier, SlowClassifier, StaticClassifier};

    fn config(timeout_ms: u64, max_concurrent_calls: usize) -> SemanticConfig {
        SemanticConfig {
            timeout_ms,
            max_concurrent_calls,
            ..SemanticConfig::default()
        }
    }

    fn analyzer(classifier: Arc<dyn TextClassifier>) -> SemanticAnalyzer {
        SemanticAnalyzer::new(classifier, SemanticWeights::default(), &config(200, 2))
    }

    #[tokio::test]
    async fn test_labels_above_threshold_contribute() {
        let classifier = StaticClassifier::new(&[
            ("urgent", 0.5),
            ("fear", 0.2),
            ("financial scam", 0.4),
            ("safe", 0.9),
        ]);
        let result = analyzer(Arc::new(classifier))
            .analyze("Please act now on your account")
            .await;
        // 0.5 * 80 + 0.4 * 90
        assert_eq!(result.score(), 76);
        assert_eq!(result.findings().len(), 2);
        assert!(
            result
                .findings()
                .iter()
                .all(|f| f.category == FindingCategory::Semantic)
        );
    }

    #[tokio::test]
    async fn test_language_multiplier_applied() {
        let classifier = StaticClassifier::new(&[("authority", 0.5)]);
        let result = analyzer(Arc::new(classifier))
            .analyze("Ваш аккаунт заблокирован")
            .await;
        // 0.5 * 70 * 1.15 = 40.25
        assert_eq!(result.score(), 40);
    }

    #[tokio::test]
    async fn test_score_is_clamped() {
        let classifier = StaticClassifier::new(&[
            ("urgent", 1.0),
            ("fear", 1.0),
            ("authority", 1.0),
            ("financial scam", 1.0),
        ]);
        let result = analyzer(Arc::new(classifier)).analyze("anything").await;
        assert_eq!(result.score(), 100);
    }

    #[tokio::test]
    async fn test_failure_degrades_to_zero() {
        let result = analyzer(Arc::new(FailingClassifier)).analyze("anything").await;
        assert_eq!(result.score(), 0);
        assert_eq!(result.findings().len(), 1);
        assert!(result.findings()[0].message.contains("unavailable"));
    }

    #[tokio::test]
    async fn test_timeout_degrades_to_zero() {
        let slow = SlowClassifier::new(Duration::from_secs(5));
        let analyzer = SemanticAnalyzer::new(
            Arc::new(slow),
            SemanticWeights::default(),
            &config(20, 1),
        );
        let result = analyzer.analyze("anything").await;
        assert_eq!(result.score(), 0);
        assert!(result.findings()[0].message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_hashing_backend_leaves_everyday_mail_at_zero() {
        let classifier = EmbeddingClassifier::new(Arc::new(HashingEmbedder::default()), LABELS)
            .await
            .unwrap();
        let analyzer = analyzer(Arc::new(classifier));
        for text in [
            "Your account statement for March is available in the app. \
             Thank you for banking with us.",
            "Thanks for your help with the report, see you tomorrow.",
            "Please review the attached document before our meeting",
            "The build is green again, merging the fix after lunch.",
            "Your order has shipped and will arrive on Tuesday.",
            "Quarterly numbers attached",
        ] {
            let result = analyzer.analyze(text).await;
            assert_eq!(result.score(), 0, "{}: {:?}", text, result.findings());
            assert!(result.findings().is_empty());
        }

        let scam = analyzer
            .analyze("You won the lottery! Claim your prize reward by wire transfer today")
            .await;
        assert!(scam.score() > 0);
    }

    #[tokio::test]
    async fn test_queued_calls_share_the_timeout() {
        let slow = SlowClassifier::new(Duration::from_secs(5));
        let analyzer = SemanticAnalyzer::new(
            Arc::new(slow),
            SemanticWeights::default(),
            &config(100, 1),
        );
        let started = std::time::Instant::now();
        let (a, b, c) = tokio::join!(
            analyzer.analyze("one"),
            analyzer.analyze("two"),
            analyzer.analyze("three")
        );
        assert!(started.elapsed() < Duration::from_millis(250));
        for result in [a, b, c] {
            assert!(result.findings()[0].message.contains("timed out"));
        }
    }

    #[tokio::test]
    async fn test_shutdown_refuses_calls() {
        let analyzer = analyzer(Arc::new(StaticClassifier::new(&[("urgent", 0.9)])));
        analyzer.shutdown();
        let result = analyzer.analyze("anything").await;
        assert_eq!(result.score(), 0);
        assert!(result.findings()[0].message.contains("shut down"));
    }

    #[tokio::test]
    async fn test_disabled_scores_zero_without_findings() {
        let analyzer = SemanticAnalyzer::disabled(SemanticWeights::default());
        assert!(!analyzer.is_enabled());
        let result = analyzer.analyze("URGENT verify now").await;
        assert_eq!(result, ComponentResult::empty());
    }

    #[tokio::test]
    async fn test_single_flight_serialises_calls() {
        let slow = Arc::new(SlowClassifier::new(Duration::from_millis(30)));
        let analyzer = SemanticAnalyzer::new(
            slow.clone(),
            SemanticWeights::default(),
            &config(1_000, 1),
        );

        let (a, b) = tokio::join!(analyzer.analyze("one"), analyzer.analyze("two"));
        assert_eq!(a.score(), b.score());
        assert_eq!(slow.max_in_flight(), 1);
    }
}
