//! Capability traits and the LLM-backed zero-shot classifier

use async_trait::async_trait;
use rig::client::CompletionClient;

use crate::model::{ExtractedClassification, LabelScore};
use crate::service::llm::LlmClient;
use crate::service::semantic::error::SemanticError;
use crate::service::semantic::prompts::{CLASSIFICATION_SYSTEM_PROMPT, build_classification_prompt};

/// Zero-shot classification capability
#[async_trait]
pub trait TextClassifier: Send + Sync {
    /// Confidence in `[0, 1]` for each of `labels`
    async fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<LabelScore>, SemanticError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Sentence-embedding capability
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError>;

    fn name(&self) -> &str;
}

/// Classifier that asks an LLM for per-label confidences
pub struct LlmClassifier {
    llm_client: LlmClient,
    model: String,
}

impl LlmClassifier {
    pub fn new(llm_client: LlmClient, model: impl Into<String>) -> Self {
        let model = model.into();
        tracing::info!(model = %model, "LLM classifier initialized");
        Self { llm_client, model }
    }
}

#[async_trait]
impl TextClassifier for LlmClassifier {
    async fn classify(
        &self,
        text: &str,
        labels: &[&str],
    ) -> Result<Vec<LabelScore>, SemanticError> {
        let start_time = std::time::Instant::now();
        let prompt = build_classification_prompt(text, labels);

        let extractor = self
            .llm_client
            .openai_client()
            .extractor::<ExtractedClassification>(&self.model)
            .preamble(CLASSIFICATION_SYSTEM_PROMPT)
            .build();

        let extracted = match extractor.extract(&prompt).await {
            Ok(result) => {
                tracing::debug!(
                    model = %self.model,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    prompt_length = prompt.len(),
                    "LLM classification completed"
                );
                result
            }
            Err(e) => {
                tracing::warn!(
                    model = %self.model,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    error = %e,
                    "LLM classification failed"
                );
                return Err(SemanticError::ClassificationFailed(e.to_string()));
            }
        };

        // Keep only offered labels, first answer wins
        let mut scores: Vec<LabelScore> = Vec::new();
        for candidate in extracted.labels {
            let label = candidate.label.trim().to_lowercase();
            if !labels.contains(&label.as_str()) || scores.iter().any(|s| s.label == label) {
                continue;
            }
            if !candidate.confidence.is_finite() {
                return Err(SemanticError::InvalidOutput(format!(
                    "non-finite confidence for label '{}'",
                    label
                )));
            }
            scores.push(LabelScore::new(label, candidate.confidence.clamp(0.0, 1.0)));
        }

        Ok(scores)
    }

    fn name(&self) -> &str {
        "llm"
    }
}
