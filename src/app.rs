//! Application state and service initialization
//!
//! Builds the scoring engine once at startup: cue rules, the semantic
//! capability, the reputation provider, and the aggregator that ties them
//! together.

use std::sync::Arc;

use crate::model::{Config, CueRuleSet, RuleError, SemanticBackendKind, SemanticConfig};
use crate::service::llm::ENV_OPENAI_API_KEY;
use crate::service::semantic::{LABELS, SemanticError};
use crate::service::{
    EmbeddingClassifier, HashingEmbedder, LlmClassifier, LlmClient, LlmClientError,
    RiskAggregator, StaticReputationProvider, TextClassifier,
};

/// Application state shared by every request
pub struct AppState {
    pub aggregator: Arc<RiskAggregator>,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. Cue rule loading and compilation
    /// 2. Semantic capability selection (`SEMANTIC_BACKEND`)
    /// 3. Reputation provider and aggregator construction
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let rules = CueRuleSet::load(config.rules_path.as_deref())?.compile()?;
        tracing::info!(
            rules_version = rules.version,
            categories = rules.categories.len(),
            "Cue rules loaded"
        );

        let classifier = Self::build_classifier(&config.semantic).await?;
        let provider = Arc::new(StaticReputationProvider::new(config.reputation.clone()));
        let aggregator = Arc::new(RiskAggregator::new(&config, rules, classifier, provider));

        Ok(Self { aggregator })
    }

    async fn build_classifier(
        semantic: &SemanticConfig,
    ) -> Result<Option<Arc<dyn TextClassifier>>, AppError> {
        match semantic.backend {
            SemanticBackendKind::Llm => {
                let llm_client = LlmClient::from_env().map_err(|e| match e {
                    LlmClientError::MissingApiKey => AppError::MissingConfig(ENV_OPENAI_API_KEY),
                    LlmClientError::Client(_) => {
                        AppError::InvalidConfig("Invalid OPENAI_API_KEY")
                    }
                })?;
                tracing::info!(model = %semantic.model, "Using LLM semantic backend");
                Ok(Some(Arc::new(LlmClassifier::new(
                    llm_client,
                    semantic.model.clone(),
                ))))
            }
            SemanticBackendKind::Hashing => {
                let embedder = Arc::new(HashingEmbedder::default());
                let classifier = EmbeddingClassifier::new(embedder, LABELS).await?;
                tracing::info!("Using hashing-embedding semantic backend");
                Ok(Some(Arc::new(classifier)))
            }
            SemanticBackendKind::Disabled => Ok(None),
        }
    }

    /// Release the semantic capability; later requests score it as zero
    pub fn shutdown(&self) {
        self.aggregator.semantic().shutdown();
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("Failed to load cue rules: {0}")]
    Rules(#[from] RuleError),

    #[error("Failed to initialize semantic backend: {0}")]
    Semantic(#[from] SemanticError),
}
