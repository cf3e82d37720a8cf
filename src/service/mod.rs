pub mod aggregator;
pub mod consolidate;
pub mod html;
pub mod lexical;
pub mod llm;
pub mod profile;
pub mod reputation;
pub mod semantic;
pub mod signature;
pub mod url;

pub use aggregator::{AnalysisError, RiskAggregator};
pub use consolidate::FindingConsolidator;
pub use html::HtmlInspector;
pub use lexical::LexicalAnalyzer;
pub use llm::{LlmClient, LlmClientError};
pub use reputation::{ReputationLookup, ReputationProvider, StaticReputationProvider};
pub use semantic::{
    EmbeddingClassifier, HashingEmbedder, LlmClassifier, SemanticAnalyzer, TextClassifier,
};
pub use url::UrlEvaluator;
