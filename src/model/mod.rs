pub mod classification;
pub mod config;
pub mod finding;
pub mod lists;
pub mod policy;
pub mod rules;
pub mod verdict;

pub use classification::{ExtractedClassification, LabelScore};
pub use config::{Config, ReputationLists, SemanticBackendKind, SemanticConfig};
pub use finding::{ComponentResult, Finding, FindingCategory, clamp_score};
pub use lists::{BrandDomains, DomainLists, domain_matches};
pub use policy::ScoringPolicy;
pub use rules::{CompiledCueRules, CueRuleSet, RuleError};
pub use verdict::{
    AnalysisRequest, ExtractedUrls, Prediction, RecipientProfile, RiskLevel, ThreatSignature,
    ThreatType, Verdict, NO_URLS_SENTINEL,
};
