use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::model::{DomainLists, ScoringPolicy};

const ENV_CONFIG_PATH: &str = "BAITBLOCK_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const ENV_SEMANTIC_BACKEND: &str = "SEMANTIC_BACKEND";
const ENV_SEMANTIC_MODEL: &str = "SEMANTIC_MODEL";
const ENV_SEMANTIC_TIMEOUT_MS: &str = "SEMANTIC_TIMEOUT_MS";
const ENV_RULES_PATH: &str = "CUE_RULES_PATH";

const DEFAULT_SEMANTIC_MODEL: &str = "gpt-4o-mini";
const DEFAULT_SEMANTIC_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MAX_CONCURRENT_CALLS: usize = 4;
const DEFAULT_MAX_TEXT_CHARS: usize = 100_000;

/// Which capability backs the semantic signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticBackendKind {
    /// Zero-shot classification through the LLM client (needs `OPENAI_API_KEY`)
    Llm,
    /// Local feature-hashing embedder, no network access
    #[default]
    Hashing,
    /// No semantic signal; the component always reports zero
    Disabled,
}

impl SemanticBackendKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "llm" => Some(Self::Llm),
            "hashing" => Some(Self::Hashing),
            "disabled" | "off" | "none" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Semantic capability settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    pub backend: SemanticBackendKind,
    pub model: String,
    pub timeout_ms: u64,
    /// Calls allowed in flight at once; 1 serialises access to the capability
    pub max_concurrent_calls: usize,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            backend: SemanticBackendKind::default(),
            model: DEFAULT_SEMANTIC_MODEL.to_string(),
            timeout_ms: DEFAULT_SEMANTIC_TIMEOUT_MS,
            max_concurrent_calls: DEFAULT_MAX_CONCURRENT_CALLS,
        }
    }
}

impl SemanticConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Static allow and block lists for the reputation provider
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReputationLists {
    pub trusted_senders: Vec<String>,
    pub trusted_domains: Vec<String>,
    pub blacklisted_senders: Vec<String>,
    pub blacklisted_domains: Vec<String>,
}

impl Default for ReputationLists {
    fn default() -> Self {
        Self {
            trusted_senders: vec![
                "service@paypal.com".to_string(),
                "no-reply@accounts.google.com".to_string(),
                "account-security-noreply@accountprotection.microsoft.com".to_string(),
            ],
            trusted_domains: vec![
                "paypal.com".to_string(),
                "google.com".to_string(),
                "microsoft.com".to_string(),
                "amazon.com".to_string(),
                "apple.com".to_string(),
                "github.com".to_string(),
            ],
            blacklisted_senders: Vec::new(),
            blacklisted_domains: vec!["badsite.tk".to_string(), "phishingsite.com".to_string()],
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub scoring: ScoringPolicy,
    #[serde(default)]
    pub lists: DomainLists,
    #[serde(default)]
    pub reputation: ReputationLists,
    #[serde(default)]
    pub semantic: SemanticConfig,
    #[serde(default)]
    pub rules_path: Option<String>,
    #[serde(default)]
    pub max_text_chars: Option<usize>,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub scoring: ScoringPolicy,
    pub lists: DomainLists,
    pub reputation: ReputationLists,
    pub semantic: SemanticConfig,
    pub rules_path: Option<String>,
    pub max_text_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring: ScoringPolicy::default(),
            lists: DomainLists::default(),
            reputation: ReputationLists::default(),
            semantic: SemanticConfig::default(),
            rules_path: None,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        Self {
            scoring: file.scoring,
            lists: file.lists,
            reputation: file.reputation,
            semantic: file.semantic,
            rules_path: file.rules_path,
            max_text_chars: file.max_text_chars.unwrap_or(DEFAULT_MAX_TEXT_CHARS),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config: Config = Self::load_config_file(&config_path)
            .map(Config::from)
            .unwrap_or_default();

        if let Ok(value) = std::env::var(ENV_SEMANTIC_BACKEND) {
            match SemanticBackendKind::parse(&value) {
                Some(kind) => config.semantic.backend = kind,
                None => {
                    tracing::warn!(
                        value = %value,
                        "Unknown SEMANTIC_BACKEND, keeping configured backend"
                    )
                }
            }
        }

        if let Ok(model) = std::env::var(ENV_SEMANTIC_MODEL) {
            config.semantic.model = model;
        }

        if let Some(timeout_ms) = std::env::var(ENV_SEMANTIC_TIMEOUT_MS)
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.semantic.timeout_ms = timeout_ms;
        }

        if let Ok(path) = std::env::var(ENV_RULES_PATH) {
            config.rules_path = Some(path);
        }

        config
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config file, using defaults"
                        );
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to read config file, using defaults"
                );
                None
            }
        }
    }
}
