//! Shared LLM client
//!
//! Built once at startup and handed to whatever needs structured extraction.

use rig::providers::openai;

/// Environment variable for the OpenAI API key
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("{ENV_OPENAI_API_KEY} is not set")]
    MissingApiKey,

    #[error("Failed to create OpenAI client: {0}")]
    Client(String),
}

/// Shared LLM client wrapper
#[derive(Clone)]
pub struct LlmClient {
    client: openai::Client,
}

impl LlmClient {
    /// Create a new LLM client with the provided API key
    pub fn new(api_key: &str) -> Result<Self, LlmClientError> {
        let client =
            openai::Client::new(api_key).map_err(|e| LlmClientError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Create a client from `OPENAI_API_KEY`
    pub fn from_env() -> Result<Self, LlmClientError> {
        let key = std::env::var(ENV_OPENAI_API_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmClientError::MissingApiKey)?;
        Self::new(&key)
    }

    /// The underlying OpenAI client, for building extractors
    pub fn openai_client(&self) -> &openai::Client {
        &self.client
    }
}
