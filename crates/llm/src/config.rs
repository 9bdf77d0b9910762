//! Language model connection settings.

use thiserror::Error;

/// Default chat-completions base URL.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Errors produced while loading [`LlmConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmConfigError {
    /// The base URL is not an absolute `http(s)` URL.
    #[error("LLM_API_URL must start with http:// or https://, got '{value}'")]
    InvalidUrl {
        /// The rejected value.
        value: String,
    },
}

/// Where and how to reach the language model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Base URL of the chat-completions API, without a trailing slash.
    pub api_url: String,
    /// Bearer token. `None` for local providers that need no authentication.
    pub api_key: Option<String>,
    /// Model name sent with every request.
    pub model: String,
}

impl LlmConfig {
    /// Loads settings from `LLM_API_URL`, `LLM_API_KEY`, and `LLM_MODEL`.
    ///
    /// `lookup` returns the value of an environment variable; binaries pass
    /// a thin wrapper over `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LlmConfigError> {
        let api_url = lookup("LLM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(LlmConfigError::InvalidUrl { value: api_url });
        }

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: lookup("LLM_API_KEY").filter(|k| !k.is_empty()),
            model: lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}
