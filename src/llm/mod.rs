mod anthropic;
mod google;
mod ollama;
mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use anthropic::AnthropicProvider;
pub use google::GoogleProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::config::ApiKeys;
use crate::types::ProviderKind;

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Response parsing failed: {0}")]
    ParseError(String),
}

/// A single text-generation call
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Instructions for the model
    pub system_prompt: String,
    /// The player's turn
    pub user_message: String,
    /// Maximum response length in tokens (provider-dependent)
    pub max_tokens: Option<u32>,
    /// Timeout for the request
    pub timeout: Duration,
    /// Optional model override (e.g., "gpt-5-mini" instead of the provider default)
    pub model_override: Option<String>,
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// The generated text
    pub text: String,
    /// Provider-specific metadata (model used, tokens consumed, etc.)
    pub metadata: ResponseMetadata,
}

/// Metadata about the LLM response
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// Name of the provider (e.g., "google", "anthropic")
    pub provider: String,
    /// Model name used
    pub model: String,
    /// Tokens consumed (if available)
    pub tokens_used: Option<u32>,
    /// Latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers must implement
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one system-prompt + user-message completion
    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Providers configured on the server side
pub struct LlmManager {
    pub providers: Vec<Arc<dyn LlmProvider>>,
}

impl LlmManager {
    /// Create a new LLM manager with the given providers
    pub fn new(providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        Self { providers }
    }

    /// Look up a configured provider by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn LlmProvider>> {
        self.providers.iter().find(|p| p.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }
}

/// Configuration for LLM providers
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub google_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    /// Ollama base URL
    pub ollama_base_url: Option<String>,
    /// Ollama model to use when the request names none
    pub ollama_model: String,
    /// Default timeout for LLM requests
    pub default_timeout: Duration,
    /// Default max tokens for responses
    pub default_max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            openai_api_key: None,
            anthropic_api_key: None,
            ollama_base_url: Some("http://localhost:11434".to_string()),
            ollama_model: ProviderKind::Ollama.default_model().to_string(),
            default_timeout: Duration::from_secs(30),
            default_max_tokens: 300,
        }
    }
}

/// Read an environment variable, treating blank values as unset
fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let ollama_base_url = match std::env::var("OLLAMA_BASE_URL") {
            Ok(url) => {
                let trimmed = url.trim();
                (!trimmed.is_empty()).then(|| trimmed.trim_end_matches('/').to_string())
            }
            Err(_) => defaults.ollama_base_url,
        };

        Self {
            google_api_key: env_non_empty("GOOGLE_API_KEY"),
            openai_api_key: env_non_empty("OPENAI_API_KEY"),
            anthropic_api_key: env_non_empty("ANTHROPIC_API_KEY"),
            ollama_base_url,
            ollama_model: env_non_empty("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            default_timeout: env_non_empty("LLM_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_timeout),
            default_max_tokens: env_non_empty("LLM_MAX_TOKENS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_max_tokens),
        }
    }

    /// Fill keys missing from the environment with keys from a session record
    pub fn with_session_keys(mut self, keys: &ApiKeys) -> Self {
        if self.google_api_key.is_none() {
            self.google_api_key = keys.google.clone();
        }
        if self.openai_api_key.is_none() {
            self.openai_api_key = keys.openai.clone();
        }
        if self.anthropic_api_key.is_none() {
            self.anthropic_api_key = keys.anthropic.clone();
        }
        self
    }

    /// The server-side credential for a provider, if any
    pub fn api_key(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::Google => self.google_api_key.as_deref(),
            ProviderKind::OpenAi => self.openai_api_key.as_deref(),
            ProviderKind::Anthropic => self.anthropic_api_key.as_deref(),
            ProviderKind::Ollama => None,
        }
    }

    /// Build a provider for `kind` that authenticates with `api_key`.
    ///
    /// Ollama needs no key but does need a base URL.
    pub fn provider_with_key(
        &self,
        kind: ProviderKind,
        api_key: &str,
    ) -> LlmResult<Arc<dyn LlmProvider>> {
        let provider: Arc<dyn LlmProvider> = match kind {
            ProviderKind::Google => Arc::new(GoogleProvider::new(
                api_key.to_string(),
                kind.default_model().to_string(),
            )),
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
                api_key.to_string(),
                kind.default_model().to_string(),
            )),
            ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(
                api_key.to_string(),
                kind.default_model().to_string(),
            )),
            ProviderKind::Ollama => {
                let base_url = self.ollama_base_url.clone().ok_or_else(|| {
                    LlmError::ConfigError("OLLAMA_BASE_URL is not set".to_string())
                })?;
                Arc::new(OllamaProvider::new(base_url, self.ollama_model.clone()))
            }
        };
        Ok(provider)
    }

    /// Build an LlmManager with all configured providers
    pub fn build_manager(&self) -> LlmResult<LlmManager> {
        let mut providers: Vec<Arc<dyn LlmProvider>> = Vec::new();

        for kind in [
            ProviderKind::Google,
            ProviderKind::OpenAi,
            ProviderKind::Anthropic,
        ] {
            if let Some(api_key) = self.api_key(kind) {
                providers.push(self.provider_with_key(kind, api_key)?);
            }
        }

        if let Some(base_url) = &self.ollama_base_url {
            providers.push(Arc::new(OllamaProvider::new(
                base_url.clone(),
                self.ollama_model.clone(),
            )));
        }

        if providers.is_empty() {
            return Err(LlmError::ConfigError(
                "No LLM providers configured. Set GOOGLE_API_KEY, OPENAI_API_KEY, \
                 ANTHROPIC_API_KEY or OLLAMA_BASE_URL"
                    .to_string(),
            ));
        }

        Ok(LlmManager::new(providers))
    }
}

/// Turn a non-success HTTP response into an error.
///
/// Vendors wrap the reason as `{"error": {"message": ...}}` or
/// `{"error": "..."}`; anything else is passed through as-is.
pub(crate) fn status_error(provider: &str, status: reqwest::StatusCode, body: &str) -> LlmError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return LlmError::RateLimit;
    }

    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            let error = value.get("error")?;
            error
                .get("message")
                .and_then(|m| m.as_str())
                .or_else(|| error.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    LlmError::ApiError(format!("{} API returned status {}: {}", provider, status, message))
}
