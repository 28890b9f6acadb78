use std::sync::Arc;

use crate::config::SessionConfig;
use crate::llm::{LlmConfig, LlmError, LlmManager, LlmProvider, LlmResult};
use crate::round::GuesserSettings;
use crate::types::ProviderKind;

/// Shared application state
pub struct AppState {
    /// Providers configured on the server
    pub llm: LlmManager,
    pub llm_config: LlmConfig,
    /// Session record loaded (and migrated) at startup
    pub session: SessionConfig,
}

impl AppState {
    pub fn new(llm: LlmManager, llm_config: LlmConfig, session: SessionConfig) -> Self {
        Self {
            llm,
            llm_config,
            session,
        }
    }

    /// Pick the provider for a request.
    ///
    /// A key sent with the request builds a one-off provider; otherwise the
    /// server's configured provider of that kind is used.
    pub fn resolve_provider(
        &self,
        kind: ProviderKind,
        api_key: Option<&str>,
    ) -> LlmResult<Arc<dyn LlmProvider>> {
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            return self.llm_config.provider_with_key(kind, key);
        }

        self.llm.get(kind.as_str()).ok_or_else(|| {
            LlmError::ConfigError(format!(
                "Provider '{}' not configured and no API key supplied",
                kind
            ))
        })
    }

    /// Provider to use when a request does not name one.
    ///
    /// The session's preference wins when the server can serve it; otherwise
    /// the first provider configured on the server is used.
    pub fn default_provider(&self) -> ProviderKind {
        let preferred = self.session.preferred_provider();
        if self.llm.get(preferred.as_str()).is_some() {
            return preferred;
        }

        self.llm
            .names()
            .iter()
            .find_map(|name| name.parse::<ProviderKind>().ok())
            .unwrap_or(preferred)
    }

    /// Guesser settings for a request, falling back to session preferences.
    pub fn guesser_settings(
        &self,
        kind: ProviderKind,
        model: Option<String>,
        custom_instructions: Option<String>,
    ) -> GuesserSettings {
        GuesserSettings {
            custom_instructions: custom_instructions
                .unwrap_or_else(|| self.session.preferences.custom_instructions.clone()),
            model: model
                .filter(|m| !m.trim().is_empty())
                .or_else(|| self.session.remembered_model(kind)),
            max_tokens: Some(self.llm_config.default_max_tokens),
            timeout: self.llm_config.default_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKeys, Preferences};

    fn state_with_session(session: SessionConfig) -> AppState {
        AppState::new(LlmManager::new(Vec::new()), LlmConfig::default(), session)
    }

    #[test]
    fn test_resolve_provider_with_request_key() {
        let state = state_with_session(SessionConfig::default());

        let provider = state
            .resolve_provider(ProviderKind::Anthropic, Some(" sk-ant-1 "))
            .unwrap();
        assert_eq!(provider.name(), "anthropic");
    }

    #[test]
    fn test_resolve_provider_without_any_credential() {
        let state = state_with_session(SessionConfig::default());

        let err = state
            .resolve_provider(ProviderKind::OpenAi, Some("   "))
            .err()
            .expect("should fail without a key");
        assert!(matches!(err, LlmError::ConfigError(_)));
        assert!(err.to_string().contains("openai"));
    }

    #[test]
    fn test_default_provider_uses_server_configuration() {
        let llm_config = LlmConfig {
            openai_api_key: Some("sk-env".to_string()),
            ollama_base_url: None,
            ..LlmConfig::default()
        };
        let manager = llm_config.build_manager().unwrap();
        let state = AppState::new(manager, llm_config, SessionConfig::default());

        assert_eq!(state.default_provider(), ProviderKind::OpenAi);
        let provider = state.resolve_provider(state.default_provider(), None).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_default_provider_prefers_session_choice() {
        let llm_config = LlmConfig {
            google_api_key: Some("AIza-env".to_string()),
            ..LlmConfig::default()
        };
        let manager = llm_config.build_manager().unwrap();
        let state = AppState::new(
            manager,
            llm_config,
            SessionConfig {
                preferences: Preferences {
                    last_used_provider: Some(ProviderKind::Ollama),
                    ..Preferences::default()
                },
                ..SessionConfig::default()
            },
        );

        assert_eq!(state.default_provider(), ProviderKind::Ollama);
    }

    #[test]
    fn test_default_provider_without_any_server_provider() {
        let state = state_with_session(SessionConfig::default());
        assert_eq!(state.default_provider(), ProviderKind::Google);
    }

    #[test]
    fn test_guesser_settings_use_session_preferences() {
        let state = state_with_session(SessionConfig {
            api_keys: ApiKeys::default(),
            preferences: Preferences {
                last_used_provider: Some(ProviderKind::OpenAi),
                last_used_model: Some("gpt-5-mini".to_string()),
                custom_instructions: "Short clues".to_string(),
            },
            ..SessionConfig::default()
        });

        let settings = state.guesser_settings(ProviderKind::OpenAi, None, None);
        assert_eq!(settings.model.as_deref(), Some("gpt-5-mini"));
        assert_eq!(settings.custom_instructions, "Short clues");
        assert_eq!(settings.max_tokens, Some(300));

        let settings = state.guesser_settings(
            ProviderKind::Google,
            Some("gemini-2.0-flash".to_string()),
            Some(String::new()),
        );
        assert_eq!(settings.model.as_deref(), Some("gemini-2.0-flash"));
        assert_eq!(settings.custom_instructions, "");

        let settings = state.guesser_settings(ProviderKind::Google, None, None);
        assert_eq!(settings.model, None);
    }
}
