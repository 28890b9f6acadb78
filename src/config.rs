//! Versioned session record: API keys and player preferences.
//!
//! The record is read once at startup. Older layouts are upgraded by
//! [`migrate`], which returns a new record plus whether an upgrade happened,
//! and leaves persisting it to the caller.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::ProviderKind;

/// Schema version for the session record
/// Version 1: unversioned `{ apiKey, customInstructions, provider, model }`
/// Version 2: per-provider key store plus separate preferences
pub const SESSION_SCHEMA_VERSION: u32 = 2;

/// Longest custom instructions a player may attach to their guesser
pub const MAX_INSTRUCTIONS_LENGTH: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid session JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Unrecognized session format")]
    UnrecognizedFormat,
}

/// One API key per vendor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKeys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic: Option<String>,
}

impl ApiKeys {
    pub fn get(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::Google => self.google.as_deref(),
            ProviderKind::OpenAi => self.openai.as_deref(),
            ProviderKind::Anthropic => self.anthropic.as_deref(),
            ProviderKind::Ollama => None,
        }
    }

    fn with(mut self, kind: ProviderKind, key: String) -> Self {
        let key = Some(key).filter(|k| !k.trim().is_empty());
        match kind {
            ProviderKind::Google => self.google = key,
            ProviderKind::OpenAi => self.openai = key,
            ProviderKind::Anthropic => self.anthropic = key,
            ProviderKind::Ollama => {}
        }
        self
    }

    /// Providers that have a key stored
    pub fn configured(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_some())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preferences {
    #[serde(default)]
    pub last_used_provider: Option<ProviderKind>,
    #[serde(default)]
    pub last_used_model: Option<String>,
    #[serde(default)]
    pub custom_instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    pub schema_version: u32,
    #[serde(default)]
    pub api_keys: ApiKeys,
    #[serde(default)]
    pub preferences: Preferences,
    /// When this record was produced by a migration (ISO8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_at: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            schema_version: SESSION_SCHEMA_VERSION,
            api_keys: ApiKeys::default(),
            preferences: Preferences::default(),
            migrated_at: None,
        }
    }
}

impl SessionConfig {
    /// Provider to use when a request does not name one.
    ///
    /// The last used provider wins if it still has a key; otherwise the first
    /// provider with a key, then the global default.
    pub fn preferred_provider(&self) -> ProviderKind {
        let configured = self.api_keys.configured();
        match self.preferences.last_used_provider {
            Some(kind) if kind == ProviderKind::Ollama || configured.contains(&kind) => kind,
            _ => configured.first().copied().unwrap_or_default(),
        }
    }

    /// The model last used with `kind`, if the player picked one
    pub fn remembered_model(&self, kind: ProviderKind) -> Option<String> {
        match (&self.preferences.last_used_provider, &self.preferences.last_used_model) {
            (Some(last), Some(model)) if *last == kind && !model.trim().is_empty() => {
                Some(model.clone())
            }
            _ => None,
        }
    }
}

/// The unversioned layout written by the first release
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyConfig {
    api_key: String,
    #[serde(default)]
    custom_instructions: String,
    #[serde(default)]
    provider: Option<ProviderKind>,
    #[serde(default)]
    model: Option<String>,
}

impl LegacyConfig {
    fn upgrade(self) -> SessionConfig {
        let provider = self.provider.unwrap_or_default();
        let model = self
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        SessionConfig {
            schema_version: SESSION_SCHEMA_VERSION,
            api_keys: ApiKeys::default().with(provider, self.api_key),
            preferences: Preferences {
                last_used_provider: Some(provider),
                last_used_model: Some(model),
                custom_instructions: self.custom_instructions.trim().to_string(),
            },
            migrated_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// Bring any known session layout up to [`SESSION_SCHEMA_VERSION`].
///
/// The flag is `true` only when the record was rewritten into a newer layout.
/// `migrated_at` is history kept in the record and says nothing about the
/// current load.
pub fn migrate(value: serde_json::Value) -> Result<(SessionConfig, bool), ConfigError> {
    if let Some(version) = value.get("schema_version") {
        let found = version
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or(ConfigError::UnrecognizedFormat)?;
        if found > SESSION_SCHEMA_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found,
                supported: SESSION_SCHEMA_VERSION,
            });
        }
        let mut config: SessionConfig = serde_json::from_value(value)?;
        let upgraded = config.schema_version != SESSION_SCHEMA_VERSION;
        config.schema_version = SESSION_SCHEMA_VERSION;
        return Ok((config, upgraded));
    }

    if value.get("apiKey").is_some() {
        let legacy: LegacyConfig = serde_json::from_value(value)?;
        return Ok((legacy.upgrade(), true));
    }

    Err(ConfigError::UnrecognizedFormat)
}

/// Load the session record at `path`, migrating it if needed.
///
/// A missing file yields the default record. The flag tells the caller
/// whether the loaded record should be written back.
pub fn load_session(path: &Path) -> Result<(SessionConfig, bool), ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No session file at {}, using defaults", path.display());
            return Ok((SessionConfig::default(), false));
        }
        Err(e) => return Err(e.into()),
    };

    let value: serde_json::Value = serde_json::from_str(&contents)?;
    migrate(value)
}

pub fn save_session(path: &Path, config: &SessionConfig) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}
