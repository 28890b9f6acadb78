use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque ID type for a single round
pub type RoundId = String;

/// A single ranked candidate answer produced by the AI guesser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Guess {
    pub word: String,
    pub reasoning: String,
}

impl Guess {
    pub fn new(word: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            reasoning: reasoning.into(),
        }
    }
}

/// Which guess (if any) hit the target, and what it was worth.
///
/// `matched_index` is `None` exactly when `points` is zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub matched_index: Option<usize>,
    pub points: u32,
}

impl MatchOutcome {
    pub fn miss() -> Self {
        Self {
            matched_index: None,
            points: 0,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.matched_index.is_some()
    }
}

/// Scored result of one round, as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GuessResult {
    pub round_id: RoundId,
    pub guesses: Vec<Guess>,
    #[serde(flatten)]
    pub outcome: MatchOutcome,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A secret word and the words the describer may not use for it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub word: String,
    pub forbidden_words: Vec<String>,
    pub difficulty: Difficulty,
}

/// Text-generation vendors the guesser can be backed by
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Google,
    OpenAi,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Google,
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::Ollama,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Model used when neither the request nor the preferences name one
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Google => "gemini-2.0-flash-lite",
            ProviderKind::OpenAi => "gpt-5-nano",
            ProviderKind::Anthropic => "claude-3-5-haiku-20241022",
            ProviderKind::Ollama => "llama3.2",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown provider '{}'", s))
    }
}
