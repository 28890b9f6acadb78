//! One round of play: check the clue, ask the guesser, score the answer.

use std::time::Duration;

use crate::config::MAX_INSTRUCTIONS_LENGTH;
use crate::extract::{extract_guesses, pad_guesses};
use crate::llm::{GenerateRequest, LlmError, LlmProvider};
use crate::matching::find_match;
use crate::prompts::forbidden_violations;
use crate::types::{Guess, GuessResult, Prompt};

#[derive(Debug, thiserror::Error)]
pub enum RoundError {
    #[error("Please enter a description")]
    EmptyDescription,

    #[error("You used forbidden words: {}", .0.join(", "))]
    ForbiddenWords(Vec<String>),

    #[error("Custom instructions are {len} characters long, the limit is {max}")]
    InstructionsTooLong { len: usize, max: usize },

    #[error("AI error: {0}")]
    Provider(#[from] LlmError),
}

/// How the guesser is called for a round
#[derive(Debug, Clone)]
pub struct GuesserSettings {
    pub custom_instructions: String,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

/// System prompt for the AI guesser, with the player's own notes on how they
/// describe things spliced in when present.
pub fn guesser_system_prompt(custom_instructions: &str) -> String {
    let custom_instructions = custom_instructions.trim();
    let partner_notes = if custom_instructions.is_empty() {
        String::new()
    } else {
        format!(
            "Your partner has given you these instructions about how they communicate:\n{}\n\n",
            custom_instructions
        )
    };

    format!(
        "You are playing a word guessing game with your human partner.\n\n\
         {}Your partner will describe a secret word without using certain forbidden words.\n\
         Based on their description, provide your top 3 guesses for what the word is.\n\n\
         Rules:\n\
         - Give exactly 3 guesses, ranked by confidence\n\
         - Each guess should be a single word or short phrase\n\
         - For each guess, briefly explain your reasoning\n\
         - Format your response EXACTLY as:\n\
         GUESS 1: [word] - [brief reasoning]\n\
         GUESS 2: [word] - [brief reasoning]\n\
         GUESS 3: [word] - [brief reasoning]",
        partner_notes
    )
}

pub fn describer_message(description: &str) -> String {
    format!("My description: \"{}\"", description.trim())
}

fn check_instructions(settings: &GuesserSettings) -> Result<(), RoundError> {
    let len = settings.custom_instructions.chars().count();
    if len > MAX_INSTRUCTIONS_LENGTH {
        return Err(RoundError::InstructionsTooLong {
            len,
            max: MAX_INSTRUCTIONS_LENGTH,
        });
    }
    Ok(())
}

/// Reject a clue before anything is sent to a provider.
pub fn validate_clue(prompt: &Prompt, description: &str) -> Result<(), RoundError> {
    let violations = forbidden_violations(prompt, description);
    if !violations.is_empty() {
        return Err(RoundError::ForbiddenWords(violations));
    }
    if description.trim().is_empty() {
        return Err(RoundError::EmptyDescription);
    }
    Ok(())
}

/// Ask the guesser for its three ranked guesses.
///
/// The list is always exactly three long; unparsed slots hold the
/// "[No guess]" placeholder.
pub async fn request_guesses(
    provider: &dyn LlmProvider,
    settings: &GuesserSettings,
    description: &str,
) -> Result<Vec<Guess>, RoundError> {
    if description.trim().is_empty() {
        return Err(RoundError::EmptyDescription);
    }
    check_instructions(settings)?;

    let request = GenerateRequest {
        system_prompt: guesser_system_prompt(&settings.custom_instructions),
        user_message: describer_message(description),
        max_tokens: settings.max_tokens,
        timeout: settings.timeout,
        model_override: settings.model.clone(),
    };

    let response = provider.generate(request).await.map_err(|e| {
        tracing::error!("Provider {} failed: {}", provider.name(), e);
        e
    })?;

    let guesses = extract_guesses(&response.text);
    tracing::debug!(
        "Parsed {} guess(es) from {} ({}, {}ms)",
        guesses.len(),
        response.metadata.provider,
        response.metadata.model,
        response.metadata.latency_ms
    );
    if guesses.is_empty() {
        tracing::warn!("Could not parse any guesses from response: {:?}", response.text);
    }

    Ok(pad_guesses(guesses))
}

/// Score a (padded) guess list against the round's secret word.
pub fn score_round(guesses: Vec<Guess>, target: &str) -> GuessResult {
    let outcome = find_match(&guesses, target);
    GuessResult {
        round_id: ulid::Ulid::new().to_string(),
        guesses,
        outcome,
    }
}

/// Play a full round: validate the clue, ask the guesser, score.
pub async fn play_round(
    provider: &dyn LlmProvider,
    settings: &GuesserSettings,
    prompt: &Prompt,
    description: &str,
) -> Result<GuessResult, RoundError> {
    validate_clue(prompt, description)?;

    let guesses = request_guesses(provider, settings, description).await?;
    let result = score_round(guesses, &prompt.word);

    tracing::info!(
        round_id = %result.round_id,
        provider = provider.name(),
        correct = result.outcome.is_correct(),
        matched_index = ?result.outcome.matched_index,
        points = result.outcome.points,
        "Round scored"
    );

    Ok(result)
}
