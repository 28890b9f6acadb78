//! Turns a model's free-text reply into an ordered list of guesses.
//!
//! Ranked lines (`GUESS 1: word - reasoning`) are preferred. Only when no
//! line qualifies does the extractor fall back to scanning for words after
//! intent markers like "I think". Either way the result holds at most
//! [`MAX_GUESSES`] entries, in the order they appear in the text.

mod fallback;
mod line;

use crate::types::Guess;

/// Number of ranked guesses a round is scored on
pub const MAX_GUESSES: usize = 3;

/// Placeholder used to pad a short guess list
pub const NO_GUESS_WORD: &str = "[No guess]";
pub const NO_GUESS_REASONING: &str = "Could not parse response";

/// Extract up to three guesses from a raw model response.
///
/// Guesses keep document order even when the model numbers them out of
/// order. Never fails; an unparseable response yields an empty list.
pub fn extract_guesses(raw: &str) -> Vec<Guess> {
    let ranked: Vec<Guess> = raw
        .lines()
        .filter_map(line::parse_line)
        .take(MAX_GUESSES)
        .collect();

    if !ranked.is_empty() {
        return ranked;
    }

    let fallback = fallback::scan(raw, MAX_GUESSES);
    if !fallback.is_empty() {
        tracing::debug!(
            "No ranked guess lines found, recovered {} guess(es) from prose",
            fallback.len()
        );
    }
    fallback
}

/// The sentinel guess shown in place of a missing one. It never matches.
pub fn no_guess() -> Guess {
    Guess::new(NO_GUESS_WORD, NO_GUESS_REASONING)
}

/// Truncate or pad a guess list to exactly [`MAX_GUESSES`] entries.
pub fn pad_guesses(mut guesses: Vec<Guess>) -> Vec<Guess> {
    guesses.truncate(MAX_GUESSES);
    guesses.resize_with(MAX_GUESSES, no_guess);
    guesses
}
