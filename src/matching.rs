//! Deciding whether a guess names the target, and scoring the first hit.
//!
//! Matching is deliberately generous: after normalization a guess counts if
//! it equals the target or either one contains the other. "Elephants" and
//! "big elephant" both hit "Elephant"; the flip side is that short targets
//! can be hit by unrelated longer words ("Art" in "smart").

use crate::extract::{MAX_GUESSES, NO_GUESS_WORD};
use crate::types::{Guess, MatchOutcome};

/// Points for a hit at rank 1, 2 and 3
pub const POINTS: [u32; MAX_GUESSES] = [100, 75, 50];

/// Lowercase, keep only ASCII letters, digits and whitespace, then trim.
///
/// Internal whitespace is kept as is. Normalizing twice gives the same
/// result as normalizing once.
pub fn normalize(word: &str) -> String {
    let kept: String = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    kept.trim().to_string()
}

/// Whether `guess` should be treated as the same concept as `target`.
///
/// A guess or target with nothing left after normalization never matches,
/// otherwise the empty string would be contained in every target.
pub fn is_match(guess: &str, target: &str) -> bool {
    let guess = normalize(guess);
    let target = normalize(target);

    if guess.is_empty() || target.is_empty() {
        return false;
    }

    guess == target || guess.contains(&target) || target.contains(&guess)
}

/// Score an ordered guess list against the target.
///
/// The first matching guess wins; only the first [`MAX_GUESSES`] entries are
/// considered. Padding placeholders never score, even against a target like
/// "Guess" that their text happens to contain.
pub fn find_match(guesses: &[Guess], target: &str) -> MatchOutcome {
    guesses
        .iter()
        .take(MAX_GUESSES)
        .position(|guess| guess.word != NO_GUESS_WORD && is_match(&guess.word, target))
        .map(|index| MatchOutcome {
            matched_index: Some(index),
            points: POINTS[index],
        })
        .unwrap_or_else(MatchOutcome::miss)
}
