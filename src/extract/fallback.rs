//! Last-resort scan for free-form answers such as "I think it's 'penguin'".

use regex::Regex;
use std::sync::OnceLock;

use crate::types::Guess;

fn intent_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(?:guess|answer|think|believe)[:\s]+["']?([A-Za-z0-9_]+)["']?"#)
            .expect("intent pattern is a valid regex")
    })
}

/// Collect up to `limit` single-word guesses that follow an intent marker,
/// in order of appearance. Reasoning is always empty.
pub(crate) fn scan(text: &str, limit: usize) -> Vec<Guess> {
    intent_pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .take(limit)
        .map(|word| Guess::new(word.as_str(), ""))
        .collect()
}
