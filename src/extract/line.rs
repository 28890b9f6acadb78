//! Structured-line parsing for ranked guesses.
//!
//! Each line goes through three stages: [`tokenize`] recognizes the
//! `[GUESS] <digit>(.|:) <body>` shape, the rank is checked against the
//! accepted range, and [`split_fields`] pulls the word and reasoning out of
//! the body.

use crate::types::Guess;

/// Optional marker word in front of the rank, matched case-insensitively
const MARKER: &str = "guess";

/// Ranks outside this range are ignored, not clamped
const RANKS: std::ops::RangeInclusive<u32> = 1..=3;

/// Markdown noise a model may put in front of a ranked line
const LEADING_NOISE: [char; 5] = ['*', '#', '_', '>', '-'];

const QUOTES: [char; 6] = ['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

const FIELD_SEPARATORS: [char; 4] = ['-', ':', '\u{2013}', '\u{2014}'];

/// A line that has the shape of a ranked guess, before its rank is validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RankedLine<'a> {
    pub rank: u32,
    pub body: &'a str,
}

/// Recognize `[GUESS] <digit>(.|:) <body>` at the start of a line.
pub(crate) fn tokenize(line: &str) -> Option<RankedLine<'_>> {
    let rest = line.trim_start_matches(|c: char| c.is_whitespace() || LEADING_NOISE.contains(&c));
    let rest = strip_marker(rest);

    let mut chars = rest.chars();
    let rank = chars.next()?.to_digit(10)?;

    // "**GUESS 1**: word" closes the bold span before the separator
    let mut chars = chars.as_str().trim_start_matches('*').chars();
    match chars.next()? {
        '.' | ':' => {}
        _ => return None,
    }

    Some(RankedLine {
        rank,
        body: chars.as_str(),
    })
}

fn strip_marker(text: &str) -> &str {
    match text.get(..MARKER.len()) {
        Some(head) if head.eq_ignore_ascii_case(MARKER) => text[MARKER.len()..]
            .trim_start()
            .trim_start_matches('#'),
        _ => text,
    }
}

/// Split a ranked line's body into a cleaned word and its reasoning.
///
/// Returns `None` when nothing is left of the word after cleaning.
pub(crate) fn split_fields(body: &str) -> Option<Guess> {
    let (word, reasoning) = match find_separator(body) {
        Some(idx) => {
            let sep_len = body[idx..].chars().next().map_or(1, char::len_utf8);
            let reasoning = body[idx + sep_len..]
                .trim_start_matches(|c: char| c.is_whitespace() || FIELD_SEPARATORS.contains(&c));
            (&body[..idx], reasoning.trim())
        }
        None => (body, ""),
    };

    let word = clean_word(word);
    if word.is_empty() {
        return None;
    }

    Some(Guess::new(word, reasoning))
}

/// A dash or colon only separates fields when whitespace touches it, so
/// hyphenated answers like "Wabi-sabi" stay whole.
fn find_separator(body: &str) -> Option<usize> {
    let mut prev: Option<char> = None;
    let mut iter = body.char_indices().peekable();

    while let Some((idx, c)) = iter.next() {
        if FIELD_SEPARATORS.contains(&c) {
            let after_space = prev.is_some_and(char::is_whitespace);
            let before_space = iter.peek().is_none_or(|(_, next)| next.is_whitespace());
            if after_space || before_space {
                return Some(idx);
            }
        }
        prev = Some(c);
    }

    None
}

/// Trim, drop bold markup and strip surrounding quotes.
pub(crate) fn clean_word(raw: &str) -> String {
    raw.trim()
        .replace("**", "")
        .trim()
        .trim_matches(|c: char| QUOTES.contains(&c))
        .trim()
        .to_string()
}

/// Parse one line into a guess if it is a well-formed ranked line.
pub(crate) fn parse_line(line: &str) -> Option<Guess> {
    let candidate = tokenize(line)?;
    if !RANKS.contains(&candidate.rank) {
        return None;
    }
    split_fields(candidate.body)
}
