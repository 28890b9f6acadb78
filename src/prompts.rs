//! Built-in prompt catalog and clue validation.

use rand::seq::SliceRandom;
use regex::Regex;

use crate::types::Difficulty::{self, Easy, Hard, Medium};
use crate::types::Prompt;

/// Secret word, its five forbidden words, and difficulty
type CatalogEntry = (&'static str, [&'static str; 5], Difficulty);

const CATALOG: [CatalogEntry; 60] = [
    ("Elephant", ["animal", "trunk", "big", "gray", "tusks"], Easy),
    ("Pizza", ["food", "cheese", "Italian", "round", "slice"], Easy),
    ("Guitar", ["music", "instrument", "strings", "play", "band"], Easy),
    ("Beach", ["sand", "ocean", "water", "waves", "summer"], Easy),
    ("Rainbow", ["colors", "rain", "sky", "arc", "spectrum"], Easy),
    ("Bicycle", ["wheels", "ride", "pedal", "bike", "transport"], Easy),
    ("Coffee", ["drink", "caffeine", "morning", "beans", "cup"], Easy),
    ("Library", ["books", "read", "quiet", "borrow", "shelves"], Easy),
    ("Snowman", ["winter", "snow", "cold", "carrot", "frozen"], Easy),
    ("Birthday", ["cake", "party", "age", "celebrate", "candles"], Easy),
    ("Umbrella", ["rain", "wet", "cover", "handle", "protection"], Easy),
    ("Telescope", ["stars", "see", "space", "lens", "astronomy"], Easy),
    ("Volcano", ["lava", "erupt", "mountain", "hot", "ash"], Easy),
    ("Penguin", ["bird", "ice", "Antarctica", "waddle", "tuxedo"], Easy),
    ("Keyboard", ["type", "keys", "computer", "letters", "buttons"], Easy),
    ("Toothbrush", ["teeth", "clean", "bristles", "mouth", "dental"], Easy),
    ("Hammock", ["swing", "relax", "sleep", "hang", "fabric"], Easy),
    ("Lighthouse", ["light", "ships", "coast", "tower", "beacon"], Easy),
    ("Popcorn", ["movies", "kernel", "butter", "snack", "pop"], Easy),
    ("Skateboard", ["wheels", "ride", "tricks", "board", "skate"], Easy),
    ("Jealousy", ["envy", "green", "want", "feeling", "emotion"], Medium),
    ("Democracy", ["vote", "government", "election", "people", "freedom"], Medium),
    ("Procrastination", ["delay", "later", "avoid", "postpone", "lazy"], Medium),
    ("Gravity", ["fall", "weight", "force", "Newton", "pull"], Medium),
    ("Sarcasm", ["irony", "joke", "mean", "opposite", "tone"], Medium),
    ("Debugging", ["code", "error", "fix", "bug", "programming"], Medium),
    ("Nostalgia", ["memory", "past", "old", "remember", "longing"], Medium),
    ("Ecosystem", ["nature", "environment", "animals", "plants", "balance"], Medium),
    ("Encryption", ["code", "secret", "security", "password", "hide"], Medium),
    ("Metabolism", ["body", "energy", "food", "burn", "calories"], Medium),
    ("Irony", ["opposite", "expect", "sarcasm", "meaning", "literal"], Medium),
    ("Paradox", ["contradiction", "logic", "impossible", "true", "false"], Medium),
    ("Intuition", ["gut", "feeling", "instinct", "sense", "know"], Medium),
    ("Empathy", ["feel", "understand", "emotion", "others", "sympathy"], Medium),
    ("Bureaucracy", ["government", "rules", "paperwork", "slow", "official"], Medium),
    ("Algorithm", ["computer", "steps", "code", "math", "process"], Medium),
    ("Placebo", ["medicine", "fake", "effect", "sugar", "pill"], Medium),
    ("Photosynthesis", ["plant", "sun", "light", "energy", "chlorophyll"], Medium),
    ("Capitalism", ["money", "market", "profit", "business", "economy"], Medium),
    ("Meditation", ["mind", "calm", "breathe", "relax", "focus"], Medium),
    ("Schadenfreude", ["German", "pleasure", "pain", "happy", "misfortune"], Hard),
    ("Liminal", ["space", "threshold", "between", "transition", "boundary"], Hard),
    ("Zeitgeist", ["spirit", "time", "era", "culture", "mood"], Hard),
    ("Serendipity", ["luck", "accident", "discover", "chance", "happy"], Hard),
    ("Uncanny", ["strange", "familiar", "creepy", "weird", "valley"], Hard),
    ("Catharsis", ["release", "emotion", "purge", "relief", "drama"], Hard),
    ("Ephemeral", ["temporary", "brief", "short", "fleeting", "lasting"], Hard),
    ("Cognitive dissonance", ["belief", "conflict", "contradiction", "mind", "psychology"], Hard),
    ("Simulacrum", ["copy", "fake", "real", "image", "representation"], Hard),
    ("Kaizen", ["Japanese", "improve", "continuous", "better", "progress"], Hard),
    ("Solipsism", ["self", "exist", "mind", "real", "philosophy"], Hard),
    ("Hegemony", ["power", "dominant", "control", "influence", "authority"], Hard),
    ("Qualia", ["experience", "subjective", "conscious", "feel", "sensation"], Hard),
    ("Sonder", ["people", "lives", "stranger", "realize", "complex"], Hard),
    ("Defenestration", ["window", "throw", "out", "fall", "building"], Hard),
    ("Petrichor", ["rain", "smell", "earth", "wet", "scent"], Hard),
    ("Hygge", ["cozy", "Danish", "comfort", "warm", "atmosphere"], Hard),
    ("Wabi-sabi", ["imperfect", "beauty", "Japanese", "nature", "aesthetic"], Hard),
    ("Tsundoku", ["books", "unread", "pile", "collect", "Japanese"], Hard),
    ("Mamihlapinatapai", ["look", "eyes", "want", "unspoken", "mutual"], Hard),
];

/// The full prompt pool in catalog order
pub fn prompt_pool() -> Vec<Prompt> {
    CATALOG
        .iter()
        .map(|(word, forbidden, difficulty)| Prompt {
            word: word.to_string(),
            forbidden_words: forbidden.iter().map(|w| w.to_string()).collect(),
            difficulty: *difficulty,
        })
        .collect()
}

/// A freshly shuffled copy of the pool, optionally limited to one difficulty
pub fn shuffled_prompts(difficulty: Option<Difficulty>) -> Vec<Prompt> {
    let mut prompts: Vec<Prompt> = prompt_pool()
        .into_iter()
        .filter(|p| difficulty.is_none_or(|d| p.difficulty == d))
        .collect();
    prompts.shuffle(&mut rand::rng());
    prompts
}

/// Words in `clue` that the describer was not allowed to use.
///
/// Forbidden words are caught anywhere in the clue, case-insensitively, so
/// "rainy" trips "rain". The secret word itself only counts as a whole word.
/// Each violation is reported once, in the order it was found. Blank entries
/// never match anything.
pub fn forbidden_violations(prompt: &Prompt, clue: &str) -> Vec<String> {
    let lowered = clue.to_lowercase();
    let mut violations: Vec<String> = Vec::new();

    for word in &prompt.forbidden_words {
        let needle = word.trim().to_lowercase();
        if needle.is_empty() {
            continue;
        }
        if lowered.contains(&needle) && !violations.contains(word) {
            violations.push(word.clone());
        }
    }

    let word = prompt.word.trim();
    if word.is_empty() {
        return violations;
    }

    let secret = format!(r"(?i)\b{}\b", regex::escape(word));
    match Regex::new(&secret) {
        Ok(re) => {
            if re.is_match(clue) && !violations.contains(&prompt.word) {
                violations.push(prompt.word.clone());
            }
        }
        Err(e) => tracing::warn!("Could not build secret word pattern for {}: {}", prompt.word, e),
    }

    violations
}
