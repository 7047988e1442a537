//! Shared text normalization helpers for titles, artists and filenames.
//! Used by the suffix extractor, the filename generator and every tool.
//!
//! CRITICAL: Any changes here affect both tags and proposed filenames. Run tests after changes.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Any run of whitespace, collapsed to a single space.
pub static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Empty bracket or parenthesis pairs left behind after span removal: "()", "[ ]"
pub static EMPTY_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*\)|\[\s*\]").unwrap());

/// First word character of every word, used for simple title casing.
pub static WORD_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w").unwrap());

/// The alternate apostrophe some taggers write instead of `'` (acute accent, U+00B4).
pub const ALTERNATE_APOSTROPHE: char = '\u{00B4}';

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Replace the alternate apostrophe with the ASCII one.
/// Runs before any other text processing. Idempotent and a no-op on ASCII input.
pub fn normalize_apostrophes(text: &str) -> String {
    text.replace(ALTERNATE_APOSTROPHE, "'")
}

/// Collapse whitespace runs into single spaces and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Strip leading and trailing spaces and dashes: " - Song - " → "Song"
pub fn trim_dashes(text: &str) -> &str {
    text.trim_matches(|c| c == ' ' || c == '-')
}

/// Build a case-insensitive whole-word matcher for a configured word.
/// Returns None for blank words so callers can skip them.
pub fn whole_word_regex(word: &str) -> Option<Regex> {
    let word = word.trim();
    if word.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))).ok()
}

/// Remove every match of each pattern, in order, then collapse whitespace.
pub fn remove_words(text: &str, patterns: &[Regex]) -> String {
    let mut result = text.trim().to_string();
    for pattern in patterns {
        result = pattern.replace_all(&result, "").to_string();
    }
    collapse_whitespace(&result)
}

/// Upper-case the first character of every word, leaving the rest untouched.
/// Word starts follow regex `\b`, so a letter after an apostrophe counts.
/// e.g., "dj snake" → "Dj Snake", "mcDonald" → "McDonald", "don't" → "Don'T"
pub fn capitalize_words(text: &str) -> String {
    WORD_START
        .replace_all(text, |caps: &Captures| caps[0].to_uppercase())
        .to_string()
}

/// Title-case a name: a letter following a non-alphanumeric character (other
/// than an apostrophe) is upper-cased, every other letter is lower-cased.
/// e.g., "JANE doe" → "Jane Doe", "jay-z" → "Jay-Z", "o'neil" → "O'neil"
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = c != '\'';
        }
    }
    out
}

/// Deduplicate (keeping the first occurrence) and sort case-insensitively.
/// The sort is stable, so entries equal ignoring case keep their order.
pub fn dedup_sort_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique.sort_by_key(|s| s.to_lowercase());
    unique
}

/// Split a filename into (stem, extension-with-dot).
/// A leading dot does not start an extension: ".hidden" → (".hidden", "").
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename.split_at(idx),
        _ => (filename, ""),
    }
}

// ============================================================================
// TESTS
// ============================================================================
