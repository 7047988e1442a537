//! Camel-case titles, keeping Roman numerals upper-case.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::models::Track;
use crate::normalize::normalize_apostrophes;
use crate::settings::RuleSet;

use super::regenerate_unless_manual;

/// Lowercase Roman numerals written fully upper-case. I, V and X are left out
/// because they collide with ordinary words ("I", "x").
const ROMAN_NUMERALS: &[&str] = &[
    "ii", "iii", "iv", "vii", "viii", "ix", "xi", "xii", "xiii", "xiv", "xvi", "xvii", "xviii",
];

/// A word, apostrophes included: "don't", "rock’n’roll"
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[\w'\u{2019}]+").unwrap());

fn capitalize_word(word: &str) -> String {
    let head_len = word.find(['\'', '\u{2019}']).unwrap_or(word.len());
    let (head, tail) = word.split_at(head_len);
    if ROMAN_NUMERALS.contains(&head) {
        return format!("{}{}", head.to_uppercase(), tail);
    }

    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "part ii: REBIRTH" → "Part II: Rebirth"
pub fn camel_case_title(title: &str) -> String {
    let lowered = normalize_apostrophes(title).to_lowercase();
    WORD.replace_all(&lowered, |caps: &Captures| capitalize_word(&caps[0]))
        .to_string()
}

/// Camel-case the clean title (or the effective title when there is none)
/// and stage it as the new title. Tracks without any title are skipped.
pub fn camel_case(tracks: &mut [Track], rules: &RuleSet) {
    for track in tracks.iter_mut() {
        let source = if track.clean_title.is_empty() {
            track.effective_tag("title").unwrap_or_default().to_string()
        } else {
            track.clean_title.clone()
        };
        if source.is_empty() {
            continue;
        }

        let title = camel_case_title(&source);
        track.proposed_tags.set("title", title.clone());
        track.clean_title = title;
        regenerate_unless_manual(track, rules);
    }
}
