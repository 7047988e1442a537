//! Single-track manual edits.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::filename::sanitize_filename;
use crate::models::{canonical_key, TagChange, Track};
use crate::normalize::{dedup_sort_case_insensitive, normalize_apostrophes};
use crate::settings::RuleSet;

use super::regenerate_unless_manual;

static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

/// Set a hand-written filename. Automatic regeneration leaves it alone until
/// the file is saved or the preview reverted. A blank name clears the rename.
pub fn set_manual_filename(track: &mut Track, filename: &str) {
    let filename = sanitize_filename(filename.trim());
    if filename.is_empty() {
        track.proposed_filename.clear();
        track.is_manual_rename = false;
    } else {
        track.proposed_filename = filename;
        track.is_manual_rename = true;
    }
}

/// Set the title as typed; it becomes the clean title as well.
pub fn set_title(track: &mut Track, title: &str, rules: &RuleSet) {
    let title = normalize_apostrophes(title.trim());
    track.proposed_tags.set("title", title.clone());
    track.clean_title = title;
    regenerate_unless_manual(track, rules);
}

/// Parse an edited suffix list: bracketed tags ("[Live][Ft. A, B]") when
/// any are present, otherwise comma-separated words ("Live, Demo").
pub fn parse_suffix_list(text: &str) -> Vec<String> {
    let bracketed: Vec<String> = BRACKETED
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|s| s.len() > 2)
        .collect();
    if !bracketed.is_empty() {
        return dedup_sort_case_insensitive(bracketed);
    }

    let words = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("[{}]", s))
        .collect();
    dedup_sort_case_insensitive(words)
}

pub fn set_suffixes(track: &mut Track, text: &str, rules: &RuleSet) {
    track.suffixes = parse_suffix_list(text);
    regenerate_unless_manual(track, rules);
}

/// Stage a change to any tag. Title edits go through [`set_title`]; artist
/// edits regenerate the filename.
pub fn set_tag(track: &mut Track, key: &str, change: TagChange, rules: &RuleSet) {
    let key = canonical_key(key);
    match (key.as_str(), change) {
        ("title", TagChange::SetTo(title)) => set_title(track, &title, rules),
        (key, change) => {
            track.proposed_tags.apply(key, change);
            if key == "artist" || key == "title" {
                regenerate_unless_manual(track, rules);
            }
        }
    }
}
