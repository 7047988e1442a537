//! Filename generation from a track's tags, clean title and suffixes.
//!
//! Format: `<artist> - <title><suffix1><suffix2>...<ext>`

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Track;
use crate::normalize::{normalize_apostrophes, split_extension};
use crate::settings::RuleSet;

/// Artist used when a track has no usable artist tag.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Punctuation kept in artist and title; every other non-alphanumeric is dropped.
pub const PERMITTED_PUNCTUATION: &str = " _-()!'&.+@#$%^=;";

/// Characters no filename may contain on any major filesystem.
pub static ILLEGAL_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]"#).unwrap());

/// Turn path separators into dashes: "AC/DC" → "AC-DC", "A / B" → "A-B"
pub fn replace_separators(text: &str) -> String {
    text.replace(" / ", "-")
        .replace(" \\ ", "-")
        .replace('/', "-")
        .replace('\\', "-")
}

/// Keep alphanumerics and permitted punctuation, trim trailing spaces.
pub fn keep_safe_chars(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || PERMITTED_PUNCTUATION.contains(*c))
        .collect();
    kept.trim_end().to_string()
}

/// Remove every character that is illegal in filenames.
pub fn sanitize_filename(name: &str) -> String {
    ILLEGAL_FILENAME_CHARS.replace_all(name, "").to_string()
}

fn strip_removal_words(text: &str, rules: &RuleSet) -> String {
    let mut result = text.to_string();
    for pattern in rules.removal_words() {
        result = pattern.replace_all(&result, "").trim().to_string();
    }
    result
}

fn clean_component(text: &str, rules: &RuleSet) -> String {
    let text = replace_separators(&normalize_apostrophes(text));
    keep_safe_chars(&strip_removal_words(&text, rules))
}

/// Build a filename from its parts. Deterministic and total.
pub fn build_filename(
    artist: &str,
    title: &str,
    suffixes: &[String],
    extension: &str,
    rules: &RuleSet,
) -> String {
    let safe_artist = clean_component(artist, rules);
    let safe_title = clean_component(title, rules);
    let suffixes = suffixes.concat().replace(['/', '\\'], "-");
    sanitize_filename(&format!("{} - {}{}{}", safe_artist, safe_title, suffixes, extension))
}

/// Generate the proposed filename for a track and store it in
/// `proposed_filename`. Does not touch disk and ignores `is_manual_rename`;
/// callers that respect manual renames check the flag first.
///
/// Artist: effective artist tag, or [`UNKNOWN_ARTIST`] when absent or blank.
/// Title: proposed title when set, otherwise `clean_title`.
pub fn generate_filename(track: &mut Track, rules: &RuleSet) -> String {
    let artist = track
        .effective_tag("artist")
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(UNKNOWN_ARTIST);
    let title = track
        .proposed_tags
        .value("title")
        .unwrap_or(track.clean_title.as_str());
    let (_, extension) = split_extension(&track.filename);

    let filename = build_filename(artist, title, &track.suffixes, extension, rules);
    log::debug!("{} → {}", track.filename, filename);
    track.proposed_filename = filename.clone();
    filename
}

/// Regenerate the filename of every track not renamed by hand.
/// Returns how many tracks were regenerated.
pub fn filename_from_tags(tracks: &mut [Track], rules: &RuleSet) -> usize {
    let mut regenerated = 0;
    for track in tracks.iter_mut().filter(|t| !t.is_manual_rename) {
        generate_filename(track, rules);
        regenerated += 1;
    }
    regenerated
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagMap;

    fn track(artist: Option<&str>, clean_title: &str, filename: &str) -> Track {
        let mut tags = TagMap::new();
        if let Some(artist) = artist {
            tags.insert("artist", artist);
        }
        let mut track = Track::new(format!("/music/{}", filename), tags);
        track.clean_title = clean_title.to_string();
        track
    }

    #[test]
    fn test_separator_becomes_dash() {
        let mut t = track(Some("Bad/Name"), "Song", "old.ext");
        assert_eq!(generate_filename(&mut t, &RuleSet::empty()), "Bad-Name - Song.ext");
        assert_eq!(t.proposed_filename, "Bad-Name - Song.ext");
    }

    #[test]
    fn test_spaced_separators() {
        let mut t = track(Some("AC \\ DC"), "Up / Down", "x.mp3");
        assert_eq!(generate_filename(&mut t, &RuleSet::empty()), "AC-DC - Up-Down.mp3");
    }

    #[test]
    fn test_suffixes_appended() {
        let mut t = track(Some("Artist"), "Song", "a.flac");
        t.suffixes = vec!["[Acoustic]".to_string(), "[Ft. A-B, C]".to_string()];
        assert_eq!(
            generate_filename(&mut t, &RuleSet::empty()),
            "Artist - Song[Acoustic][Ft. A-B, C].flac"
        );
    }

    #[test]
    fn test_unknown_artist_fallback() {
        let mut t = track(None, "Song", "a.mp3");
        assert_eq!(generate_filename(&mut t, &RuleSet::empty()), "Unknown Artist - Song.mp3");

        let mut t = track(Some("Someone"), "Song", "a.mp3");
        t.proposed_tags.delete("artist");
        assert_eq!(generate_filename(&mut t, &RuleSet::empty()), "Unknown Artist - Song.mp3");
    }

    #[test]
    fn test_proposed_values_win() {
        let mut t = track(Some("Old"), "Clean", "a.mp3");
        t.proposed_tags.set("artist", "New");
        t.proposed_tags.set("title", "Proposed");
        assert_eq!(generate_filename(&mut t, &RuleSet::empty()), "New - Proposed.mp3");
    }

    #[test]
    fn test_removal_words_and_apostrophes() {
        let rules = RuleSet::new(&["Official", "HD"], &[] as &[(&str, &str)]);
        let mut t = track(Some("Official Band"), "Don\u{00B4}t Stop HD", "a.mp3");
        assert_eq!(generate_filename(&mut t, &rules), "Band - Don't Stop.mp3");
    }

    #[test]
    fn test_disallowed_characters_dropped() {
        let mut t = track(Some("A*B"), "What? \"Why\" <Now>: Yes|No ~", "a.mp3");
        assert_eq!(generate_filename(&mut t, &RuleSet::empty()), "AB - What Why Now YesNo.mp3");
    }

    #[test]
    fn test_never_contains_illegal_chars() {
        let nasty = ["a/b\\c", "x:y*z", "q?\"<>|", "[weird]/(x)", "", "  "];
        for artist in nasty {
            for title in nasty {
                let mut t = track(Some(artist), title, "f.mp3");
                t.suffixes = vec![format!("[{}]", title), "[a:b]".to_string()];
                let name = generate_filename(&mut t, &RuleSet::default());
                assert!(
                    !name.contains(['\\', '/', ':', '*', '?', '"', '<', '>', '|']),
                    "illegal character in {name}"
                );
            }
        }
    }

    #[test]
    fn test_no_extension() {
        let mut t = track(Some("A"), "B", "noext");
        assert_eq!(generate_filename(&mut t, &RuleSet::empty()), "A - B");
    }

    #[test]
    fn test_filename_from_tags_skips_manual() {
        let mut tracks = vec![track(Some("A"), "One", "1.mp3"), track(Some("B"), "Two", "2.mp3")];
        tracks[1].is_manual_rename = true;
        tracks[1].proposed_filename = "Hand Made.mp3".to_string();
        assert_eq!(filename_from_tags(&mut tracks, &RuleSet::empty()), 1);
        assert_eq!(tracks[0].proposed_filename, "A - One.mp3");
        assert_eq!(tracks[1].proposed_filename, "Hand Made.mp3");
    }
}
