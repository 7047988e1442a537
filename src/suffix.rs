//! Suffix extraction: turns bracketed title annotations into canonical tags.
//!
//! "Song (feat. a & b) [Live]" → ("Song", ["[Ft. A, B]", "[Live]"])
//!
//! Every `(...)` / `[...]` span is cleaned of denylist words and classified by
//! all recognizers (featuring, remix, keyword mappings). A span that yields
//! tags, or that is left empty by the denylist, is removed from the title;
//! any other span is free text and stays.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::{
    capitalize_words, collapse_whitespace, dedup_sort_case_insensitive, remove_words, title_case,
    trim_dashes, EMPTY_BRACKETS,
};
use crate::settings::RuleSet;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// A bracketed or parenthesized span; content stops at the first closer.
pub static SUFFIX_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\(\[](?P<content>[^)\]]+)[\)\]]").unwrap());

/// Featuring credit: "feat. A & B", "ft B", "featuring C"
pub static FEATURING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:feat|ft|featuring)\b\.?(?P<names>.*)").unwrap());

/// Remix credit: "Skrillex Remix", "rmx", "R3M1X"
pub static REMIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?P<remixer>.*)(?:remix|r3m1x|rmx)").unwrap());

/// Separators between credited names: "A & B", "A and B"
pub static NAME_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*&\s*|\s+and\s+").unwrap());

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Reformat credited names: split on `&`/`and`/`,`, title-case each name.
/// e.g., "john smith & JANE DOE" → "John Smith, Jane Doe"
pub fn format_artist_names(names: &str) -> String {
    let joined = NAME_SEPARATOR.replace_all(names, ", ");
    joined
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| title_case(&collapse_whitespace(name)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Tags recognized in one span's cleaned content, in recognizer order.
/// All recognizers run; a span can yield several tags.
pub fn classify_span(content: &str, rules: &RuleSet) -> Vec<String> {
    let mut found = Vec::new();

    if let Some(caps) = FEATURING.captures(content) {
        let names = format_artist_names(caps["names"].trim());
        if !names.is_empty() {
            found.push(format!("[Ft. {}]", names));
        }
    }

    if let Some(caps) = REMIX.captures(content) {
        let remixer = capitalize_words(caps["remixer"].trim());
        if remixer.is_empty() {
            found.push("[Remix]".to_string());
        } else {
            found.push(format!("[{} Remix]", remixer));
        }
    }

    for mapping in rules.tag_mappings() {
        if mapping.pattern.is_match(content) {
            found.push(mapping.tag.clone());
        }
    }

    found
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Split a title into its clean form and canonical suffix tags.
///
/// Returns `(clean_title, suffixes)`; suffixes are duplicate-free and sorted
/// case-insensitively. A non-empty `artist` is removed from the title
/// (case-insensitive, literal). Never fails: unbalanced brackets are
/// treated as plain text, and an empty clean title is allowed.
pub fn extract_suffixes(title: &str, artist: &str, rules: &RuleSet) -> (String, Vec<String>) {
    let mut suffixes: Vec<String> = Vec::new();
    let mut spans_to_remove: Vec<&str> = Vec::new();

    for caps in SUFFIX_SPAN.captures_iter(title) {
        let span = caps.get(0).map_or("", |m| m.as_str());
        let cleaned = remove_words(&caps["content"], rules.removal_words());

        let found = classify_span(&cleaned, rules);
        if !found.is_empty() {
            log::debug!("Span '{}' → {:?}", span, found);
            suffixes.extend(found);
            spans_to_remove.push(span);
        } else if cleaned.is_empty() {
            // Only denylisted words
            spans_to_remove.push(span);
        }
    }

    // Literal removal so span text is never re-read as a pattern
    let mut clean_title = title.to_string();
    for span in spans_to_remove {
        clean_title = clean_title.replace(span, "");
    }

    if !artist.trim().is_empty() {
        if let Ok(artist_re) = Regex::new(&format!("(?i){}", regex::escape(artist))) {
            clean_title = artist_re.replace_all(&clean_title, "").to_string();
        }
    }

    clean_title = EMPTY_BRACKETS.replace_all(&clean_title, "").to_string();
    clean_title = trim_dashes(&collapse_whitespace(&clean_title)).to_string();

    (clean_title, dedup_sort_case_insensitive(suffixes))
}

/// Rebuild a full title from its clean form and suffix tags.
pub fn reconstruct_title(clean_title: &str, suffixes: &[String]) -> String {
    format!("{}{}", clean_title, suffixes.concat())
}

/// Compare two titles ignoring whitespace, brackets and case.
/// Used to decide whether a cleaned title is worth proposing at all.
pub fn titles_equivalent(a: &str, b: &str) -> bool {
    fn squash(s: &str) -> String {
        s.chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '[' | ']' | '(' | ')'))
            .flat_map(char::to_lowercase)
            .collect()
    }
    squash(a) == squash(b)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_TAG_MAPPINGS;

    fn mappings() -> RuleSet {
        RuleSet::new(&["Official Video"], &[("acoustic", "[Acoustic]"), ("live", "[Live]")])
    }

    #[test]
    fn test_featuring_credit() {
        let (title, suffixes) = extract_suffixes(
            "Song Title (feat. John Smith & Jane Doe)",
            "",
            &RuleSet::empty(),
        );
        assert_eq!(title, "Song Title");
        assert_eq!(suffixes, vec!["[Ft. John Smith, Jane Doe]"]);
    }

    #[test]
    fn test_featuring_variants() {
        let rules = RuleSet::empty();
        assert_eq!(
            extract_suffixes("A [ft bob and ALICE]", "", &rules).1,
            vec!["[Ft. Bob, Alice]"]
        );
        assert_eq!(
            extract_suffixes("A (Featuring X, Y & Z)", "", &rules).1,
            vec!["[Ft. X, Y, Z]"]
        );
        // "ft" inside a word is not a credit
        let (title, suffixes) = extract_suffixes("A (Left Behind)", "", &rules);
        assert_eq!(title, "A (Left Behind)");
        assert!(suffixes.is_empty());
    }

    #[test]
    fn test_denylisted_span_is_removed() {
        let (title, suffixes) = extract_suffixes("Track (Official Video)", "", &mappings());
        assert_eq!(title, "Track");
        assert!(suffixes.is_empty());
    }

    #[test]
    fn test_free_text_span_is_kept() {
        let (title, suffixes) = extract_suffixes("Track (Part One)", "", &mappings());
        assert_eq!(title, "Track (Part One)");
        assert!(suffixes.is_empty());
    }

    #[test]
    fn test_keyword_mappings_sorted() {
        let (title, suffixes) = extract_suffixes("Track (Live) (Acoustic)", "", &mappings());
        assert_eq!(title, "Track");
        assert_eq!(suffixes, vec!["[Acoustic]", "[Live]"]);

        let (title, suffixes) = extract_suffixes("Track (Acoustic) (Live)", "", &mappings());
        assert_eq!(title, "Track");
        assert_eq!(suffixes, vec!["[Acoustic]", "[Live]"]);
    }

    #[test]
    fn test_one_span_many_tags() {
        let (title, suffixes) = extract_suffixes("Track [Live Acoustic]", "", &mappings());
        assert_eq!(title, "Track");
        assert_eq!(suffixes, vec!["[Acoustic]", "[Live]"]);
    }

    #[test]
    fn test_remix_credit() {
        let rules = RuleSet::empty();
        assert_eq!(
            extract_suffixes("Song (skrillex remix)", "", &rules),
            ("Song".to_string(), vec!["[Skrillex Remix]".to_string()])
        );
        assert_eq!(extract_suffixes("Song [RMX]", "", &rules).1, vec!["[Remix]"]);
        assert_eq!(extract_suffixes("Song (R3M1X)", "", &rules).1, vec!["[Remix]"]);
        // Remixer words are cased at every word boundary
        assert_eq!(extract_suffixes("Song (don't remix)", "", &rules).1, vec!["[Don'T Remix]"]);
    }

    #[test]
    fn test_feat_and_remix_in_one_span() {
        let (title, suffixes) =
            extract_suffixes("Song (DJ Mike Remix) (feat. Ann)", "", &RuleSet::empty());
        assert_eq!(title, "Song");
        assert_eq!(suffixes, vec!["[DJ Mike Remix]", "[Ft. Ann]"]);
    }

    #[test]
    fn test_duplicates_removed() {
        let (_, suffixes) = extract_suffixes("Song (Live) [live]", "", &mappings());
        assert_eq!(suffixes, vec!["[Live]"]);
    }

    #[test]
    fn test_artist_removed_from_title() {
        let (title, _) = extract_suffixes("Daft Punk - One More Time", "daft punk", &mappings());
        assert_eq!(title, "One More Time");
        // Blank artist is ignored
        let (title, _) = extract_suffixes("One More Time", "  ", &mappings());
        assert_eq!(title, "One More Time");
    }

    #[test]
    fn test_unbalanced_brackets_treated_literally() {
        let (title, suffixes) = extract_suffixes("Song (Live", "", &mappings());
        assert_eq!(title, "Song (Live");
        assert!(suffixes.is_empty());
    }

    #[test]
    fn test_title_can_become_empty() {
        let (title, suffixes) = extract_suffixes("(Live)", "", &mappings());
        assert_eq!(title, "");
        assert_eq!(suffixes, vec!["[Live]"]);
    }

    #[test]
    fn test_default_rules() {
        let rules = RuleSet::default();
        let (title, suffixes) =
            extract_suffixes("Hello (Official Music Video) [HD] (Piano Version)", "", &rules);
        assert_eq!(title, "Hello");
        assert_eq!(suffixes, vec!["[Piano]"]);
        assert_eq!(rules.tag_mappings().len(), DEFAULT_TAG_MAPPINGS.len());
    }

    #[test]
    fn test_reextracting_output_keeps_suffix_set() {
        let rules = RuleSet::default();
        let titles = [
            "Song Title (feat. John Smith & Jane Doe)",
            "Track (Acoustic) (Live) [Demo]",
            "Song (Skrillex Remix) (Instrumental)",
            "Tune (Vocal Cover) (Official Audio)",
            "Plain Title",
            "Song (ft. Olive Tree)",
        ];
        for original in titles {
            let (clean, suffixes) = extract_suffixes(original, "", &rules);
            let rebuilt = reconstruct_title(&clean, &suffixes);
            let (clean_again, suffixes_again) = extract_suffixes(&rebuilt, "", &rules);
            assert_eq!(clean_again, clean, "clean title drifted for {original}");
            assert_eq!(suffixes_again, suffixes, "suffixes drifted for {original}");
        }
    }

    #[test]
    fn test_suffixes_sorted_and_unique() {
        let rules = RuleSet::default();
        let (_, suffixes) =
            extract_suffixes("X (live) (Demo) (acoustic) (LIVE) (zed remix)", "", &rules);
        let mut expected = suffixes.clone();
        expected.sort_by_key(|s| s.to_lowercase());
        expected.dedup();
        assert_eq!(suffixes, expected);
    }

    #[test]
    fn test_titles_equivalent() {
        assert!(titles_equivalent("Song (Live)", "song[live]"));
        assert!(!titles_equivalent("Song", "Songs"));
    }

    #[test]
    fn test_format_artist_names() {
        assert_eq!(format_artist_names("john smith & JANE DOE"), "John Smith, Jane Doe");
        assert_eq!(format_artist_names("a, , b"), "A, B");
        assert_eq!(format_artist_names(""), "");
    }
}
