//! Derive titles from filenames.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Track;
use crate::normalize::{capitalize_words, normalize_apostrophes};
use crate::settings::RuleSet;
use crate::suffix::extract_suffixes;

use super::regenerate_unless_manual;

/// Track numbers and other leading noise: "01. ", "3 - ", "(1) "
static LEADING_NON_LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^a-zA-Z]+").unwrap());

/// Use each filename (minus extension and leading non-letters) as the title
/// source: extract suffixes, strip the artist, title-case the rest.
///
/// "01. artist - my song (live).mp3" with artist "Artist" gives
/// "My Song" and `["[Live]"]`.
pub fn name_to_title(tracks: &mut [Track], rules: &RuleSet) {
    for track in tracks.iter_mut() {
        let stem = normalize_apostrophes(track.filename_stem());
        let name = LEADING_NON_LETTERS.replace(&stem, "");

        let artist = track
            .tags
            .get("artist")
            .or_else(|| track.proposed_tags.value("artist"))
            .map(normalize_apostrophes)
            .unwrap_or_default();

        let (clean, suffixes) = extract_suffixes(&name, &artist, rules);
        let title = capitalize_words(&clean.to_lowercase());

        track.proposed_tags.set("title", title.clone());
        track.clean_title = title;
        track.suffixes = suffixes;
        regenerate_unless_manual(track, rules);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagMap;

    #[test]
    fn test_filename_becomes_title() {
        let tags: TagMap = [("artist", "Artist"), ("title", "whatever")].into_iter().collect();
        let mut tracks = vec![Track::new("/m/Artist/A/01. artist - my song (live).mp3", tags)];

        name_to_title(&mut tracks, &RuleSet::default());

        let t = &tracks[0];
        assert_eq!(t.clean_title, "My Song");
        assert_eq!(t.proposed_tags.value("title"), Some("My Song"));
        assert_eq!(t.suffixes, vec!["[Live]"]);
        assert_eq!(t.proposed_filename, "Artist - My Song[Live].mp3");
        // Original tags are untouched
        assert_eq!(t.tags.get("title"), Some("whatever"));
    }

    #[test]
    fn test_proposed_artist_used_when_no_tag() {
        let mut track = Track::new("/m/x/y/Some Band - Hello (feat. ann).flac", TagMap::new());
        track.proposed_tags.set("artist", "Some Band");
        let mut tracks = vec![track];

        name_to_title(&mut tracks, &RuleSet::default());

        assert_eq!(tracks[0].clean_title, "Hello");
        assert_eq!(tracks[0].suffixes, vec!["[Ft. Ann]"]);
    }

    #[test]
    fn test_only_digits_gives_empty_title() {
        let mut tracks = vec![Track::new("/m/a/b/0123.mp3", TagMap::new())];
        name_to_title(&mut tracks, &RuleSet::default());
        assert_eq!(tracks[0].clean_title, "");
        assert_eq!(tracks[0].proposed_filename, "Unknown Artist - .mp3");
    }

    #[test]
    fn test_letter_after_apostrophe_starts_word() {
        let mut tracks = vec![
            Track::new("/m/a/b/02 DON\u{00B4}T STOP.mp3", TagMap::new()),
            Track::new("/m/a/b/01 don't stop.mp3", TagMap::new()),
        ];
        name_to_title(&mut tracks, &RuleSet::empty());
        assert_eq!(tracks[0].clean_title, "Don'T Stop");
        assert_eq!(tracks[1].clean_title, "Don'T Stop");
    }
}
