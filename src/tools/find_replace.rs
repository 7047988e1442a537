//! Literal find/replace over displayed titles, followed by re-extraction.

use crate::models::Track;
use crate::normalize::{collapse_whitespace, normalize_apostrophes, trim_dashes};
use crate::settings::RuleSet;
use crate::suffix::extract_suffixes;

use super::regenerate_unless_manual;

/// Replace every occurrence of `find` in each track's displayed title
/// (effective title plus suffix tags), then split the result again into a
/// clean title and suffixes. Returns how many tracks changed.
///
/// Suffix tags are recomputed from the rewritten text alone: a former suffix
/// the current rules no longer recognize is dropped rather than left in the
/// title. An empty `find` changes nothing.
pub fn find_replace_in_title(
    tracks: &mut [Track],
    find: &str,
    replace: &str,
    rules: &RuleSet,
) -> usize {
    if find.is_empty() {
        return 0;
    }

    let mut changed = 0;
    for track in tracks.iter_mut() {
        let title = normalize_apostrophes(track.effective_tag("title").unwrap_or_default());
        let displayed = format!("{}{}", title, track.joined_suffixes());
        if !displayed.contains(find) {
            continue;
        }

        let rewritten = displayed.replace(find, replace);
        let artist = track.effective_tag("artist").unwrap_or_default().to_string();
        let (mut clean, suffixes) = extract_suffixes(&rewritten, &artist, rules);

        for stale in track.suffixes.iter().filter(|s| !suffixes.contains(s)) {
            clean = clean.replace(stale.as_str(), "");
        }
        let clean = trim_dashes(&collapse_whitespace(&clean)).to_string();

        log::debug!("{} → {} {:?}", displayed, clean, suffixes);
        track.proposed_tags.set("title", clean.clone());
        track.clean_title = clean;
        track.suffixes = suffixes;
        regenerate_unless_manual(track, rules);
        changed += 1;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagMap;

    fn track(title: &str, suffixes: &[&str]) -> Track {
        let tags: TagMap = [("artist", "Band"), ("title", title)].into_iter().collect();
        let mut track = Track::new("/m/Band/Album/x.mp3", tags);
        track.clean_title = title.to_string();
        track.suffixes = suffixes.iter().map(|s| s.to_string()).collect();
        track
    }

    #[test]
    fn test_replacement_reextracts_suffixes() {
        let rules = RuleSet::new(&[] as &[&str], &[("acoustic", "[Acoustic]")]);
        let mut tracks = vec![track("Song", &["[Live]"])];

        assert_eq!(find_replace_in_title(&mut tracks, "Song", "Tune (Acoustic)", &rules), 1);

        let t = &tracks[0];
        assert_eq!(t.clean_title, "Tune");
        assert_eq!(t.proposed_tags.value("title"), Some("Tune"));
        assert_eq!(t.suffixes, vec!["[Acoustic]"]);
        assert_eq!(t.proposed_filename, "Band - Tune[Acoustic].mp3");
    }

    #[test]
    fn test_recognized_suffixes_survive() {
        let rules = RuleSet::default();
        let mut tracks = vec![track("Old Song", &["[Live]"])];
        find_replace_in_title(&mut tracks, "Old", "New", &rules);
        assert_eq!(tracks[0].clean_title, "New Song");
        assert_eq!(tracks[0].suffixes, vec!["[Live]"]);
    }

    #[test]
    fn test_replace_inside_suffix() {
        let rules = RuleSet::default();
        let mut tracks = vec![track("Song", &["[Live]"])];
        find_replace_in_title(&mut tracks, "[Live]", "(Demo)", &rules);
        assert_eq!(tracks[0].clean_title, "Song");
        assert_eq!(tracks[0].suffixes, vec!["[Demo]"]);
    }

    #[test]
    fn test_no_match_and_empty_find() {
        let rules = RuleSet::default();
        let mut tracks = vec![track("Song", &[])];
        assert_eq!(find_replace_in_title(&mut tracks, "Nope", "X", &rules), 0);
        assert_eq!(find_replace_in_title(&mut tracks, "", "X", &rules), 0);
        assert!(tracks[0].proposed_tags.is_empty());
        assert!(tracks[0].proposed_filename.is_empty());
    }

    #[test]
    fn test_manual_filename_kept() {
        let rules = RuleSet::default();
        let mut tracks = vec![track("Song", &[])];
        tracks[0].is_manual_rename = true;
        tracks[0].proposed_filename = "Keep Me.mp3".to_string();
        find_replace_in_title(&mut tracks, "Song", "Tune", &rules);
        assert_eq!(tracks[0].proposed_tags.value("title"), Some("Tune"));
        assert_eq!(tracks[0].proposed_filename, "Keep Me.mp3");
    }
}
