//! Pre-save checks: every track needs a title, and no two tracks in one
//! folder may end up with the same filename.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use crate::models::{Album, Track};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    /// Tracks whose effective title is absent or blank.
    pub missing_titles: Vec<PathBuf>,
    /// Target filenames shared by more than one track of a folder.
    pub duplicate_names: Vec<String>,
}

impl Validation {
    pub fn can_save(&self) -> bool {
        self.missing_titles.is_empty() && self.duplicate_names.is_empty()
    }
}

/// Flag tracks whose target filename collides with another track in the same
/// folder. Returns the colliding names, sorted.
pub fn mark_duplicates(tracks: &mut [Track]) -> Vec<String> {
    let mut counts: FxHashMap<(PathBuf, String), usize> = FxHashMap::default();
    for track in tracks.iter() {
        let key = (track.album_dir().to_path_buf(), track.target_filename().to_string());
        *counts.entry(key).or_insert(0) += 1;
    }

    let is_duplicate = |track: &Track| {
        counts
            .get(&(track.album_dir().to_path_buf(), track.target_filename().to_string()))
            .is_some_and(|&n| n > 1)
    };
    for track in tracks.iter_mut() {
        track.has_duplicate = is_duplicate(track);
    }

    let mut names: Vec<String> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|((_, name), _)| name)
        .collect();
    names.sort();
    names.dedup();
    names
}

pub fn validate_tracks(tracks: &mut [Track]) -> Validation {
    let missing_titles = tracks
        .iter()
        .filter(|t| t.effective_tag("title").map_or(true, |title| title.trim().is_empty()))
        .map(|t| t.path.clone())
        .collect();

    Validation {
        missing_titles,
        duplicate_names: mark_duplicates(tracks),
    }
}

pub fn validate_album(album: &mut Album) -> Validation {
    validate_tracks(&mut album.tracks)
}

/// Human-readable problems, one per line item.
pub fn describe(validation: &Validation, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for path in &validation.missing_titles {
        let shown = path.strip_prefix(root).unwrap_or(path);
        lines.push(format!("Missing title: {}", shown.display()));
    }
    for name in &validation.duplicate_names {
        lines.push(format!("Duplicate filename: {}", name));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagMap;

    fn track(path: &str, title: Option<&str>, proposed_filename: &str) -> Track {
        let mut tags = TagMap::new();
        if let Some(title) = title {
            tags.insert("title", title);
        }
        let mut track = Track::new(path, tags);
        track.proposed_filename = proposed_filename.to_string();
        track
    }

    #[test]
    fn test_missing_titles() {
        let mut tracks = vec![
            track("/m/a/1.mp3", Some("One"), ""),
            track("/m/a/2.mp3", None, ""),
            track("/m/a/3.mp3", Some("  "), ""),
            track("/m/a/4.mp3", Some("Four"), ""),
        ];
        tracks[3].proposed_tags.delete("title");

        let v = validate_tracks(&mut tracks);
        assert_eq!(
            v.missing_titles,
            vec![
                PathBuf::from("/m/a/2.mp3"),
                PathBuf::from("/m/a/3.mp3"),
                PathBuf::from("/m/a/4.mp3")
            ]
        );
        assert!(!v.can_save());
    }

    #[test]
    fn test_duplicates_within_folder_only() {
        let mut tracks = vec![
            track("/m/a/1.mp3", Some("T"), "Same.mp3"),
            track("/m/a/2.mp3", Some("T"), "Same.mp3"),
            track("/m/b/3.mp3", Some("T"), "Same.mp3"),
            // Target equals another track's current name
            track("/m/b/Other.mp3", Some("T"), ""),
            track("/m/b/4.mp3", Some("T"), "Other.mp3"),
        ];

        let v = validate_tracks(&mut tracks);

        assert_eq!(v.duplicate_names, vec!["Other.mp3", "Same.mp3"]);
        let flags: Vec<bool> = tracks.iter().map(|t| t.has_duplicate).collect();
        assert_eq!(flags, vec![true, true, false, true, true]);
    }

    #[test]
    fn test_clean_album_can_save() {
        let mut album = Album {
            name: "a".to_string(),
            path: PathBuf::from("/m/a"),
            tracks: vec![track("/m/a/1.mp3", Some("One"), "A - One.mp3")],
        };
        let v = validate_album(&mut album);
        assert!(v.can_save());
        assert!(describe(&v, Path::new("/m")).is_empty());
    }

    #[test]
    fn test_describe() {
        let v = Validation {
            missing_titles: vec![PathBuf::from("/m/a/2.mp3")],
            duplicate_names: vec!["Same.mp3".to_string()],
        };
        assert_eq!(
            describe(&v, Path::new("/m")),
            vec!["Missing title: a/2.mp3", "Duplicate filename: Same.mp3"]
        );
    }
}
