//! Core data models for the tag/filename pipeline.
//!
//! This module contains the `Track` record shared by every tool, the tag
//! maps with their key canonicalization, and the album/artist containers.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::normalize::split_extension;

// ============================================================================
// Tag Keys
// ============================================================================

/// Canonical form of a tag key: lowercase with all whitespace removed.
/// e.g., "Album Artist" → "albumartist"
pub fn canonical_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================================
// Tag Maps
// ============================================================================

/// Original, as-read tag values keyed by canonical tag key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagMap(BTreeMap<String, String>);

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&canonical_key(key)).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(canonical_key(key), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(&canonical_key(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(&canonical_key(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TagMap::new();
        for (k, v) in iter {
            map.insert(k.as_ref(), v);
        }
        map
    }
}

/// A pending edit of one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TagChange {
    /// No proposed change; the original value stands.
    Keep,
    SetTo(String),
    /// The tag is removed from the file on save.
    Delete,
}

/// Pending tag edits not yet written to disk. Only `SetTo`/`Delete` are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProposedTags(BTreeMap<String, TagChange>);

impl ProposedTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> &TagChange {
        self.0.get(&canonical_key(key)).unwrap_or(&TagChange::Keep)
    }

    /// The proposed value, if the key is set to one.
    pub fn value(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            TagChange::SetTo(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(canonical_key(key), TagChange::SetTo(value.into()));
    }

    pub fn delete(&mut self, key: &str) {
        self.0.insert(canonical_key(key), TagChange::Delete);
    }

    /// Apply a change; `Keep` drops any pending edit for the key.
    pub fn apply(&mut self, key: &str, change: TagChange) {
        match change {
            TagChange::Keep => {
                self.0.remove(&canonical_key(key));
            }
            other => {
                self.0.insert(canonical_key(key), other);
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<TagChange> {
        self.0.remove(&canonical_key(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagChange)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Track
// ============================================================================

/// One audio file and its pending edits.
///
/// ## Fields
///
/// - `tags`: the original metadata. Only hidden-tag clearing and saving touch it.
/// - `proposed_tags`: pending edits, merged into `tags` on save.
/// - `clean_title`: title with suffixes and artist stripped; the base for
///   rebuilding both the title tag and the filename.
/// - `suffixes`: canonical bracketed tags such as `[Live]`, duplicate-free and
///   sorted case-insensitively.
/// - `proposed_filename`: pending rename, empty when none is proposed.
/// - `is_manual_rename`: the filename was edited by hand and automatic
///   regeneration must leave it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Track {
    pub path: PathBuf,
    pub filename: String,
    pub tags: TagMap,
    pub proposed_tags: ProposedTags,
    pub clean_title: String,
    pub suffixes: Vec<String>,
    pub proposed_filename: String,
    pub is_manual_rename: bool,
    pub has_error: bool,
    pub has_duplicate: bool,
}

impl Track {
    /// Create a track for `path`; `filename` is taken from the path.
    pub fn new(path: impl Into<PathBuf>, tags: TagMap) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            filename,
            tags,
            ..Self::default()
        }
    }

    /// Value a tag will have after saving: proposed when set, hidden when
    /// deleted, otherwise the original.
    pub fn effective_tag(&self, key: &str) -> Option<&str> {
        match self.proposed_tags.get(key) {
            TagChange::SetTo(v) => Some(v.as_str()),
            TagChange::Delete => None,
            TagChange::Keep => self.tags.get(key),
        }
    }

    /// Concatenated suffix tags, e.g. "[Acoustic][Live]".
    pub fn joined_suffixes(&self) -> String {
        self.suffixes.concat()
    }

    /// Title as displayed: effective title followed by the suffix tags.
    pub fn displayed_title(&self) -> String {
        format!(
            "{}{}",
            self.effective_tag("title").unwrap_or_default(),
            self.joined_suffixes()
        )
    }

    /// Filename the track will have after saving.
    pub fn target_filename(&self) -> &str {
        if self.proposed_filename.is_empty() {
            &self.filename
        } else {
            &self.proposed_filename
        }
    }

    /// Filename without its extension.
    pub fn filename_stem(&self) -> &str {
        split_extension(&self.filename).0
    }

    /// Directory holding the file, the album grouping key.
    pub fn album_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// True when saving would write tags or rename the file.
    pub fn has_pending_changes(&self) -> bool {
        !self.proposed_tags.is_empty()
            || (!self.proposed_filename.is_empty() && self.proposed_filename != self.filename)
    }
}

// ============================================================================
// Containers
// ============================================================================

/// Tracks sharing one directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Album {
    pub name: String,
    pub path: PathBuf,
    pub tracks: Vec<Track>,
}

/// Albums sharing one parent directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Artist {
    pub name: String,
    pub path: PathBuf,
    pub albums: Vec<Album>,
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Group tracks into artist/album containers by directory layout
/// (`<artist>/<album>/<file>`). Artists, albums and tracks are sorted.
pub fn group_library(tracks: Vec<Track>) -> Vec<Artist> {
    let mut albums: FxHashMap<PathBuf, Vec<Track>> = FxHashMap::default();
    for track in tracks {
        albums.entry(track.album_dir().to_path_buf()).or_default().push(track);
    }

    let mut artists: FxHashMap<PathBuf, Vec<Album>> = FxHashMap::default();
    for (album_path, mut album_tracks) in albums {
        album_tracks.sort_by(|a, b| a.filename.cmp(&b.filename));
        let artist_path = album_path.parent().map(Path::to_path_buf).unwrap_or_default();
        artists.entry(artist_path).or_default().push(Album {
            name: dir_name(&album_path),
            path: album_path,
            tracks: album_tracks,
        });
    }

    let mut library: Vec<Artist> = artists
        .into_iter()
        .map(|(path, mut albums)| {
            albums.sort_by(|a, b| a.path.cmp(&b.path));
            Artist {
                name: dir_name(&path),
                path,
                albums,
            }
        })
        .collect();
    library.sort_by(|a, b| a.path.cmp(&b.path));
    library
}

/// Outcome of a batch operation that keeps going after per-track failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Successful tracks, or cleared tags for hidden-tag clearing.
    pub success_count: usize,
    /// One human-readable message per failed track.
    pub errors: Vec<String>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: BatchReport) {
        self.success_count += other.success_count;
        self.errors.extend(other.errors);
    }
}

// ============================================================================
// TESTS
// ============================================================================
