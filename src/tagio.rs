//! Tag I/O: reading, writing and clearing audio file metadata, plus the save
//! pipeline that writes proposed tags and renames files.
//!
//! All disk access goes through [`MetadataStore`]. [`LoftyStore`] is the real
//! backend; tests use an in-memory store.

use lofty::config::WriteOptions;
use lofty::prelude::*;
use lofty::tag::{ItemKey, ItemValue, Tag};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{canonical_key, BatchReport, TagChange, TagMap, Track};
use crate::normalize::normalize_apostrophes;
use crate::suffix::reconstruct_title;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum TagIoError {
    #[error("File is read-only: {}", .0.display())]
    ReadOnly(PathBuf),

    #[error("Could not read tags from {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("Could not write tags to {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    #[error("Cannot rename, file already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Metadata Store
// ============================================================================

/// Access to the metadata and names of audio files on disk.
pub trait MetadataStore {
    /// Read every text tag, keyed by canonical key. The first value wins when
    /// a key repeats.
    fn read_tags(&self, path: &Path) -> Result<TagMap, TagIoError>;

    /// Apply tag changes; `Keep` entries are ignored.
    fn write_tags(&self, path: &Path, changes: &[(String, TagChange)]) -> Result<(), TagIoError>;

    /// Remove every tag whose canonical key is not kept. Pictures are left
    /// alone. Returns the canonical keys that were removed.
    fn clear_tags_except(
        &self,
        path: &Path,
        keep: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<String>, TagIoError>;

    /// Fails with [`TagIoError::ReadOnly`] when the file cannot be modified.
    fn check_writable(&self, path: &Path) -> Result<(), TagIoError>;

    fn exists(&self, path: &Path) -> bool;

    fn rename(&self, from: &Path, to: &Path) -> Result<(), TagIoError>;
}

/// Canonical name of a lofty item key.
fn item_key_name(key: &ItemKey) -> String {
    let name = match key {
        ItemKey::TrackTitle => "title",
        ItemKey::TrackArtist => "artist",
        ItemKey::AlbumTitle => "album",
        ItemKey::AlbumArtist => "albumartist",
        ItemKey::Genre => "genre",
        ItemKey::RecordingDate => "date",
        ItemKey::Year => "year",
        ItemKey::TrackNumber => "tracknumber",
        ItemKey::DiscNumber => "discnumber",
        ItemKey::Comment => "comment",
        ItemKey::Composer => "composer",
        ItemKey::Lyrics => "lyrics",
        ItemKey::Bpm => "bpm",
        ItemKey::Label => "label",
        ItemKey::Remixer => "remixer",
        ItemKey::Conductor => "conductor",
        ItemKey::Unknown(raw) => return canonical_key(raw),
        other => return canonical_key(&format!("{:?}", other)),
    };
    name.to_string()
}

/// Lofty item key for a canonical tag name. Unrecognized names become
/// format-specific keys.
fn item_key_for(name: &str) -> ItemKey {
    match canonical_key(name).as_str() {
        "title" => ItemKey::TrackTitle,
        "artist" => ItemKey::TrackArtist,
        "album" => ItemKey::AlbumTitle,
        "albumartist" => ItemKey::AlbumArtist,
        "genre" => ItemKey::Genre,
        "date" => ItemKey::RecordingDate,
        "year" => ItemKey::Year,
        "tracknumber" => ItemKey::TrackNumber,
        "discnumber" => ItemKey::DiscNumber,
        "comment" => ItemKey::Comment,
        "composer" => ItemKey::Composer,
        "lyrics" => ItemKey::Lyrics,
        "bpm" => ItemKey::Bpm,
        "label" => ItemKey::Label,
        "remixer" => ItemKey::Remixer,
        "conductor" => ItemKey::Conductor,
        other => ItemKey::Unknown(other.to_uppercase()),
    }
}

/// [`MetadataStore`] backed by lofty and the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyStore;

impl LoftyStore {
    fn open(&self, path: &Path) -> Result<lofty::file::TaggedFile, TagIoError> {
        lofty::read_from_path(path).map_err(|e| TagIoError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl MetadataStore for LoftyStore {
    fn read_tags(&self, path: &Path) -> Result<TagMap, TagIoError> {
        let tagged_file = self.open(path)?;
        let mut tags = TagMap::new();
        let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
            return Ok(tags);
        };

        for item in tag.items() {
            if let ItemValue::Text(value) = item.value() {
                let key = item_key_name(item.key());
                if !tags.contains_key(&key) {
                    tags.insert(&key, value.clone());
                }
            }
        }
        Ok(tags)
    }

    fn write_tags(&self, path: &Path, changes: &[(String, TagChange)]) -> Result<(), TagIoError> {
        self.check_writable(path)?;
        let mut tagged_file = self.open(path)?;
        let tag_type = tagged_file.file_type().primary_tag_type();

        let tag = match tagged_file.tag_mut(tag_type) {
            Some(t) => t,
            None => {
                tagged_file.insert_tag(Tag::new(tag_type));
                tagged_file.tag_mut(tag_type).ok_or_else(|| TagIoError::Write {
                    path: path.to_path_buf(),
                    reason: format!("file does not support {:?} tags", tag_type),
                })?
            }
        };

        for (name, change) in changes {
            match change {
                TagChange::SetTo(value) => {
                    tag.insert_text(item_key_for(name), value.clone());
                }
                TagChange::Delete => tag.remove_key(&item_key_for(name)),
                TagChange::Keep => {}
            }
        }

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| TagIoError::Write {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn clear_tags_except(
        &self,
        path: &Path,
        keep: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<String>, TagIoError> {
        self.check_writable(path)?;
        let mut tagged_file = self.open(path)?;
        let tag_type = tagged_file.file_type().primary_tag_type();
        let Some(tag) = tagged_file.tag_mut(tag_type) else {
            return Ok(Vec::new());
        };

        let mut cleared: Vec<String> = tag
            .items()
            .map(|item| item_key_name(item.key()))
            .filter(|name| !keep(name))
            .collect();
        cleared.sort();
        cleared.dedup();
        if cleared.is_empty() {
            return Ok(cleared);
        }

        tag.retain(|item| keep(&item_key_name(item.key())));
        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| TagIoError::Write {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(cleared)
    }

    fn check_writable(&self, path: &Path) -> Result<(), TagIoError> {
        if fs::metadata(path)?.permissions().readonly() {
            return Err(TagIoError::ReadOnly(path.to_path_buf()));
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), TagIoError> {
        fs::rename(from, to)?;
        Ok(())
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Read a track from disk. Unreadable metadata is logged and yields a track
/// with no tags. Title and artist apostrophes are normalized here, once.
pub fn load_track<S: MetadataStore + ?Sized>(path: &Path, store: &S) -> Track {
    let mut tags = match store.read_tags(path) {
        Ok(tags) => tags,
        Err(e) => {
            log::warn!("{}", e);
            TagMap::new()
        }
    };

    for key in ["title", "artist"] {
        if let Some(value) = tags.get(key) {
            let normalized = normalize_apostrophes(value);
            tags.insert(key, normalized);
        }
    }
    Track::new(path, tags)
}

// ============================================================================
// Saving
// ============================================================================

fn same_path_ignoring_case(a: &Path, b: &Path) -> bool {
    a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}

/// Write a track's pending tag edits and apply its pending rename.
///
/// The title is written as the proposed clean title followed by the suffix
/// tags. On success the edits are merged into `tags`, `proposed_tags` is
/// cleared, and a completed rename resets `proposed_filename` and
/// `is_manual_rename`. On failure the track keeps its pending state.
pub fn save_track_changes<S: MetadataStore + ?Sized>(
    track: &mut Track,
    store: &S,
) -> Result<(), TagIoError> {
    store.check_writable(&track.path)?;

    if !track.proposed_tags.is_empty() {
        let changes: Vec<(String, TagChange)> = track
            .proposed_tags
            .iter()
            .map(|(key, change)| match (key, change) {
                ("title", TagChange::SetTo(title)) => (
                    key.to_string(),
                    TagChange::SetTo(reconstruct_title(title, &track.suffixes)),
                ),
                _ => (key.to_string(), change.clone()),
            })
            .collect();

        store.write_tags(&track.path, &changes)?;

        for (key, change) in changes {
            match change {
                TagChange::SetTo(value) => track.tags.insert(&key, value),
                TagChange::Delete => {
                    track.tags.remove(&key);
                }
                TagChange::Keep => {}
            }
        }
        track.proposed_tags.clear();
    }

    if !track.proposed_filename.is_empty() && track.proposed_filename != track.filename {
        let new_path = track.album_dir().join(&track.proposed_filename);
        // A case-only rename targets the same file on case-insensitive filesystems
        if store.exists(&new_path) && !same_path_ignoring_case(&track.path, &new_path) {
            return Err(TagIoError::DestinationExists(new_path));
        }
        store.rename(&track.path, &new_path)?;
        log::info!("Renamed {} → {}", track.filename, track.proposed_filename);

        track.path = new_path;
        track.filename = std::mem::take(&mut track.proposed_filename);
        track.is_manual_rename = false;
    }

    Ok(())
}

/// Save every track with pending changes, continuing past failures.
/// Sets `has_error` on each attempted track according to its outcome.
pub fn save_changes<S: MetadataStore + ?Sized>(tracks: &mut [Track], store: &S) -> BatchReport {
    let mut report = BatchReport::default();

    for track in tracks.iter_mut().filter(|t| t.has_pending_changes()) {
        match save_track_changes(track, store) {
            Ok(()) => {
                track.has_error = false;
                report.success_count += 1;
            }
            Err(e) => {
                log::error!("{}", e);
                track.has_error = true;
                report.errors.push(e.to_string());
            }
        }
    }

    report
}

// ============================================================================
// In-memory store for tests
// ============================================================================


// ============================================================================
// TESTS
// ============================================================================
