//! Load-time preparation of tracks and discarding of staged edits.

use std::path::Path;

use crate::models::Track;
use crate::settings::RuleSet;
use crate::suffix::{extract_suffixes, reconstruct_title, titles_equivalent};

/// Artist and album names taken from an `<artist>/<album>/<file>` layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderContext {
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl FolderContext {
    pub fn from_track_path(path: &Path) -> Self {
        fn name(dir: &Path) -> Option<String> {
            dir.file_name().map(|n| n.to_string_lossy().into_owned())
        }
        let album_dir = path.parent();
        Self {
            artist: album_dir.and_then(Path::parent).and_then(name),
            album: album_dir.and_then(name),
        }
    }
}

/// Discard every staged edit of a track.
pub fn clear_preview(track: &mut Track) {
    track.proposed_tags.clear();
    track.proposed_filename.clear();
    track.is_manual_rename = false;
    track.has_error = false;
    track.has_duplicate = false;
}

/// Split the stored title into clean title and suffixes, and stage the edits
/// a freshly loaded track needs: folder artist and album when they differ
/// from the tags, and the clean title when it differs from the stored one
/// by more than spacing, brackets or case.
pub fn prepare_track(track: &mut Track, folder: &FolderContext, rules: &RuleSet) {
    let raw_title = track.tags.get("title").unwrap_or_default().to_string();
    let artist = folder
        .artist
        .as_deref()
        .or_else(|| track.tags.get("artist"))
        .unwrap_or_default()
        .to_string();

    let (clean, suffixes) = extract_suffixes(&raw_title, &artist, rules);

    if let Some(folder_artist) = &folder.artist {
        if track.tags.get("artist") != Some(folder_artist.as_str()) {
            track.proposed_tags.set("artist", folder_artist.as_str());
        }
    }
    if let Some(folder_album) = &folder.album {
        if track.tags.get("album") != Some(folder_album.as_str()) {
            track.proposed_tags.set("album", folder_album.as_str());
        }
    }
    if !titles_equivalent(&reconstruct_title(&clean, &suffixes), &raw_title) {
        track.proposed_tags.set("title", clean.as_str());
    }

    track.clean_title = clean;
    track.suffixes = suffixes;
}

/// Throw away staged edits and prepare each track again from its tags.
pub fn revert(tracks: &mut [Track], use_folder_names: bool, rules: &RuleSet) {
    for track in tracks.iter_mut() {
        clear_preview(track);
        let folder = if use_folder_names {
            FolderContext::from_track_path(&track.path)
        } else {
            FolderContext::default()
        };
        prepare_track(track, &folder, rules);
    }
}
