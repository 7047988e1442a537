//! Parse "Artist - Title" filenames back into tags.

use crate::models::Track;
use crate::normalize::split_extension;

/// Stage artist and title tags parsed from each filename.
///
/// The pending filename is used when one differs from the current name.
/// Splits on the first " - "; without one the whole stem becomes the title.
/// The filename is treated as tag-derived again afterwards.
pub fn tags_from_filename(tracks: &mut [Track]) {
    for track in tracks.iter_mut() {
        let source = if !track.proposed_filename.is_empty()
            && track.proposed_filename != track.filename
        {
            &track.proposed_filename
        } else {
            &track.filename
        };
        let stem = split_extension(source).0.to_string();

        match stem.split_once(" - ") {
            Some((artist, title)) => {
                track.proposed_tags.set("artist", artist.trim());
                track.proposed_tags.set("title", title.trim());
            }
            None => track.proposed_tags.set("title", stem.trim()),
        }
        track.is_manual_rename = false;
    }
}
