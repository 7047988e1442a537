//! Strip every tag that is neither shown as a column nor protected.
//! Unlike the other tools this writes to disk immediately.

use rustc_hash::FxHashSet;

use crate::models::{canonical_key, BatchReport, Track};
use crate::tagio::{MetadataStore, TagIoError};

/// Tags that survive clearing regardless of the kept set: lyrics and artwork.
pub const PROTECTED_TAG_KEYS: &[&str] = &["lyrics", "unsyncedlyrics", "uslt", "apic:", "covr"];

/// Remove hidden tags from each file, keeping `tags_to_keep` (any key form)
/// and [`PROTECTED_TAG_KEYS`]. Cleared keys are dropped from the in-memory
/// `tags` and `proposed_tags`.
///
/// `success_count` counts cleared tags across all files. Each failing file
/// adds one message and the batch continues.
pub fn clear_hidden_tags<S: MetadataStore + ?Sized>(
    tracks: &mut [Track],
    tags_to_keep: &[String],
    store: &S,
) -> BatchReport {
    let mut report = BatchReport::default();
    let keep: FxHashSet<String> = tags_to_keep
        .iter()
        .map(|key| canonical_key(key))
        .chain(PROTECTED_TAG_KEYS.iter().map(|key| key.to_string()))
        .collect();
    let is_kept = |key: &str| keep.contains(key);

    for track in tracks.iter_mut() {
        match store.clear_tags_except(&track.path, &is_kept) {
            Ok(cleared) => {
                for key in &cleared {
                    track.tags.remove(key);
                    track.proposed_tags.remove(key);
                }
                log::info!("Cleared {} hidden tags from {}", cleared.len(), track.filename);
                report.success_count += cleared.len();
            }
            Err(e) => {
                let message = match e {
                    TagIoError::ReadOnly(_) => e.to_string(),
                    _ => format!(
                        "Error clearing hidden tags for {}: {}",
                        track.path.display(),
                        e
                    ),
                };
                log::error!("{}", message);
                report.errors.push(message);
            }
        }
    }

    report
}
