//! Batch editing tools applied to a selection of tracks.
//!
//! Every tool only stages edits (`proposed_tags`, `clean_title`, `suffixes`,
//! `proposed_filename`); nothing reaches disk until the save pipeline runs,
//! except hidden-tag clearing which writes immediately.

pub mod camel_case;
pub mod clear_hidden;
pub mod edit;
pub mod find_replace;
pub mod name_to_title;
pub mod preview;
pub mod tags_from_filename;

pub use camel_case::{camel_case, camel_case_title};
pub use clear_hidden::{clear_hidden_tags, PROTECTED_TAG_KEYS};
pub use edit::{set_manual_filename, set_suffixes, set_tag, set_title};
pub use find_replace::find_replace_in_title;
pub use name_to_title::name_to_title;
pub use preview::{clear_preview, prepare_track, revert, FolderContext};
pub use tags_from_filename::tags_from_filename;

use crate::filename::generate_filename;
use crate::models::Track;
use crate::settings::RuleSet;

/// Regenerate the proposed filename unless it was set by hand.
pub(crate) fn regenerate_unless_manual(track: &mut Track, rules: &RuleSet) {
    if !track.is_manual_rename {
        generate_filename(track, rules);
    }
}
