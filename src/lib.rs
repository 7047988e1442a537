//! tagtidy - music filename and title tag normalization.
//!
//! Library modules shared by the `tagtidy` binary: text normalization,
//! suffix extraction, filename generation, batch tools and tag I/O.

pub mod filename;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod settings;
pub mod suffix;
pub mod tagio;
pub mod tools;
pub mod validation;
