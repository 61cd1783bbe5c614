//! Highlight detection and selection

mod detector;
mod selector;
mod types;

pub use detector::HighlightDetector;
pub use selector::{select_highlights, MAX_HIGHLIGHTS};
pub use types::*;
