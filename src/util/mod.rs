//! Text helpers for presenting article fields in fixed-width cards.

mod text;

pub use text::{clamp_lines, collapse_whitespace, display_width, truncate_to_width};
