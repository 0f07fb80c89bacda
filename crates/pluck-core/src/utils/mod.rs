//! Utility functions and helpers.
//!
//! Common functionality used across multiple pluck crates.

pub mod path;
pub mod text;

// Re-export commonly used utilities
pub use path::{is_safe_path, normalize_path, safe_join};
pub use text::significant_lines;
