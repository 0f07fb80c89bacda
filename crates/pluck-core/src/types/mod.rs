//! Core data types for pluck.
//!
//! - Package specs (`name` or `name@version`) as written in requests and tree lines

pub mod spec;

// Re-export all public types
pub use spec::{split_name_version, PackageSpec};
