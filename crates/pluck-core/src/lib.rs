//! # pluck-core
//!
//! Core types and utilities shared across all pluck crates.
//!
//! This crate provides:
//! - PluckError enum for unified error handling
//! - PackageSpec, the `name` / `name@version` grammar shared by tree lines and requests
//! - Text and path helpers used by the report parsers and the deployer
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (PackageSpec)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{PluckError, PluckResult};
pub use types::PackageSpec;
