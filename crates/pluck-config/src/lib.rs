//! Configuration parsing for pluck
//!
//! This crate handles parsing and validation of pluck.toml, layering of
//! environment and command line overrides, and npm proxy selection.

pub mod merge;
pub mod proxy;
pub mod toml;

// Re-export main types
pub use merge::{ConfigLayering, ConfigLoader, ConfigSource};
pub use proxy::{Proxy, ProxyConfig};
pub use self::toml::{ExtractSection, NpmSection, PluckToml};

use pluck_core::error::PluckError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, PluckError>;

/// File name searched for by [`ConfigLoader`]
pub const CONFIG_FILE_NAME: &str = "pluck.toml";
