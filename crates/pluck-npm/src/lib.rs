//! npm invocation for pluck
//!
//! Runs npm with the configured registry, proxy and environment, and captures
//! the two `npm ls` reports the resolver consumes.

pub mod reports;
pub mod runner;

pub use reports::NpmReports;
pub use runner::NpmRunner;

use pluck_core::error::PluckError;

/// Result type for npm operations
pub type NpmResult<T> = Result<T, PluckError>;
