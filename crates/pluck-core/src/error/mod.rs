//! Error types and result aliases for pluck operations.
//!
//! Provides a unified error type that covers the report parsers, the
//! resolution engine and the npm/copy collaborators, with actionable messages.

use thiserror::Error;

/// Unified error type for all pluck operations
#[derive(Error, Debug)]
pub enum PluckError {
    // Report errors
    #[error("Malformed dependency tree at line {line}: {reason}")]
    MalformedTree { line: usize, reason: String },

    #[error(
        "Directory list has {directories} entries but the dependency tree has {nodes} nodes"
    )]
    LineCountMismatch { directories: usize, nodes: usize },

    // Resolution errors
    #[error("Package '{name}' not found in dependency tree")]
    PackageNotFound { name: String },

    #[error("Invalid package spec '{spec}': {reason}")]
    InvalidPackageSpec { spec: String, reason: String },

    // npm errors
    #[error("npm {command} exited with {status}: {stderr}")]
    NpmFailed {
        command: String,
        status: String,
        stderr: String,
    },

    // Config errors
    #[error("Failed to parse pluck.toml: {message}")]
    TomlParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for pluck operations
pub type PluckResult<T> = Result<T, PluckError>;

impl PluckError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create a malformed tree error for a 1-based line number
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedTree {
            line,
            reason: reason.into(),
        }
    }

    /// Check if this error was caused by the npm reports rather than by pluck's own I/O
    pub fn is_report_error(&self) -> bool {
        matches!(
            self,
            PluckError::MalformedTree { .. } | PluckError::LineCountMismatch { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            PluckError::PackageNotFound { .. } => {
                Some("Check the package name spelling and make sure it is installed ('pluck npm install')")
            },
            PluckError::LineCountMismatch { .. } => {
                Some("The install changed between the two 'npm ls' runs; rerun once node_modules is stable")
            },
            PluckError::MalformedTree { .. } => {
                Some("Run 'npm ls' manually and check that it prints a plain dependency tree")
            },
            PluckError::NpmFailed { .. } => {
                Some("Fix the reported npm problems (missing or invalid packages) and try again")
            },
            PluckError::ConfigValidation { .. } | PluckError::TomlParse { .. } => {
                Some("Check pluck.toml or the corresponding PLUCK_* environment variable")
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PluckError::LineCountMismatch {
            directories: 3,
            nodes: 4,
        };
        assert_eq!(
            err.to_string(),
            "Directory list has 3 entries but the dependency tree has 4 nodes"
        );

        let err = PluckError::malformed(7, "no package name");
        assert_eq!(
            err.to_string(),
            "Malformed dependency tree at line 7: no package name"
        );
    }

    #[test]
    fn test_report_errors() {
        assert!(PluckError::malformed(1, "x").is_report_error());
        assert!(!PluckError::PackageNotFound {
            name: "left-pad".to_string()
        }
        .is_report_error());
    }

    #[test]
    fn test_suggestions() {
        let err = PluckError::PackageNotFound {
            name: "left-pad".to_string(),
        };
        assert!(err.suggestion().is_some());

        let err = PluckError::io(
            "boom".to_string(),
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        );
        assert!(err.suggestion().is_none());
    }
}
