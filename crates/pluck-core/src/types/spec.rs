//! Package spec types.
//!
//! A spec is either a bare package name or `name@version`. Scoped names
//! (`@scope/pkg`) start with `@`, so the separator is the first `@` after the
//! first character, never the leading one.

use crate::error::{PluckError, PluckResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A package request: a name and an optional exact version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
}

/// Split `name@version` into its parts.
///
/// The version is empty when there is no separator.
pub fn split_name_version(payload: &str) -> (&str, &str) {
    let search_from = payload.chars().next().map(char::len_utf8).unwrap_or(0);
    match payload[search_from..].find('@') {
        Some(offset) => {
            let at = search_from + offset;
            (&payload[..at], &payload[at + 1..])
        },
        None => (payload, ""),
    }
}

impl PackageSpec {
    /// Create a spec matching any version of `name`
    pub fn any_version(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Create a spec matching exactly `name@version`
    pub fn exact(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// Parse `name` or `name@version`
    pub fn parse(spec: &str) -> PluckResult<Self> {
        let trimmed = spec.trim();
        let (name, version) = split_name_version(trimmed);

        if name.is_empty() {
            return Err(PluckError::InvalidPackageSpec {
                spec: spec.to_string(),
                reason: "package name is empty".to_string(),
            });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(PluckError::InvalidPackageSpec {
                spec: spec.to_string(),
                reason: "package name contains whitespace".to_string(),
            });
        }
        if name.starts_with('@') && !name[1..].contains('/') {
            return Err(PluckError::InvalidPackageSpec {
                spec: spec.to_string(),
                reason: "scoped package names look like @scope/name".to_string(),
            });
        }

        // "name@" is treated like a bare name
        let version = if version.is_empty() {
            None
        } else {
            Some(version.to_string())
        };

        Ok(Self {
            name: name.to_string(),
            version,
        })
    }

    /// Check whether a tree occurrence satisfies this spec
    pub fn matches(&self, name: &str, version: &str) -> bool {
        self.name == name
            && self
                .version
                .as_deref()
                .map_or(true, |wanted| wanted == version)
    }

    /// Whether an exact version was requested
    pub fn is_exact(&self) -> bool {
        self.version.is_some()
    }
}

impl FromStr for PackageSpec {
    type Err = PluckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}
