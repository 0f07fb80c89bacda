//! Path utilities for safe file system operations.
//!
//! Group names come from npm's directory report, so they are checked before
//! being joined onto the copy destination.

use crate::error::{PluckError, PluckResult};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving . and .. components
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                // Keep a leading .. so escapes stay visible
                if components.is_empty() {
                    components.push(component);
                } else {
                    components.pop();
                }
            },
            other => {
                components.push(other);
            },
        }
    }

    components.iter().collect()
}

/// Check if a path is safe (relative, never climbs above its base)
pub fn is_safe_path(path: &Path) -> bool {
    if path.is_absolute() {
        return false;
    }

    let mut depth = 0i32;

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            },
            Component::Normal(_) => {
                depth += 1;
            },
            _ => {
                return false;
            },
        }
    }

    true
}

/// Safely join paths, preventing directory traversal
pub fn safe_join(base: &Path, path: &Path) -> PluckResult<PathBuf> {
    if !is_safe_path(path) {
        return Err(PluckError::io(
            format!("Refusing to write outside {}", base.display()),
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsafe relative path '{}'", path.display()),
            ),
        ));
    }

    Ok(base.join(normalize_path(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        let path = Path::new("./node_modules/../vendor/./async");
        assert_eq!(normalize_path(path), Path::new("vendor/async"));
    }

    #[test]
    fn test_is_safe_path() {
        assert!(is_safe_path(Path::new("async")));
        assert!(is_safe_path(Path::new("@babel/core")));
        assert!(!is_safe_path(Path::new("../../etc")));
        assert!(!is_safe_path(Path::new("/absolute/path")));
    }

    #[test]
    fn test_safe_join() {
        let base = Path::new("/build/web");

        let joined = safe_join(base, Path::new("@babel/core")).unwrap();
        assert_eq!(joined, Path::new("/build/web/@babel/core"));

        let result = safe_join(base, Path::new("../outside"));
        assert!(matches!(result, Err(PluckError::Io { .. })));
    }
}
