//! Recursive directory copy and hardlink

use std::fs;
use std::io;
use std::path::Path;

use pluck_core::error::{PluckError, PluckResult};
use tracing::warn;
use walkdir::WalkDir;

/// Counts for one directory tree
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopyResult {
    pub hardlinks_created: usize,
    pub files_copied: usize,
    pub directories_created: usize,
    pub symlinks_created: usize,
}

/// Copy `source_dir` into `dest_dir`, replacing files that already exist
pub fn copy_recursive(source_dir: &Path, dest_dir: &Path) -> PluckResult<CopyResult> {
    transfer(source_dir, dest_dir, false)
}

/// Hardlink every file of `source_dir` into `dest_dir`, copying where linking fails
pub fn hardlink_recursive(source_dir: &Path, dest_dir: &Path) -> PluckResult<CopyResult> {
    transfer(source_dir, dest_dir, true)
}

fn transfer(source_dir: &Path, dest_dir: &Path, link: bool) -> PluckResult<CopyResult> {
    let mut result = CopyResult::default();

    fs::create_dir_all(dest_dir)
        .map_err(|e| PluckError::io(format!("Failed to create {}", dest_dir.display()), e))?;

    for entry in WalkDir::new(source_dir) {
        let entry = entry.map_err(|e| {
            PluckError::io(
                format!("Failed to walk {}", source_dir.display()),
                io::Error::new(io::ErrorKind::Other, e.to_string()),
            )
        })?;
        let source_path = entry.path();

        let relative_path = source_path.strip_prefix(source_dir).map_err(|e| {
            PluckError::io(
                format!("Failed to strip prefix: {}", e),
                io::Error::new(io::ErrorKind::Other, e.to_string()),
            )
        })?;

        if relative_path.as_os_str().is_empty() {
            continue;
        }

        let dest_path = dest_dir.join(relative_path);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path).map_err(|e| {
                PluckError::io(format!("Failed to create {}", dest_path.display()), e)
            })?;
            result.directories_created += 1;
        } else if entry.file_type().is_file() {
            replace_existing(&dest_path)?;

            if link && fs::hard_link(source_path, &dest_path).is_ok() {
                result.hardlinks_created += 1;
            } else {
                fs::copy(source_path, &dest_path).map_err(|e| {
                    PluckError::io(format!("Failed to copy {}", source_path.display()), e)
                })?;
                result.files_copied += 1;
            }
        } else if entry.file_type().is_symlink() {
            replace_existing(&dest_path)?;
            transfer_symlink(source_path, &dest_path, &mut result)?;
        } else {
            warn!("Skipping special file {}", source_path.display());
        }
    }

    Ok(result)
}

/// Remove a file or link left at `dest_path` by an earlier deployment.
///
/// An earlier hardlink would otherwise be truncated through the copy.
fn replace_existing(dest_path: &Path) -> PluckResult<()> {
    if fs::symlink_metadata(dest_path).is_ok() {
        fs::remove_file(dest_path).map_err(|e| {
            PluckError::io(format!("Failed to replace {}", dest_path.display()), e)
        })?;
    }
    Ok(())
}

/// Point `dest_path` at the same target as `source_path`
#[cfg(unix)]
fn transfer_symlink(
    source_path: &Path,
    dest_path: &Path,
    result: &mut CopyResult,
) -> PluckResult<()> {
    let target = fs::read_link(source_path)
        .map_err(|e| PluckError::io(format!("Failed to read link {}", source_path.display()), e))?;
    std::os::unix::fs::symlink(&target, dest_path)
        .map_err(|e| PluckError::io(format!("Failed to link {}", dest_path.display()), e))?;
    result.symlinks_created += 1;
    Ok(())
}

/// Copy the file a link points to
#[cfg(not(unix))]
fn transfer_symlink(
    source_path: &Path,
    dest_path: &Path,
    result: &mut CopyResult,
) -> PluckResult<()> {
    if !source_path.is_file() {
        warn!("Skipping link {} to a directory", source_path.display());
        return Ok(());
    }
    fs::copy(source_path, dest_path)
        .map_err(|e| PluckError::io(format!("Failed to copy {}", source_path.display()), e))?;
    result.files_copied += 1;
    Ok(())
}
