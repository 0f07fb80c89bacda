//! Copying of resolved package directories
//!
//! Each top-level group from the resolver is copied, or hardlinked with a copy
//! fallback, to `<target>/<group name>`.

pub mod copy;

pub use copy::{copy_recursive, hardlink_recursive, CopyResult};

use std::path::Path;

use pluck_core::error::{PluckError, PluckResult};
use pluck_core::utils::safe_join;
use pluck_resolver::TopLevelGroup;
use tracing::{debug, info};

/// How files reach the target directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeployMode {
    #[default]
    Copy,
    /// Hardlink each file, copying when linking fails
    Hardlink,
}

/// Totals for one deployment
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeployResult {
    pub groups_copied: usize,
    pub files_copied: usize,
    pub hardlinks_created: usize,
    pub directories_created: usize,
    pub symlinks_created: usize,
}

impl DeployResult {
    fn add(&mut self, copied: CopyResult) {
        self.groups_copied += 1;
        self.files_copied += copied.files_copied;
        self.hardlinks_created += copied.hardlinks_created;
        self.directories_created += copied.directories_created;
        self.symlinks_created += copied.symlinks_created;
    }
}

/// Copies top-level groups into a target directory
#[derive(Debug, Clone, Copy, Default)]
pub struct Deployer {
    mode: DeployMode,
}

impl Deployer {
    pub fn new(mode: DeployMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DeployMode {
        self.mode
    }

    /// Copy every group to `target_dir/<group name>`
    pub fn deploy<'a, I>(&self, groups: I, target_dir: &Path) -> PluckResult<DeployResult>
    where
        I: IntoIterator<Item = &'a TopLevelGroup>,
    {
        let mut result = DeployResult::default();

        for group in groups {
            let source = Path::new(&group.path);
            if !source.is_dir() {
                return Err(PluckError::io(
                    format!("Package directory {} is missing", group.path),
                    std::io::Error::new(std::io::ErrorKind::NotFound, group.path.clone()),
                ));
            }

            let destination = safe_join(target_dir, Path::new(&group.name))?;
            debug!("Deploying {} -> {}", group.path, destination.display());

            let copied = match self.mode {
                DeployMode::Copy => copy_recursive(source, &destination)?,
                DeployMode::Hardlink => hardlink_recursive(source, &destination)?,
            };
            result.add(copied);
        }

        info!(
            "Deployed {} packages to {} ({} files copied, {} hardlinked, {} symlinks)",
            result.groups_copied,
            target_dir.display(),
            result.files_copied,
            result.hardlinks_created,
            result.symlinks_created
        );

        Ok(result)
    }
}
