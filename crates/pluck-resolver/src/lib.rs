//! Dependency closure resolution for pluck
//!
//! This crate pairs the two reports npm prints for one install root, the
//! box-drawn tree (`npm ls`) and the directory list (`npm ls --parseable`),
//! and computes which top-level directories must be copied so that the
//! requested packages and everything they depend on are present.

pub mod flatten;
pub mod listing;
pub mod locate;
pub mod tree;
pub mod worklist;

// Re-export main types
pub use flatten::{PathFlattener, TopLevelGroup};
pub use listing::DirectoryList;
pub use locate::{locate, locate_expanded, locate_in, range_of, Located, SubtreeRange};
pub use tree::{DependencyTree, NodeId, PackageNode};
pub use worklist::{ResolutionWorklist, ResultSet};

use pluck_core::error::PluckError;
use pluck_core::types::PackageSpec;
use std::collections::BTreeSet;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, PluckError>;

/// One install root's reports, parsed and cross-checked
#[derive(Debug, Clone)]
pub struct Resolver {
    tree: DependencyTree,
    directories: DirectoryList,
    flattener: PathFlattener,
}

impl Resolver {
    /// Parse both reports; fails unless they describe the same number of nodes
    pub fn from_reports(tree_text: &str, directory_text: &str) -> ResolverResult<Self> {
        let tree = DependencyTree::parse(tree_text)?;
        let directories = DirectoryList::split(directory_text, &tree)?;
        Ok(Self {
            tree,
            directories,
            flattener: PathFlattener::default(),
        })
    }

    /// Use a different flattener (e.g. a non-native path separator)
    pub fn with_flattener(mut self, flattener: PathFlattener) -> Self {
        self.flattener = flattener;
        self
    }

    /// The parsed tree
    pub fn tree(&self) -> &DependencyTree {
        &self.tree
    }

    /// The parsed directory list
    pub fn directories(&self) -> &DirectoryList {
        &self.directories
    }

    /// Collect every directory needed by `requested`, nested ones included
    pub fn resolve_directories(&self, requested: &[PackageSpec]) -> ResolverResult<ResultSet> {
        let mut worklist = ResolutionWorklist::new(&self.tree, &self.directories);
        worklist.seed(requested.iter().cloned());
        worklist.run()
    }

    /// Resolve request strings (`name` or `name@version`) to top-level groups
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> ResolverResult<BTreeSet<TopLevelGroup>> {
        let specs = requested
            .iter()
            .map(|request| PackageSpec::parse(request.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let directories = self.resolve_directories(&specs)?;
        Ok(self.flattener.flatten(directories.iter()))
    }
}

/// Parse both reports and resolve `requested` in one call
pub fn resolve<S: AsRef<str>>(
    tree_text: &str,
    directory_text: &str,
    requested: &[S],
) -> ResolverResult<BTreeSet<TopLevelGroup>> {
    Resolver::from_reports(tree_text, directory_text)?.resolve(requested)
}
