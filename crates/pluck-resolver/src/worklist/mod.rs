//! Transitive resolution over collapsed occurrences.
//!
//! npm prints each package's dependencies only at its first occurrence; later
//! occurrences appear as leaves. Every leaf found inside a resolved subtree is
//! therefore queued again by `name@version`, which lands on the fully
//! expanded occurrence (wherever it is printed) and pulls in the directories
//! listed there.

use pluck_core::error::{PluckError, PluckResult};
use pluck_core::types::PackageSpec;
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::{debug, info, warn};

use crate::listing::DirectoryList;
use crate::locate::{locate_expanded, range_of};
use crate::tree::DependencyTree;

/// Directories collected by one resolution run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    directories: BTreeSet<String>,
}

impl ResultSet {
    /// Create an empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory, returning whether it was new
    pub fn insert(&mut self, directory: impl Into<String>) -> bool {
        self.directories.insert(directory.into())
    }

    /// Check whether a directory was collected
    pub fn contains(&self, directory: &str) -> bool {
        self.directories.contains(directory)
    }

    /// Number of distinct directories
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    /// Whether nothing was collected
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    /// Directories in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.directories.iter().map(String::as_str)
    }
}

impl<S: Into<String>> Extend<S> for ResultSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.directories.extend(iter.into_iter().map(Into::into));
    }
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorklistStats {
    /// Requests that resolved a new package
    pub resolved: usize,
    /// Requests that landed on an already resolved package
    pub skipped: usize,
    /// Collapsed leaves queued for a second look
    pub requeued: usize,
}

/// FIFO worklist of package requests against one pair of reports
#[derive(Debug)]
pub struct ResolutionWorklist<'a> {
    tree: &'a DependencyTree,
    directories: &'a DirectoryList,
    queue: VecDeque<PackageSpec>,
    /// Every request string ever queued
    queued: HashSet<String>,
    /// `name@version` of every occurrence already expanded
    resolved: HashSet<String>,
    results: ResultSet,
    stats: WorklistStats,
}

impl<'a> ResolutionWorklist<'a> {
    /// Create an empty worklist
    pub fn new(tree: &'a DependencyTree, directories: &'a DirectoryList) -> Self {
        Self {
            tree,
            directories,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            resolved: HashSet::new(),
            results: ResultSet::new(),
            stats: WorklistStats::default(),
        }
    }

    /// Queue the user's requests
    pub fn seed<I>(&mut self, requests: I)
    where
        I: IntoIterator<Item = PackageSpec>,
    {
        for request in requests {
            if !request.is_exact() && self.tree.versions_of(&request.name).len() > 1 {
                warn!(
                    "'{}' is installed in several versions; using the first one in the tree",
                    request.name
                );
            }
            self.enqueue(request);
        }
    }

    fn enqueue(&mut self, request: PackageSpec) -> bool {
        if self.queued.insert(request.to_string()) {
            self.queue.push_back(request);
            true
        } else {
            false
        }
    }

    /// Drain the queue and return every collected directory.
    ///
    /// Fails on the first request that is not in the tree; nothing collected
    /// so far is returned in that case.
    pub fn run(mut self) -> PluckResult<ResultSet> {
        while let Some(request) = self.queue.pop_front() {
            self.process(&request)?;
        }

        info!(
            "Resolved {} packages into {} directories ({} collapsed leaves requeued, {} duplicates skipped)",
            self.stats.resolved,
            self.results.len(),
            self.stats.requeued,
            self.stats.skipped
        );
        Ok(self.results)
    }

    fn process(&mut self, request: &PackageSpec) -> PluckResult<()> {
        let tree = self.tree;
        let located =
            locate_expanded(tree, request).ok_or_else(|| PluckError::PackageNotFound {
                name: request.to_string(),
            })?;

        let node = tree.node(located.node);
        if !self.resolved.insert(node.key()) {
            debug!("{} already resolved as {}", request, node.key());
            self.stats.skipped += 1;
            return Ok(());
        }
        self.stats.resolved += 1;

        let range = range_of(tree, &located);
        debug!(
            "{} resolved to {} at directory {} ({} entries, {} leaves)",
            request,
            node.key(),
            range.start,
            range.len,
            range.leaves.len()
        );
        self.results
            .extend(self.directories.slice(range.as_range()).iter().cloned());

        for leaf in &range.leaves {
            let leaf = tree.node(*leaf);
            if self.resolved.contains(&leaf.key()) {
                continue;
            }
            if self.enqueue(leaf.spec()) {
                self.stats.requeued += 1;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(tree_text: &str, list_text: &str, requests: &[&str]) -> PluckResult<ResultSet> {
        let tree = DependencyTree::parse(tree_text)?;
        let list = DirectoryList::split(list_text, &tree)?;
        let mut worklist = ResolutionWorklist::new(&tree, &list);
        worklist.seed(requests.iter().map(|r| PackageSpec::parse(r).unwrap()));
        worklist.run()
    }

    const TREE: &str = "\
app@1.0.0 /app
├─┬ minimatch@2.0.14
│ ├── lru-cache@2.7.3
│ └── sigmund@1.0.1
└─┬ helpers@0.5.8
  ├── minimatch@2.0.14
  └── lodash@2.4.2
";

    const LIST: &str = "\
/app
/app/node_modules/minimatch
/app/node_modules/lru-cache
/app/node_modules/sigmund
/app/node_modules/helpers
/app/node_modules/minimatch
/app/node_modules/lodash
";

    #[test]
    fn test_collapsed_leaf_pulls_in_first_occurrence() {
        let results = run(TREE, LIST, &["helpers"]).unwrap();
        let collected: Vec<&str> = results.iter().collect();
        assert_eq!(
            collected,
            vec![
                "/app/node_modules/helpers",
                "/app/node_modules/lodash",
                "/app/node_modules/lru-cache",
                "/app/node_modules/minimatch",
                "/app/node_modules/sigmund",
            ]
        );
    }

    #[test]
    fn test_collapsed_leaf_before_expanded_occurrence() {
        let tree = "\
app@1.0.0 /app
├─┬ a@1.0.0
│ └── z@1.0.0 deduped
└─┬ z@1.0.0
  └── y@1.0.0
";
        let list = "\
/app
/app/node_modules/a
/app/node_modules/z
/app/node_modules/z
/app/node_modules/y
";
        let results = run(tree, list, &["a"]).unwrap();
        assert_eq!(
            results.iter().collect::<Vec<_>>(),
            vec![
                "/app/node_modules/a",
                "/app/node_modules/y",
                "/app/node_modules/z",
            ]
        );
    }

    #[test]
    fn test_unknown_request_fails() {
        let err = run(TREE, LIST, &["helpers", "left-pad"]).unwrap_err();
        match err {
            PluckError::PackageNotFound { name } => assert_eq!(name, "left-pad"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_version_fails() {
        assert!(matches!(
            run(TREE, LIST, &["minimatch@9.0.0"]),
            Err(PluckError::PackageNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_requests_are_idempotent() {
        let once = run(TREE, LIST, &["minimatch"]).unwrap();
        let twice = run(TREE, LIST, &["minimatch", "minimatch@2.0.14", "minimatch"]).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_cyclic_collapse_terminates() {
        let tree = "\
app@1.0.0 /app
└─┬ a@1.0.0
  └─┬ b@1.0.0
    └── a@1.0.0
";
        let list = "/app\n/app/node_modules/a\n/app/node_modules/b\n/app/node_modules/a\n";
        let results = run(tree, list, &["a", "b"]).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_leaf_request_without_dependencies() {
        let results = run(TREE, LIST, &["lodash"]).unwrap();
        assert_eq!(results.iter().collect::<Vec<_>>(), vec!["/app/node_modules/lodash"]);
    }

    #[test]
    fn test_result_set_extend_and_insert() {
        let mut results = ResultSet::new();
        assert!(results.is_empty());
        results.extend(vec!["/a", "/b"]);
        assert!(!results.insert("/a"));
        assert!(results.insert("/c".to_string()));
        assert!(results.contains("/b"));
        assert_eq!(results.len(), 3);
    }
}
