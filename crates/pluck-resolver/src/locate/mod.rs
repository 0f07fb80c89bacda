//! Finding packages in the tree and mapping them onto directory ranges.
//!
//! Both the tree and the directory report are pre-order listings, so the
//! number of nodes visited before a match is the match's directory index and
//! a node's subtree is a contiguous run of directories starting there.

use pluck_core::types::PackageSpec;
use std::ops::Range;

use crate::tree::{DependencyTree, NodeId};

/// A match found by [`locate_in`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    /// The matching occurrence
    pub node: NodeId,
    /// Nodes visited before the match, the search root included
    pub steps: usize,
}

/// Directory range covered by one located node and everything below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtreeRange {
    /// Directory index of the node itself
    pub start: usize,
    /// Size of the subtree, the node's own line included
    pub len: usize,
    /// Descendants printed without children, in pre-order
    pub leaves: Vec<NodeId>,
}

impl SubtreeRange {
    /// Range of directory indices
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

/// Depth-first search below `root` for the first node matching `query`.
///
/// `root` itself is counted as visited but never matched. With several
/// versions of a bare name the first one in pre-order wins.
pub fn locate_in(tree: &DependencyTree, root: NodeId, query: &PackageSpec) -> Option<Located> {
    tree.preorder(root)
        .enumerate()
        .skip(1)
        .find(|(_, id)| {
            let node = tree.node(*id);
            query.matches(&node.name, &node.version)
        })
        .map(|(steps, node)| Located { node, steps })
}

/// Search the whole tree; `steps` is then the directory index of the match
pub fn locate(tree: &DependencyTree, query: &PackageSpec) -> Option<Located> {
    locate_in(tree, tree.root(), query)
}

/// Like [`locate`], but a collapsed match is swapped for the first occurrence
/// of the same `name@version` that lists its dependencies.
///
/// npm may print the collapsed occurrence before the expanded one, so the
/// first match alone can miss the package's dependencies.
pub fn locate_expanded(tree: &DependencyTree, query: &PackageSpec) -> Option<Located> {
    let found = locate(tree, query)?;
    let node = tree.node(found.node);
    if !node.is_leaf() {
        return Some(found);
    }

    let expanded = tree
        .occurrences(&node.name)
        .iter()
        .copied()
        .filter(|id| *id != tree.root())
        .find(|id| {
            let other = tree.node(*id);
            other.version == node.version && !other.is_leaf()
        });

    Some(match expanded {
        // ids are pre-order positions, which is what `steps` counts from the root
        Some(id) => Located {
            node: id,
            steps: id.index(),
        },
        None => found,
    })
}

/// Measure the subtree of a node found by [`locate`] and collect its leaves
pub fn range_of(tree: &DependencyTree, located: &Located) -> SubtreeRange {
    let mut len = 0;
    let mut leaves = Vec::new();

    for id in tree.preorder(located.node) {
        len += 1;
        if id != located.node && tree.node(id).is_leaf() {
            leaves.push(id);
        }
    }

    SubtreeRange {
        start: located.steps,
        len,
        leaves,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = "\
site@0.1.0 /srv/site
├─┬ glob@4.5.3
│ ├── inherits@2.0.3
│ └─┬ minimatch@2.0.10
│   └── brace-expansion@1.1.11
├─┬ minimatch@2.0.14
│ ├── lru-cache@2.7.3
│ └── sigmund@1.0.1
└─┬ handlebars-helpers@0.5.8
  └── minimatch@2.0.14
";

    fn spec(text: &str) -> PackageSpec {
        PackageSpec::parse(text).unwrap()
    }

    #[test]
    fn test_locate_expanded_skips_collapsed_first_match() {
        let tree = DependencyTree::parse(
            "app@1.0.0 /app\n├─┬ a@1.0.0\n│ └── z@1.0.0 deduped\n└─┬ z@1.0.0\n  └── y@1.0.0\n",
        )
        .unwrap();

        let first = locate(&tree, &spec("z@1.0.0")).unwrap();
        assert_eq!(first.steps, 2);

        let expanded = locate_expanded(&tree, &spec("z@1.0.0")).unwrap();
        assert_eq!(expanded.steps, 3);
        assert_eq!(tree.node(expanded.node).children().len(), 1);
        assert_eq!(range_of(&tree, &expanded).len, 2);

        // a package that is never expanded stays on its first occurrence
        assert_eq!(locate_expanded(&tree, &spec("y")), locate(&tree, &spec("y")));
    }

    #[test]
    fn test_locate_counts_steps() {
        let tree = DependencyTree::parse(TREE).unwrap();

        let found = locate(&tree, &spec("glob")).unwrap();
        assert_eq!(found.steps, 1);

        let found = locate(&tree, &spec("sigmund")).unwrap();
        assert_eq!(found.steps, 7);
        assert_eq!(found.node.index(), 7);
    }

    #[test]
    fn test_locate_respects_version() {
        let tree = DependencyTree::parse(TREE).unwrap();

        let pinned = locate(&tree, &spec("minimatch@2.0.14")).unwrap();
        assert_eq!(pinned.steps, 5);

        // a bare name takes the first occurrence in pre-order, not the shallowest
        let bare = locate(&tree, &spec("minimatch")).unwrap();
        assert_eq!(bare.steps, 3);
        assert_eq!(tree.node(bare.node).version, "2.0.10");
    }

    #[test]
    fn test_locate_bare_and_pinned_agree_for_single_version() {
        let tree = DependencyTree::parse(TREE).unwrap();
        assert_eq!(
            locate(&tree, &spec("lru-cache")),
            locate(&tree, &spec("lru-cache@2.7.3"))
        );
    }

    #[test]
    fn test_locate_never_matches_search_root() {
        let tree = DependencyTree::parse(TREE).unwrap();
        assert_eq!(locate(&tree, &spec("site")), None);

        let glob = locate(&tree, &spec("glob")).unwrap();
        assert_eq!(locate_in(&tree, glob.node, &spec("glob")), None);
    }

    #[test]
    fn test_locate_in_subtree() {
        let tree = DependencyTree::parse(TREE).unwrap();
        let helpers = locate(&tree, &spec("handlebars-helpers")).unwrap();

        let nested = locate_in(&tree, helpers.node, &spec("minimatch")).unwrap();
        assert_eq!(nested.steps, 1);
        assert_eq!(nested.node.index(), 9);
        assert_eq!(locate_in(&tree, helpers.node, &spec("glob")), None);
    }

    #[test]
    fn test_locate_missing() {
        let tree = DependencyTree::parse(TREE).unwrap();
        assert_eq!(locate(&tree, &spec("left-pad")), None);
        assert_eq!(locate(&tree, &spec("glob@9.9.9")), None);
    }

    #[test]
    fn test_range_of_branch() {
        let tree = DependencyTree::parse(TREE).unwrap();
        let glob = locate(&tree, &spec("glob")).unwrap();
        let range = range_of(&tree, &glob);

        assert_eq!(range.as_range(), 1..5);
        let leaves: Vec<String> = range.leaves.iter().map(|id| tree.node(*id).key()).collect();
        assert_eq!(leaves, vec!["inherits@2.0.3", "brace-expansion@1.1.11"]);
    }

    #[test]
    fn test_range_of_leaf() {
        let tree = DependencyTree::parse(TREE).unwrap();
        let leaf = locate(&tree, &spec("sigmund")).unwrap();
        let range = range_of(&tree, &leaf);

        assert_eq!(range.as_range(), 7..8);
        assert!(range.leaves.is_empty());
    }

    #[test]
    fn test_range_reports_collapsed_leaf() {
        let tree = DependencyTree::parse(TREE).unwrap();
        let helpers = locate(&tree, &spec("handlebars-helpers")).unwrap();
        let range = range_of(&tree, &helpers);

        assert_eq!(range.as_range(), 8..10);
        assert_eq!(range.leaves.len(), 1);
        assert_eq!(tree.node(range.leaves[0]).key(), "minimatch@2.0.14");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn random_tree() -> impl Strategy<Value = String> {
        prop::collection::vec((0usize..3, 0usize..4), 1..30).prop_map(|entries| {
            let mut text = String::from("root@1.0.0\n");
            let mut depth = 0usize;
            for (i, (step, name)) in entries.into_iter().enumerate() {
                depth = if i == 0 || step == 0 {
                    depth + 1
                } else {
                    depth.saturating_sub(step - 1).max(1)
                };
                text.push_str(&"  ".repeat(depth - 1));
                text.push_str("├── ");
                text.push_str(&format!("pkg{}@1.{}.0\n", name, i % 2));
            }
            text
        })
    }

    proptest! {
        #[test]
        fn steps_equal_node_index(text in random_tree(), name in 0usize..4) {
            let tree = DependencyTree::parse(&text).unwrap();
            let query = PackageSpec::any_version(format!("pkg{}", name));
            if let Some(found) = locate(&tree, &query) {
                prop_assert_eq!(found.steps, found.node.index());
                let range = range_of(&tree, &found);
                prop_assert!(range.as_range().end <= tree.len());
                prop_assert_eq!(range.len, tree.preorder(found.node).count());
            }
        }
    }
}
