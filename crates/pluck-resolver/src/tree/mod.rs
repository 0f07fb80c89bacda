//! Dependency tree reconstruction from `npm ls` output.
//!
//! Nodes live in an arena indexed by [`NodeId`]. Lines are emitted in
//! pre-order, so a node's id is also its line number in the tree report
//! (zero-based, blank trailing lines excluded).

use indexmap::IndexMap;
use pluck_core::error::{PluckError, PluckResult};
use pluck_core::types::{split_name_version, PackageSpec};
use pluck_core::utils::significant_lines;
use std::collections::BTreeSet;
use tracing::debug;

/// Width of the connector that precedes every non-root package name (`├── `)
const CONNECTOR_WIDTH: usize = 4;

/// Columns of indentation per ancestor level (`│ `)
const INDENT_WIDTH: usize = 2;

/// Placeholder npm prints under a root with nothing installed
const EMPTY_MARKER: &str = "(empty)";

/// Prefix of npm 2/3 lines for dependencies that are not installed
/// (`UNMET DEPENDENCY`, `UNMET PEER DEPENDENCY`, `UNMET OPTIONAL DEPENDENCY`)
const UNMET_MARKER: &str = "UNMET";

/// Index of a node inside a [`DependencyTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// One occurrence of a package in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNode {
    /// Package name (e.g., "lodash" or "@types/node")
    pub name: String,
    /// Version as printed by npm, empty if none was printed
    pub version: String,
    children: Vec<NodeId>,
}

impl PackageNode {
    fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            children: Vec::new(),
        }
    }

    /// Children in listed order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// A node printed without children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Spec that finds this package again, pinned to its version when known
    pub fn spec(&self) -> PackageSpec {
        if self.version.is_empty() {
            PackageSpec::any_version(self.name.clone())
        } else {
            PackageSpec::exact(self.name.clone(), self.version.clone())
        }
    }

    /// `name@version`, used to recognise the same package across occurrences
    pub fn key(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// Rooted dependency tree parsed from `npm ls`
#[derive(Debug, Clone)]
pub struct DependencyTree {
    nodes: Vec<PackageNode>,
    /// Occurrences per package name, in pre-order
    by_name: IndexMap<String, Vec<NodeId>>,
}

impl DependencyTree {
    /// Parse the box-drawn tree printed by `npm ls --parseable false`.
    ///
    /// Each non-root line is `<indent><connector><name>@<version>[ annotations]`
    /// with two columns of indent per ancestor level and a four column
    /// connector. The first line is the root.
    pub fn parse(text: &str) -> PluckResult<Self> {
        let lines = significant_lines(text);
        if lines.is_empty() {
            return Err(PluckError::malformed(1, "dependency tree is empty"));
        }

        let mut tree = Self {
            nodes: Vec::with_capacity(lines.len()),
            by_name: IndexMap::new(),
        };
        let mut ancestors: Vec<NodeId> = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let line_number = index + 1;
            let (column, payload) = split_tree_line(line)
                .ok_or_else(|| PluckError::malformed(line_number, "no package name"))?;

            if index > 0 && payload == EMPTY_MARKER {
                continue;
            }

            // not installed, so `npm ls --parseable` prints no directory for it
            if index > 0 && payload == UNMET_MARKER {
                debug!("Skipping line {}: {}", line_number, line.trim());
                continue;
            }

            let depth = if index == 0 {
                0
            } else {
                depth_for_column(column)
                    .ok_or_else(|| PluckError::malformed(line_number, "missing tree connector"))?
            };

            ancestors.truncate(depth);
            if ancestors.len() < depth {
                return Err(PluckError::malformed(
                    line_number,
                    format!(
                        "indented to level {} but only {} ancestors are open",
                        depth,
                        ancestors.len()
                    ),
                ));
            }

            let (name, version) = split_name_version(payload);
            if name.is_empty() {
                return Err(PluckError::malformed(line_number, "empty package name"));
            }

            let id = tree.push(PackageNode::new(name, version));
            if let Some(&parent) = ancestors.last() {
                tree.nodes[parent.0].children.push(id);
            }
            ancestors.push(id);
        }

        Ok(tree)
    }

    fn push(&mut self, node: PackageNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.by_name.entry(node.name.clone()).or_default().push(id);
        self.nodes.push(node);
        id
    }

    /// The project itself
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> &PackageNode {
        &self.nodes[id.0]
    }

    /// Total number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A parsed tree always has a root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order traversal starting at (and including) `start`
    pub fn preorder(&self, start: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![start],
        }
    }

    /// Every occurrence of `name`, in pre-order
    pub fn occurrences(&self, name: &str) -> &[NodeId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct versions of `name` present anywhere below the root
    pub fn versions_of(&self, name: &str) -> BTreeSet<&str> {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .filter(|id| **id != self.root())
            .map(|id| self.nodes[id.0].version.as_str())
            .collect()
    }

    /// Render the tree back into `npm ls` form
    pub fn render(&self) -> String {
        let mut out = String::new();
        let root = self.node(self.root());
        out.push_str(&root.key());
        out.push('\n');
        self.render_children(self.root(), "", &mut out);
        out
    }

    fn render_children(&self, id: NodeId, prefix: &str, out: &mut String) {
        let children = self.node(id).children();
        for (position, child) in children.iter().enumerate() {
            let last = position + 1 == children.len();
            let node = self.node(*child);
            out.push_str(prefix);
            out.push_str(match (last, node.is_leaf()) {
                (false, true) => "├── ",
                (false, false) => "├─┬ ",
                (true, true) => "└── ",
                (true, false) => "└─┬ ",
            });
            out.push_str(&node.key());
            out.push('\n');

            let nested = format!("{}{}", prefix, if last { "  " } else { "│ " });
            self.render_children(*child, &nested, out);
        }
    }
}

/// Pre-order iterator over node ids
pub struct Preorder<'a> {
    tree: &'a DependencyTree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.node(id).children().iter().rev().copied());
        Some(id)
    }
}

/// Box-drawing glyphs and their `--unicode=false` fallbacks
fn is_tree_glyph(c: char) -> bool {
    matches!(
        c,
        ' ' | '│' | '├' | '└' | '─' | '┬' | '┼' | '|' | '+' | '`' | '-'
    )
}

/// Find the column of the package payload and the payload itself
fn split_tree_line(line: &str) -> Option<(usize, &str)> {
    let (column, (offset, _)) = line
        .char_indices()
        .enumerate()
        .find(|(_, (_, c))| !is_tree_glyph(*c))?;
    let payload = line[offset..].split_whitespace().next()?;
    Some((column, payload))
}

fn depth_for_column(column: usize) -> Option<usize> {
    if column < CONNECTOR_WIDTH {
        return None;
    }
    Some((column - CONNECTOR_WIDTH) / INDENT_WIDTH + 1)
}
