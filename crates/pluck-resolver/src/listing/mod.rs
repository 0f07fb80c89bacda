//! Directory report produced by `npm ls --parseable true`.
//!
//! Entry `i` is the install directory of the `i`-th node of the paired tree
//! in pre-order. npm guarantees the order, nothing in the text proves it, so
//! the only check available is that both reports have the same length.

use pluck_core::error::{PluckError, PluckResult};
use pluck_core::utils::significant_lines;
use std::ops::Range;

use crate::tree::DependencyTree;

/// Install directories, index-aligned with a [`DependencyTree`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryList {
    entries: Vec<String>,
}

impl DirectoryList {
    /// Split the directory report and check it against its tree
    pub fn split(text: &str, tree: &DependencyTree) -> PluckResult<Self> {
        let entries: Vec<String> = significant_lines(text)
            .into_iter()
            .map(|line| line.trim_end().to_string())
            .collect();

        if entries.len() != tree.len() {
            return Err(PluckError::LineCountMismatch {
                directories: entries.len(),
                nodes: tree.len(),
            });
        }

        Ok(Self { entries })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the report was empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Directory of the node at pre-order position `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Directories for a contiguous range of pre-order positions
    pub fn slice(&self, range: Range<usize>) -> &[String] {
        &self.entries[range]
    }

    /// All entries in report order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
