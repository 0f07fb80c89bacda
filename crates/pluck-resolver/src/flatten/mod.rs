//! Reduce resolved directories to top-level copy units.
//!
//! A package's nested `node_modules` lives inside its own directory, so
//! copying the top-level directory once covers every nested entry below it.

use std::collections::BTreeSet;
use std::path::MAIN_SEPARATOR;
use tracing::debug;

/// A directory to copy as one unit
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopLevelGroup {
    /// Full path of the directory
    pub path: String,
    /// Path relative to the common root (`async` or `@scope/pkg`)
    pub name: String,
}

/// Groups directories by the first segment below their common prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathFlattener {
    separator: char,
}

impl Default for PathFlattener {
    fn default() -> Self {
        Self {
            separator: MAIN_SEPARATOR,
        }
    }
}

impl PathFlattener {
    /// Use the platform path separator
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit path separator
    pub fn with_separator(separator: char) -> Self {
        Self { separator }
    }

    /// Separator used to cut segments
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Compute the distinct top-level groups of `directories`
    pub fn flatten<'a, I>(&self, directories: I) -> BTreeSet<TopLevelGroup>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let directories: Vec<&str> = directories.into_iter().collect();
        let prefix = common_prefix(&directories);
        let root = self.package_root(prefix);
        debug!("Flattening {} directories below '{}'", directories.len(), root);

        directories
            .iter()
            .filter_map(|directory| self.group_of(root, directory))
            .collect()
    }

    /// Cut a character-wise prefix back to a whole directory outside any npm scope
    fn package_root<'p>(&self, prefix: &'p str) -> &'p str {
        let mut root = match prefix.rfind(self.separator) {
            Some(at) => &prefix[..at + self.separator.len_utf8()],
            None => return "",
        };

        let parent = &root[..root.len() - self.separator.len_utf8()];
        let segment_start = parent
            .rfind(self.separator)
            .map_or(0, |at| at + self.separator.len_utf8());
        if parent[segment_start..].starts_with('@') {
            root = &root[..segment_start];
        }
        root
    }

    fn group_of(&self, root: &str, directory: &str) -> Option<TopLevelGroup> {
        let rest = directory.get(root.len()..)?;
        let mut end = rest.find(self.separator).unwrap_or(rest.len());

        // `@scope` alone is not a package; take the package below it too
        if rest.starts_with('@') && end < rest.len() {
            let after_scope = end + self.separator.len_utf8();
            end = rest[after_scope..]
                .find(self.separator)
                .map_or(rest.len(), |at| after_scope + at);
        }

        let name = &rest[..end];
        if name.is_empty() {
            return None;
        }

        Some(TopLevelGroup {
            path: format!("{}{}", root, name),
            name: name.to_string(),
        })
    }
}

/// Longest common prefix on character boundaries
fn common_prefix<'a>(values: &[&'a str]) -> &'a str {
    let Some((first, rest)) = values.split_first() else {
        return "";
    };

    let mut len = first.len();
    for value in rest {
        len = first
            .char_indices()
            .zip(value.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((at, c), _)| at + c.len_utf8())
            .min(len);
    }
    &first[..len]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(directories: &[&str]) -> Vec<(String, String)> {
        PathFlattener::with_separator('/')
            .flatten(directories.iter().copied())
            .into_iter()
            .map(|group| (group.path, group.name))
            .collect()
    }

    fn paths(directories: &[&str]) -> Vec<String> {
        flatten(directories).into_iter().map(|(path, _)| path).collect()
    }

    #[test]
    fn test_nested_collapses_to_parent() {
        assert_eq!(
            paths(&["/r/node_modules/a/node_modules/b", "/r/node_modules/a"]),
            vec!["/r/node_modules/a"]
        );
    }

    #[test]
    fn test_siblings_stay_separate() {
        assert_eq!(
            flatten(&[
                "/r/node_modules/uglify-js",
                "/r/node_modules/async",
                "/r/node_modules/source-map",
                "/r/node_modules/amdefine",
            ]),
            vec![
                ("/r/node_modules/amdefine".to_string(), "amdefine".to_string()),
                ("/r/node_modules/async".to_string(), "async".to_string()),
                ("/r/node_modules/source-map".to_string(), "source-map".to_string()),
                ("/r/node_modules/uglify-js".to_string(), "uglify-js".to_string()),
            ]
        );
    }

    #[test]
    fn test_shared_name_prefix_is_not_a_directory() {
        assert_eq!(
            paths(&["/r/node_modules/a", "/r/node_modules/ab/node_modules/c"]),
            vec!["/r/node_modules/a", "/r/node_modules/ab"]
        );
    }

    #[test]
    fn test_single_directory_is_its_own_group() {
        assert_eq!(
            flatten(&["/r/node_modules/a/node_modules/b"]),
            vec![("/r/node_modules/a/node_modules/b".to_string(), "b".to_string())]
        );
    }

    #[test]
    fn test_scoped_packages() {
        assert_eq!(
            flatten(&[
                "/r/node_modules/@babel/core",
                "/r/node_modules/@babel/core/node_modules/debug",
                "/r/node_modules/@babel/parser",
                "/r/node_modules/ms",
            ]),
            vec![
                ("/r/node_modules/@babel/core".to_string(), "@babel/core".to_string()),
                ("/r/node_modules/@babel/parser".to_string(), "@babel/parser".to_string()),
                ("/r/node_modules/ms".to_string(), "ms".to_string()),
            ]
        );
    }

    #[test]
    fn test_common_prefix_inside_scope() {
        assert_eq!(
            paths(&["/r/node_modules/@babel/core", "/r/node_modules/@babel/parser"]),
            vec!["/r/node_modules/@babel/core", "/r/node_modules/@babel/parser"]
        );
        assert_eq!(
            flatten(&["/r/node_modules/@babel/core", "/r/node_modules/@babel/parser"])[0].1,
            "@babel/core"
        );
    }

    #[test]
    fn test_windows_separator() {
        let groups = PathFlattener::with_separator('\\').flatten([
            "C:\\app\\node_modules\\a\\node_modules\\b",
            "C:\\app\\node_modules\\c",
        ]);
        let paths: Vec<&str> = groups.iter().map(|g| g.path.as_str()).collect();
        assert_eq!(paths, vec!["C:\\app\\node_modules\\a", "C:\\app\\node_modules\\c"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(flatten(&[]).is_empty());
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix(&["/r/ab", "/r/ac"]), "/r/a");
        assert_eq!(common_prefix(&["/r/ä", "/r/äb"]), "/r/ä");
        assert_eq!(common_prefix(&["/x", "/y"]), "/");
        assert_eq!(common_prefix(&["x", "y"]), "");
    }
}
