//! Capture of the two `npm ls` reports.
//!
//! Both runs share the runner's working directory and the same extra
//! arguments, so the tree and the directory list describe the same install
//! and line up one-to-one.

use crate::{NpmResult, NpmRunner};

/// Produces the dependency tree and directory list for one install root
#[derive(Debug, Clone)]
pub struct NpmReports {
    runner: NpmRunner,
    ls_arguments: Vec<String>,
}

impl NpmReports {
    pub fn new(runner: NpmRunner, ls_arguments: Vec<String>) -> Self {
        Self {
            runner,
            ls_arguments,
        }
    }

    /// Box-drawn tree from `npm ls`
    pub async fn dependency_tree_text(&self) -> NpmResult<String> {
        self.runner.execute_with_result(&self.ls_command(false)).await
    }

    /// One absolute directory per line from `npm ls --parseable`
    pub async fn directory_list_text(&self) -> NpmResult<String> {
        self.runner.execute_with_result(&self.ls_command(true)).await
    }

    /// Both reports, tree first
    pub async fn capture(&self) -> NpmResult<(String, String)> {
        let tree = self.dependency_tree_text().await?;
        let directories = self.directory_list_text().await?;
        Ok((tree, directories))
    }

    fn ls_command(&self, parseable: bool) -> Vec<String> {
        let mut args = vec![
            "ls".to_string(),
            "--parseable".to_string(),
            parseable.to_string(),
            "--json".to_string(),
            "false".to_string(),
        ];
        args.extend(self.ls_arguments.iter().cloned());
        args
    }
}
