//! `pluck resolve` command implementation.
//!
//! Prints the top-level directories the requested packages need, either from
//! live `npm ls` output or from a saved pair of reports.

use std::path::PathBuf;

use pluck_core::error::{PluckError, PluckResult};
use pluck_resolver::{Resolver, TopLevelGroup};

use super::{package_overrides, read_report, utf8_path, CommandContext};

/// Execute the `pluck resolve` command
pub async fn execute(
    packages: Vec<String>,
    saved_reports: Option<(PathBuf, PathBuf)>,
    json: bool,
    ctx: &CommandContext,
) -> PluckResult<()> {
    let loaded = ctx.load_config(package_overrides(&packages)).await?;

    if loaded.config.extract.packages.is_empty() {
        return Err(PluckError::ConfigValidation {
            field: "extract.packages".to_string(),
            reason: "No packages to resolve".to_string(),
        });
    }

    let (tree_text, directory_text) = match saved_reports {
        Some((tree_file, list_file)) => {
            let tree_file = ctx.cwd.join(utf8_path(tree_file)?);
            let list_file = ctx.cwd.join(utf8_path(list_file)?);
            (read_report(&tree_file).await?, read_report(&list_file).await?)
        }
        None => loaded.capture_reports().await?,
    };

    let resolver = Resolver::from_reports(&tree_text, &directory_text)?;
    let groups = resolver.resolve(&loaded.config.extract.packages)?;

    ctx.output.plain(&render(groups.iter(), json)?);

    Ok(())
}

/// One path per line, or a JSON array of `{ "path", "name" }`
pub(crate) fn render<'a, I>(groups: I, json: bool) -> PluckResult<String>
where
    I: IntoIterator<Item = &'a TopLevelGroup>,
{
    if json {
        let values: Vec<_> = groups
            .into_iter()
            .map(|group| serde_json::json!({ "path": group.path, "name": group.name }))
            .collect();
        serde_json::to_string_pretty(&values).map_err(|e| {
            PluckError::io(
                "Failed to render JSON".to_string(),
                std::io::Error::new(std::io::ErrorKind::Other, e),
            )
        })
    } else {
        Ok(groups
            .into_iter()
            .map(|group| group.path.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
