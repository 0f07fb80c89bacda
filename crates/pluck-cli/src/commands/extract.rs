//! `pluck extract` command implementation.
//!
//! Captures both npm reports, resolves the requested packages and copies the
//! resulting top-level directories into `<build-dir>/<target-dir>`.

use std::time::Instant;

use pluck_config::toml::validate_for_extract;
use pluck_core::error::PluckResult;
use pluck_deploy::{DeployMode, Deployer};
use pluck_resolver::Resolver;

use super::{package_overrides, CommandContext};

/// Flags accepted by `pluck extract`
pub struct ExtractArgs {
    pub packages: Vec<String>,
    pub target_dir: Option<String>,
    pub build_dir: Option<String>,
    pub hardlink: bool,
}

/// Execute the `pluck extract` command
pub async fn execute(args: ExtractArgs, ctx: &CommandContext) -> PluckResult<()> {
    let start_time = Instant::now();

    let mut layering = package_overrides(&args.packages);
    if let Some(target_dir) = args.target_dir {
        layering = layering.with_cli("target-dir", target_dir);
    }
    if let Some(build_dir) = args.build_dir {
        layering = layering.with_cli("build-dir", build_dir);
    }
    if args.hardlink {
        layering = layering.with_cli("hardlink", "true");
    }

    let loaded = ctx.load_config(layering).await?;
    validate_for_extract(&loaded.config)?;
    let target = loaded.config.target_path(&loaded.base_dir)?;

    ctx.output.step("🔍", "Reading npm dependency reports");
    let (tree_text, directory_text) = loaded.capture_reports().await?;

    ctx.output.step("🧮", "Resolving dependencies");
    let resolver = Resolver::from_reports(&tree_text, &directory_text)?;
    let groups = resolver.resolve(&loaded.config.extract.packages)?;

    let mode = if loaded.config.extract.hardlink {
        DeployMode::Hardlink
    } else {
        DeployMode::Copy
    };

    ctx.output.step("📦", &format!("Copying {} packages to {}", groups.len(), target));
    let result = Deployer::new(mode).deploy(&groups, target.as_std_path())?;

    if mode == DeployMode::Hardlink && result.files_copied > 0 {
        ctx.output.warn(&format!(
            "{} files could not be hardlinked and were copied",
            result.files_copied
        ));
    }

    ctx.output.success(&format!(
        "Extracted {} packages ({} files copied, {} hardlinked) in {:.2?}",
        result.groups_copied,
        result.files_copied,
        result.hardlinks_created,
        start_time.elapsed()
    ));

    Ok(())
}
