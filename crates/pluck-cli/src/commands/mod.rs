//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking a [`CommandContext`]. Configuration
//! loading and report capture are shared here.

use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use pluck_config::{ConfigLayering, ConfigLoader, ConfigSource, PluckToml};
use pluck_core::error::{PluckError, PluckResult};
use pluck_npm::{NpmReports, NpmRunner};
use tracing::{debug, info};

pub mod extract;
pub mod npm;
pub mod resolve;

#[cfg(test)]
mod tests;

use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub config_path: Option<Utf8PathBuf>,
    pub output: OutputHandler,
}

/// Effective configuration and the directory its relative paths start from
pub struct LoadedConfig {
    pub config: PluckToml,
    pub base_dir: Utf8PathBuf,
}

impl CommandContext {
    /// Create a context for the process working directory
    pub fn new(config_path: Option<PathBuf>) -> PluckResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| PluckError::io("Failed to get current directory".to_string(), e))?;

        Ok(Self {
            cwd: utf8_path(cwd)?,
            config_path: config_path.map(utf8_path).transpose()?,
            output: OutputHandler::new(),
        })
    }

    /// Load pluck.toml (or defaults) and layer environment and CLI overrides on top
    pub async fn load_config(&self, layering: ConfigLayering) -> PluckResult<LoadedConfig> {
        let loader = ConfigLoader::new(self.cwd.clone());
        let (config, source) = match &self.config_path {
            Some(path) => loader.load_explicit(path).await?,
            None => loader.load_project_config().await?,
        };

        match &source {
            ConfigSource::Defaults => debug!("No pluck.toml found, using defaults"),
            other => debug!("Using configuration from {:?}", other.path()),
        }

        let base_dir = loader.base_dir(&source);
        let config = layering
            .with_env(ConfigLayering::collect_env_overrides())
            .apply(config)?;

        Ok(LoadedConfig { config, base_dir })
    }
}

impl LoadedConfig {
    /// npm runner for the configured install root
    pub fn npm_runner(&self) -> PluckResult<NpmRunner> {
        NpmRunner::from_config(&self.config, &self.base_dir)
    }

    /// Run both `npm ls` reports for the configured install root
    pub async fn capture_reports(&self) -> PluckResult<(String, String)> {
        let reports = NpmReports::new(self.npm_runner()?, self.config.npm.ls_arguments.clone());
        let (tree, directories) = reports.capture().await?;
        info!(
            "Captured npm reports from {}",
            self.config.working_directory(&self.base_dir)
        );
        Ok((tree, directories))
    }
}

/// Override layering for package arguments given on the command line
pub(crate) fn package_overrides(packages: &[String]) -> ConfigLayering {
    if packages.is_empty() {
        ConfigLayering::new()
    } else {
        ConfigLayering::new().with_cli("packages", packages.join(","))
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> PluckResult<()> {
    match command {
        Commands::Extract {
            packages,
            target_dir,
            build_dir,
            hardlink,
        } => {
            info!("Extracting packages: {:?}", packages);
            extract::execute(
                extract::ExtractArgs {
                    packages,
                    target_dir,
                    build_dir,
                    hardlink,
                },
                ctx,
            )
            .await
        }
        Commands::Resolve {
            packages,
            tree_file,
            list_file,
            json,
        } => {
            info!("Resolving packages: {:?}", packages);
            let saved = tree_file.zip(list_file);
            resolve::execute(packages, saved, json, ctx).await
        }
        Commands::Npm { args } => {
            info!("Running npm {:?}", args);
            npm::execute(args, ctx).await
        }
        Commands::Version => show_version(ctx).await,
    }
}

async fn show_version(ctx: &CommandContext) -> PluckResult<()> {
    let target = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    ctx.output.info(&format!("pluck v{}", env!("CARGO_PKG_VERSION")));
    ctx.output.info(&format!("Built: {}", env!("BUILD_DATE")));
    ctx.output.info(&format!("Target: {}", target));
    ctx.output.info(&format!("Rust: {}", env!("RUSTC_VERSION")));

    Ok(())
}

pub(crate) fn utf8_path(path: PathBuf) -> PluckResult<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| {
        PluckError::io(
            format!("Path is not valid UTF-8: {}", path.display()),
            std::io::Error::new(std::io::ErrorKind::InvalidData, "non UTF-8 path"),
        )
    })
}

/// Read a saved report file
pub(crate) async fn read_report(path: &Utf8Path) -> PluckResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PluckError::io(format!("Failed to read {}", path), e))
}
