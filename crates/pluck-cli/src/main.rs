//! # pluck-cli
//!
//! Extracts npm packages, with everything they depend on, into a build output.
//!
//! This is the main entry point for the pluck CLI. It parses arguments, sets up
//! logging and panic reporting, and dispatches to the command handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pluck_core::error::{PluckError, PluckResult};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Copy npm packages and their dependency closure into a build directory
#[derive(Parser)]
#[command(name = "pluck", version, about = "Extract npm packages with their dependencies")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this configuration file instead of searching for pluck.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve packages and copy them into the target directory
    Extract {
        /// Packages as `name` or `name@version` (overrides pluck.toml)
        packages: Vec<String>,
        /// Destination relative to the build directory
        #[arg(long)]
        target_dir: Option<String>,
        /// Build output directory
        #[arg(long)]
        build_dir: Option<String>,
        /// Hardlink files instead of copying
        #[arg(long)]
        hardlink: bool,
    },
    /// Print the top-level directories a set of packages needs
    Resolve {
        /// Packages as `name` or `name@version` (overrides pluck.toml)
        packages: Vec<String>,
        /// Saved `npm ls` output
        #[arg(long, requires = "list_file")]
        tree_file: Option<PathBuf>,
        /// Saved `npm ls --parseable` output
        #[arg(long, requires = "tree_file")]
        list_file: Option<PathBuf>,
        /// Print groups as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run npm with the configured registry and proxy
    Npm {
        /// Arguments passed to npm
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, default_value = "install")]
        args: Vec<String>,
    },
    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    info!("Starting pluck v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&err));
            ExitCode::from(exit_status(&err))
        }
    }
}

/// Inconsistent or unreadable npm reports exit with 2, everything else with 1
fn exit_status(err: &PluckError) -> u8 {
    if err.is_report_error() {
        2
    } else {
        1
    }
}

fn run_cli(cli: Cli) -> PluckResult<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| PluckError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = CommandContext::new(cli.config)?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pluck={level},pluck_core={level},pluck_config={level},pluck_resolver={level},pluck_npm={level},pluck_deploy={level}"
        ))
    });

    // stdout carries command output (e.g. `pluck resolve`)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("pluck encountered an unexpected error: {}", panic_info);
        eprintln!("pluck crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/pluck-rs/pluck/issues");
        eprintln!("Error: {}", panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status() {
        let mismatch = PluckError::LineCountMismatch {
            directories: 3,
            nodes: 4,
        };
        assert_eq!(exit_status(&mismatch), 2);
        assert_eq!(exit_status(&PluckError::malformed(2, "no package name")), 2);

        let missing = PluckError::PackageNotFound {
            name: "left-pad".to_string(),
        };
        assert_eq!(exit_status(&missing), 1);
    }
}
