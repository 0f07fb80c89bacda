//! npm process runner

use std::collections::BTreeMap;
use std::process::Stdio;

use camino::{Utf8Path, Utf8PathBuf};
use pluck_config::{PluckToml, ProxyConfig};
use pluck_core::error::PluckError;
use tokio::process::Command;
use tracing::{debug, info};

use crate::NpmResult;

/// Runs npm in a fixed working directory with fixed base arguments
#[derive(Debug, Clone)]
pub struct NpmRunner {
    executable: String,
    working_directory: Utf8PathBuf,
    base_arguments: Vec<String>,
    environment: BTreeMap<String, String>,
}

impl NpmRunner {
    /// Create a runner with no base arguments or extra environment
    pub fn new(executable: impl Into<String>, working_directory: impl Into<Utf8PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            working_directory: working_directory.into(),
            base_arguments: Vec::new(),
            environment: BTreeMap::new(),
        }
    }

    /// Build a runner from pluck.toml, resolving paths against `base_dir`
    pub fn from_config(config: &PluckToml, base_dir: &Utf8Path) -> NpmResult<Self> {
        let base_arguments =
            build_arguments(&config.proxy_config(), config.npm.registry.as_deref())?;

        Ok(Self::new(config.npm.executable.clone(), config.working_directory(base_dir))
            .with_base_arguments(base_arguments)
            .with_environment(config.npm.environment.clone()))
    }

    pub fn with_base_arguments(mut self, arguments: Vec<String>) -> Self {
        self.base_arguments = arguments;
        self
    }

    pub fn with_environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    pub fn working_directory(&self) -> &Utf8Path {
        &self.working_directory
    }

    pub fn base_arguments(&self) -> &[String] {
        &self.base_arguments
    }

    /// Run npm with stdio inherited from pluck
    pub async fn execute(&self, args: &[String]) -> NpmResult<()> {
        info!(
            "Running '{} {}' in {}",
            self.executable,
            args.join(" "),
            self.working_directory
        );

        let status = self
            .command(args)
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !status.success() {
            return Err(PluckError::NpmFailed {
                command: args.join(" "),
                status: status.to_string(),
                stderr: String::new(),
            });
        }

        Ok(())
    }

    /// Run npm and return its standard output
    pub async fn execute_with_result(&self, args: &[String]) -> NpmResult<String> {
        debug!("Capturing '{} {}'", self.executable, args.join(" "));

        let output = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(PluckError::NpmFailed {
                command: args.join(" "),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.executable);
        command
            .current_dir(&self.working_directory)
            .args(&self.base_arguments)
            .args(args)
            .envs(&self.environment)
            .kill_on_drop(true);
        command
    }

    fn spawn_error(&self, source: std::io::Error) -> PluckError {
        PluckError::io(
            format!(
                "Failed to run '{}' in {}",
                self.executable, self.working_directory
            ),
            source,
        )
    }
}

/// Registry and proxy arguments prepended to every npm invocation
pub fn build_arguments(proxies: &ProxyConfig, registry: Option<&str>) -> NpmResult<Vec<String>> {
    let mut arguments = Vec::new();

    if let Some(registry) = registry {
        arguments.push(format!("--registry={}", registry));
    }

    if let Some(proxy) = proxies.select(registry) {
        debug!("Using proxy '{}' for npm", proxy.id);
        let uri = proxy.uri()?;
        arguments.push(format!("--https-proxy={}", uri));
        arguments.push(format!("--proxy={}", uri));
    }

    Ok(arguments)
}
