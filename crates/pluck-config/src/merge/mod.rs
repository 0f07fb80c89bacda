//! Configuration discovery, environment overrides and CLI overrides

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use pluck_core::error::PluckError;

use crate::toml::PluckToml;
use crate::{ConfigResult, CONFIG_FILE_NAME};

/// Prefix for environment overrides
const ENV_PREFIX: &str = "PLUCK_";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// pluck.toml found in the working directory or one of its parents
    ProjectToml(Utf8PathBuf),
    /// File given with `--config`
    Explicit(Utf8PathBuf),
    /// No file; built-in defaults
    Defaults,
}

impl ConfigSource {
    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            ConfigSource::ProjectToml(path) | ConfigSource::Explicit(path) => Some(path),
            ConfigSource::Defaults => None,
        }
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Working directory the loader searches from
    pub fn cwd(&self) -> &Utf8Path {
        &self.cwd
    }

    /// Find pluck.toml in the working directory or its ancestors
    pub fn resolve_config_path(&self) -> Option<Utf8PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|path| path.is_file())
    }

    /// Load the project configuration, falling back to defaults
    pub async fn load_project_config(&self) -> ConfigResult<(PluckToml, ConfigSource)> {
        match self.resolve_config_path() {
            Some(path) => {
                let config = crate::toml::load_from_file(&path).await?;
                Ok((config, ConfigSource::ProjectToml(path)))
            }
            None => Ok((PluckToml::default(), ConfigSource::Defaults)),
        }
    }

    /// Load a specific file; unlike discovery, a missing file is an error
    pub async fn load_explicit(&self, path: &Utf8Path) -> ConfigResult<(PluckToml, ConfigSource)> {
        let path = self.cwd.join(path);
        let config = crate::toml::load_from_file(&path).await?;
        Ok((config, ConfigSource::Explicit(path)))
    }

    /// Directory relative paths in the configuration are resolved against
    pub fn base_dir(&self, source: &ConfigSource) -> Utf8PathBuf {
        source
            .path()
            .and_then(Utf8Path::parent)
            .map(Utf8Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone())
    }
}

/// Environment and command line overrides layered over a loaded file
#[derive(Debug, Clone, Default)]
pub struct ConfigLayering {
    /// Environment overrides
    env_overrides: HashMap<String, String>,
    /// CLI flag overrides
    cli_overrides: HashMap<String, String>,
}

impl ConfigLayering {
    /// Create an empty layering
    pub fn new() -> Self {
        Self::default()
    }

    /// Use these environment overrides (see [`ConfigLayering::collect_env_overrides`])
    pub fn with_env(mut self, env_overrides: HashMap<String, String>) -> Self {
        self.env_overrides = env_overrides;
        self
    }

    /// Set one CLI override
    pub fn with_cli(mut self, key: &str, value: impl Into<String>) -> Self {
        self.cli_overrides.insert(key.to_string(), value.into());
        self
    }

    /// Apply environment then CLI overrides and revalidate
    pub fn apply(&self, mut config: PluckToml) -> ConfigResult<PluckToml> {
        Self::apply_env_overrides(&mut config, &self.env_overrides);
        Self::apply_cli_overrides(&mut config, &self.cli_overrides)?;
        crate::toml::validate_config(&config)?;
        Ok(config)
    }

    fn apply_env_overrides(config: &mut PluckToml, overrides: &HashMap<String, String>) {
        for (key, value) in overrides {
            match key.as_str() {
                "PLUCK_NPM_EXECUTABLE" => config.npm.executable = value.clone(),
                "PLUCK_REGISTRY" => config.npm.registry = Some(value.clone()),
                "PLUCK_TARGET_DIR" => config.extract.target_dir = Some(value.into()),
                "PLUCK_BUILD_DIR" => config.extract.build_dir = value.into(),
                "PLUCK_PACKAGES" => config.extract.packages = split_list(value),
                _ => {
                    // Unknown environment variable, ignore
                }
            }
        }
    }

    fn apply_cli_overrides(
        config: &mut PluckToml,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "packages" => config.extract.packages = split_list(value),
                "target-dir" => config.extract.target_dir = Some(value.into()),
                "build-dir" => config.extract.build_dir = value.into(),
                "hardlink" => {
                    config.extract.hardlink =
                        value.parse().map_err(|_| PluckError::ConfigValidation {
                            field: "hardlink".to_string(),
                            reason: format!("Expected true or false, got '{}'", value),
                        })?;
                }
                "npm-executable" => config.npm.executable = value.clone(),
                "registry" => config.npm.registry = Some(value.clone()),
                _ => {
                    // Unknown CLI override, ignore
                }
            }
        }

        Ok(())
    }

    /// Collect `PLUCK_*` environment variables
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
