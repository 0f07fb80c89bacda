//! pluck.toml configuration parsing and serialization

use camino::{Utf8Path, Utf8PathBuf};
use pluck_core::error::PluckError;
use pluck_core::types::PackageSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::proxy::{Proxy, ProxyConfig};
use crate::ConfigResult;

/// Complete pluck.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluckToml {
    /// What to extract and where to
    #[serde(default)]
    pub extract: ExtractSection,

    /// How to run npm
    #[serde(default)]
    pub npm: NpmSection,

    /// Proxies handed to npm
    #[serde(default, rename = "proxy", skip_serializing_if = "Vec::is_empty")]
    pub proxies: Vec<Proxy>,
}

/// `[extract]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtractSection {
    /// Requested packages, `name` or `name@version`
    #[serde(default)]
    pub packages: Vec<String>,

    /// Destination, relative to `build-dir`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_dir: Option<Utf8PathBuf>,

    /// Build output directory
    #[serde(default = "default_build_dir")]
    pub build_dir: Utf8PathBuf,

    /// Hardlink files instead of copying them
    #[serde(default)]
    pub hardlink: bool,
}

/// `[npm]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NpmSection {
    /// npm executable name or path
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Install root; defaults to the directory holding pluck.toml
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<Utf8PathBuf>,

    /// Registry passed as `--registry`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,

    /// Extra arguments for both `npm ls` runs.
    ///
    /// Defaults to `--all`: npm 7+ otherwise lists only direct dependencies in
    /// both reports, which still pair up line for line.
    #[serde(default = "default_ls_arguments")]
    pub ls_arguments: Vec<String>,

    /// Additional environment variables for npm
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

fn default_build_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("target")
}

fn default_executable() -> String {
    "npm".to_string()
}

fn default_ls_arguments() -> Vec<String> {
    vec!["--all".to_string()]
}

impl Default for ExtractSection {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            target_dir: None,
            build_dir: default_build_dir(),
            hardlink: false,
        }
    }
}

impl Default for NpmSection {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            working_directory: None,
            registry: None,
            ls_arguments: default_ls_arguments(),
            environment: BTreeMap::new(),
        }
    }
}

impl PluckToml {
    /// Parsed package requests
    pub fn package_specs(&self) -> ConfigResult<Vec<PackageSpec>> {
        self.extract
            .packages
            .iter()
            .map(|package| {
                PackageSpec::parse(package).map_err(|e| PluckError::ConfigValidation {
                    field: "extract.packages".to_string(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    /// Proxies as a selectable set
    pub fn proxy_config(&self) -> ProxyConfig {
        ProxyConfig::new(self.proxies.clone())
    }

    /// Absolute destination: `base/build-dir/target-dir`
    pub fn target_path(&self, base: &Utf8Path) -> ConfigResult<Utf8PathBuf> {
        let target_dir = self
            .extract
            .target_dir
            .as_ref()
            .ok_or_else(|| PluckError::ConfigValidation {
                field: "extract.target-dir".to_string(),
                reason: "No target directory configured".to_string(),
            })?;
        Ok(base.join(&self.extract.build_dir).join(target_dir))
    }

    /// Directory npm runs in
    pub fn working_directory(&self, base: &Utf8Path) -> Utf8PathBuf {
        match &self.npm.working_directory {
            Some(dir) => base.join(dir),
            None => base.to_path_buf(),
        }
    }
}

/// Parse TOML string to PluckToml configuration
pub fn parse_pluck_toml(content: &str) -> ConfigResult<PluckToml> {
    // toml_edit reports syntax errors with line and column
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| PluckError::TomlParse {
            message: format!("TOML syntax error: {}", e),
        })?;

    let config: PluckToml = toml::from_str(content).map_err(|e| PluckError::TomlParse {
        message: format!("TOML parsing error: {}", e),
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Serialize PluckToml to TOML string
pub fn serialize_pluck_toml(config: &PluckToml) -> ConfigResult<String> {
    toml::to_string_pretty(config).map_err(|e| PluckError::TomlParse {
        message: format!("TOML serialization error: {}", e),
    })
}

/// Validate configuration values that serde cannot check
pub fn validate_config(config: &PluckToml) -> ConfigResult<()> {
    config.package_specs()?;

    if config.npm.executable.trim().is_empty() {
        return Err(PluckError::ConfigValidation {
            field: "npm.executable".to_string(),
            reason: "npm executable must not be empty".to_string(),
        });
    }

    if let Some(registry) = &config.npm.registry {
        url::Url::parse(registry).map_err(|e| PluckError::ConfigValidation {
            field: "npm.registry".to_string(),
            reason: format!("Invalid registry URL '{}': {}", registry, e),
        })?;
    }

    if let Some(target_dir) = &config.extract.target_dir {
        if target_dir.as_str().trim().is_empty() {
            return Err(PluckError::ConfigValidation {
                field: "extract.target-dir".to_string(),
                reason: "Target directory must not be empty".to_string(),
            });
        }
    }

    for proxy in &config.proxies {
        proxy.validate()?;
    }

    Ok(())
}

/// Check that everything `pluck extract` needs is present
pub fn validate_for_extract(config: &PluckToml) -> ConfigResult<()> {
    if config.extract.packages.is_empty() {
        return Err(PluckError::ConfigValidation {
            field: "extract.packages".to_string(),
            reason: "No packages to extract".to_string(),
        });
    }
    if config.extract.target_dir.is_none() {
        return Err(PluckError::ConfigValidation {
            field: "extract.target-dir".to_string(),
            reason: "No target directory configured".to_string(),
        });
    }
    validate_config(config)
}

/// Load and parse pluck.toml from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<PluckToml> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PluckError::io(format!("Failed to read {}", path), e))?;

    parse_pluck_toml(&content).map_err(|e| match e {
        PluckError::TomlParse { message } => PluckError::TomlParse {
            message: format!("In file {}: {}", path, message),
        },
        PluckError::ConfigValidation { field, reason } => PluckError::ConfigValidation {
            field,
            reason: format!("In file {}: {}", path, reason),
        },
        other => other,
    })
}
