//! Proxy settings passed through to npm.
//!
//! npm takes a single `--proxy`/`--https-proxy` pair, so one proxy is picked
//! for the registry URL: a protocol match whose non-proxy hosts do not cover
//! the registry host, else the first secure proxy, else the first insecure one.

use pluck_core::error::PluckError;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::ConfigResult;

/// One `[[proxy]]` entry from pluck.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Proxy {
    /// Name used in log messages
    pub id: String,
    /// `http` or `https`
    pub protocol: String,
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// `|`-separated host patterns, `*` allowed at either end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_proxy_hosts: Option<String>,
}

impl Proxy {
    /// Whether this proxy is reached over TLS
    pub fn is_secure(&self) -> bool {
        self.protocol.eq_ignore_ascii_case("https")
    }

    /// Proxy URI in the form npm expects, credentials included.
    ///
    /// The port is always written out, even when it is the protocol default.
    pub fn uri(&self) -> ConfigResult<String> {
        let mut url = Url::parse(&format!(
            "{}://{}:{}",
            self.protocol.to_ascii_lowercase(),
            self.host,
            self.port
        ))
        .map_err(|e| self.invalid(format!("invalid proxy address: {}", e)))?;

        if let Some(username) = &self.username {
            url.set_username(username)
                .map_err(|_| self.invalid("proxy username cannot be set".to_string()))?;
            url.set_password(self.password.as_deref())
                .map_err(|_| self.invalid("proxy password cannot be set".to_string()))?;
        }

        let host = url
            .host_str()
            .ok_or_else(|| self.invalid("proxy host is missing".to_string()))?;
        let credentials = match (url.username(), url.password()) {
            ("", _) => String::new(),
            (username, Some(password)) => format!("{}:{}@", username, password),
            (username, None) => format!("{}@", username),
        };

        Ok(format!(
            "{}://{}{}:{}",
            url.scheme(),
            credentials,
            host,
            self.port
        ))
    }

    /// Check whether requests to `host` should bypass this proxy
    pub fn is_non_proxy_host(&self, host: &str) -> bool {
        let Some(patterns) = &self.non_proxy_hosts else {
            return false;
        };

        patterns
            .split('|')
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
            .any(|pattern| host_matches(pattern, host))
    }

    /// Validate protocol and address
    pub fn validate(&self) -> ConfigResult<()> {
        if !matches!(self.protocol.to_ascii_lowercase().as_str(), "http" | "https") {
            return Err(self.invalid(format!(
                "unsupported protocol '{}' (expected http or https)",
                self.protocol
            )));
        }
        if self.host.trim().is_empty() {
            return Err(self.invalid("host is empty".to_string()));
        }
        self.uri().map(|_| ())
    }

    fn invalid(&self, reason: String) -> PluckError {
        PluckError::ConfigValidation {
            field: format!("proxy.{}", self.id),
            reason,
        }
    }
}

fn host_matches(pattern: &str, host: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let host = host.to_ascii_lowercase();

    if let Some(suffix) = pattern.strip_prefix('*') {
        host.ends_with(suffix)
    } else if let Some(prefix) = pattern.strip_suffix('*') {
        host.starts_with(prefix)
    } else {
        host == pattern
    }
}

/// All configured proxies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    proxies: Vec<Proxy>,
}

impl ProxyConfig {
    /// Create from the configured proxies, in file order
    pub fn new(proxies: Vec<Proxy>) -> Self {
        Self { proxies }
    }

    /// Whether no proxy is configured
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Proxy for requests to `url`, if one applies
    pub fn proxy_for_url(&self, url: &str) -> Option<&Proxy> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        let secure = parsed.scheme() == "https";

        self.proxies
            .iter()
            .find(|proxy| proxy.is_secure() == secure && !proxy.is_non_proxy_host(host))
    }

    /// First `https` proxy
    pub fn secure_proxy(&self) -> Option<&Proxy> {
        self.proxies.iter().find(|proxy| proxy.is_secure())
    }

    /// First `http` proxy
    pub fn insecure_proxy(&self) -> Option<&Proxy> {
        self.proxies.iter().find(|proxy| !proxy.is_secure())
    }

    /// Proxy to hand to npm given an optional registry URL
    pub fn select(&self, registry: Option<&str>) -> Option<&Proxy> {
        registry
            .and_then(|url| self.proxy_for_url(url))
            .or_else(|| self.secure_proxy())
            .or_else(|| self.insecure_proxy())
    }
}
