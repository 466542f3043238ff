//! # Suite Configuration
//!
//! Loaded from multiple sources in order of precedence:
//! 1. Command-line flags
//! 2. Environment variables (CATALOG_*)
//! 3. Configuration file (`--config FILE`, or `catalog.toml` in the working directory)
//! 4. Built-in defaults

use std::fs;
use std::path::{Path, PathBuf};

use catalog_client::{ClientConfig, Credentials};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::suite::RunMode;

pub const DEFAULT_CONFIG_FILE: &str = "catalog.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Where the catalog service lives and how to reach it
    pub service: ClientConfig,

    /// Account used by the auth checks
    pub credentials: CredentialsConfig,

    /// Run mode and retry count
    pub runner: RunnerConfig,

    /// Observed service behavior the checks are pinned to
    pub expectations: Expectations,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub username: String,
    pub password: String,
    pub expires_in_mins: Option<u32>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            username: "emilys".to_string(),
            password: "emilyspass".to_string(),
            expires_in_mins: Some(30),
        }
    }
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("expires_in_mins", &self.expires_in_mins)
            .finish()
    }
}

impl CredentialsConfig {
    pub fn to_credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
            expires_in_mins: self.expires_in_mins,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub mode: Option<RunMode>,
    pub retries: Option<u32>,
}

/// Behavior of the live service that checks assert against. These are
/// observations, several of them suspected service quirks, not contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Expectations {
    pub default_limit: u64,
    pub default_skip: u64,
    pub probe_product_id: u64,
    pub missing_product_id: u64,
    pub search_term: String,
    pub unmatched_search_term: String,
}

impl Default for Expectations {
    fn default() -> Self {
        Self {
            default_limit: 30,
            default_skip: 0,
            probe_product_id: 1,
            missing_product_id: 0,
            search_term: "phone".to_string(),
            unmatched_search_term: "qqqzzzxxx".to_string(),
        }
    }
}

impl SuiteConfig {
    /// Reads `path` when given (it must exist), otherwise `catalog.toml` in
    /// the working directory when present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// CATALOG_USERNAME, CATALOG_PASSWORD and CATALOG_RETRIES override the
    /// file. Service settings are resolved later by the client itself.
    pub fn apply_env_with<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(username) = env("CATALOG_USERNAME").filter(|v| !v.is_empty()) {
            self.credentials.username = username;
        }
        if let Some(password) = env("CATALOG_PASSWORD").filter(|v| !v.is_empty()) {
            self.credentials.password = password;
        }
        if let Some(retries) = env("CATALOG_RETRIES").and_then(|v| v.trim().parse::<u32>().ok()) {
            self.runner.retries = Some(retries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_partial_file_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[service]
base_url = "http://localhost:8089"

[runner]
mode = "open"

[expectations]
search_term = "laptop"
"#
        )
        .unwrap();

        let cfg = SuiteConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.service.base_url.as_deref(), Some("http://localhost:8089"));
        assert_eq!(cfg.runner.mode, Some(RunMode::Open));
        assert_eq!(cfg.expectations.search_term, "laptop");
        assert_eq!(cfg.expectations.default_limit, 30);
        assert_eq!(cfg.credentials.username, "emilys");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SuiteConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[runner]\nretries = \"many\"").unwrap();
        let err = SuiteConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_credentials_and_retries() {
        let mut cfg = SuiteConfig::default();
        cfg.apply_env_with(|name| match name {
            "CATALOG_USERNAME" => Some("kminchelle".to_string()),
            "CATALOG_RETRIES" => Some("4".to_string()),
            "CATALOG_PASSWORD" => Some(String::new()),
            _ => None,
        });
        assert_eq!(cfg.credentials.username, "kminchelle");
        assert_eq!(cfg.credentials.password, "emilyspass");
        assert_eq!(cfg.runner.retries, Some(4));
    }

    #[test]
    fn env_base_url_beats_file_service_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[service]\nbase_url = \"http://from-file\"\ntimeout_ms = 2500").unwrap();
        let cfg = SuiteConfig::load(Some(file.path())).unwrap();

        let env = |name: &str| match name {
            "CATALOG_BASE_URL" => Some("http://from-env".to_string()),
            _ => None,
        };
        let resolved = ClientConfig::default()
            .resolve_layered_with(&cfg.service, env)
            .unwrap();
        assert_eq!(resolved.base_url.host_str(), Some("from-env"));
        assert_eq!(resolved.limits.timeout_ms, 2500);
        assert_eq!(resolved.sources.timeout_ms, "file");
    }

    #[test]
    fn debug_hides_password() {
        let out = format!("{:?}", SuiteConfig::default());
        assert!(!out.contains("emilyspass"));
    }
}
