//! Client configuration.
//!
//! Values are resolved in order of precedence:
//! 1. Explicit values (CLI flags)
//! 2. Environment variables (CATALOG_*)
//! 3. File layer (`[service]` table of the config file)
//! 4. Built-in defaults

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::limits::{resolve_http_limits, EffectiveLimits, LimitSources};

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedClientConfig {
    pub base_url: Url,
    pub user_agent: String,
    pub limits: EffectiveLimits,
    pub sources: LimitSources,
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    pub fn resolve(&self) -> ClientResult<ResolvedClientConfig> {
        self.resolve_layered(&ClientConfig::default())
    }

    pub fn resolve_with<F>(&self, env: F) -> ClientResult<ResolvedClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.resolve_layered_with(&ClientConfig::default(), env)
    }

    /// Resolves `self` as the explicit layer over the process environment
    /// and then `file`.
    pub fn resolve_layered(&self, file: &ClientConfig) -> ClientResult<ResolvedClientConfig> {
        self.resolve_layered_with(file, |name| std::env::var(name).ok())
    }

    pub fn resolve_layered_with<F>(
        &self,
        file: &ClientConfig,
        env: F,
    ) -> ClientResult<ResolvedClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = self
            .base_url
            .clone()
            .or_else(|| env("CATALOG_BASE_URL"))
            .or_else(|| file.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&raw_url)?;

        let user_agent = self
            .user_agent
            .clone()
            .or_else(|| env("CATALOG_USER_AGENT"))
            .or_else(|| file.user_agent.clone())
            .unwrap_or_else(default_user_agent);

        let (limits, sources) = resolve_http_limits(self.timeout_ms, file.timeout_ms, &env);
        Ok(ResolvedClientConfig {
            base_url,
            user_agent,
            limits,
            sources,
        })
    }
}

pub fn default_user_agent() -> String {
    format!("catalog-check/{}", env!("CARGO_PKG_VERSION"))
}

fn parse_base_url(raw: &str) -> ClientResult<Url> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ClientError::InvalidUrl(format!(
            "'{}' must start with http:// or https://",
            trimmed
        )));
    }
    let url = Url::parse(trimmed).map_err(|e| ClientError::InvalidUrl(format!("{trimmed}: {e}")))?;
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ClientError::Config(
            "base url must not carry a query or fragment".into(),
        ));
    }
    Ok(url)
}
