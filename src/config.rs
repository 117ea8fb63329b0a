//! Provider configuration
//!
//! Replaces the untyped provider meta of the plugin host with an explicit
//! struct handed to every operation.

use crate::error::{ProviderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable holding the default API token
pub const TOKEN_ENV: &str = "SLACK_TOKEN";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "SLACK_API_URL";

/// Default Slack Web API base URL
pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Default `limit` requested per `conversations.list` page
pub const DEFAULT_PAGE_LIMIT: u32 = 200;

/// Largest `limit` Slack accepts for `conversations.list`
pub const MAX_PAGE_LIMIT: u32 = 1000;

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

/// Slack provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Bot or user OAuth token, sent as `Authorization: Bearer <token>`
    #[serde(default)]
    pub token: String,

    /// Base URL of the Slack Web API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Page size requested from `conversations.list`
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: default_api_url(),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("page_limit", &self.page_limit)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a configuration for a token with default settings
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    /// Point the client at a different API base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the `conversations.list` page size
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Build a configuration from `SLACK_TOKEN` and `SLACK_API_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_value(serde_json::Value::Object(Default::default()))
    }

    /// Build a configuration from the host-supplied provider block
    ///
    /// A missing or empty `token` falls back to `SLACK_TOKEN`, and a missing
    /// `api_url` to `SLACK_API_URL`.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Self::resolve(value, |key| std::env::var(key).ok())
    }

    fn resolve(
        value: serde_json::Value,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let explicit_url = value.get("api_url").is_some_and(|v| !v.is_null());
        let value = if value.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            value
        };
        let mut config: Self = serde_json::from_value(value)
            .map_err(|e| ProviderError::Config(format!("Invalid provider block: {}", e)))?;

        if config.token.is_empty() {
            if let Some(token) = env(TOKEN_ENV) {
                config.token = token;
            }
        }
        if !explicit_url {
            if let Some(url) = env(API_URL_ENV).filter(|u| !u.is_empty()) {
                config.api_url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(ProviderError::Config(format!(
                "token is required (set it in the provider block or via {})",
                TOKEN_ENV
            )));
        }
        if self.api_url.is_empty() {
            return Err(ProviderError::Config("api_url cannot be empty".to_string()));
        }
        if self.page_limit == 0 || self.page_limit > MAX_PAGE_LIMIT {
            return Err(ProviderError::Config(format!(
                "page_limit must be between 1 and {}, got {}",
                MAX_PAGE_LIMIT, self.page_limit
            )));
        }
        Ok(())
    }

    /// Full URL for a Web API method (e.g., `conversations.list`)
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::new("xoxb-test");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.page_limit, DEFAULT_PAGE_LIMIT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_explicit_token() {
        let config =
            ProviderConfig::resolve(serde_json::json!({"token": "xoxb-1"}), no_env).unwrap();
        assert_eq!(config.token, "xoxb-1");
    }

    #[test]
    fn test_resolve_env_fallback() {
        let env = |key: &str| match key {
            TOKEN_ENV => Some("xoxb-env".to_string()),
            API_URL_ENV => Some("http://localhost:9999/api".to_string()),
            _ => None,
        };
        let config = ProviderConfig::resolve(serde_json::Value::Null, env).unwrap();
        assert_eq!(config.token, "xoxb-env");
        assert_eq!(config.api_url, "http://localhost:9999/api");
    }

    #[test]
    fn test_resolve_explicit_url_wins_over_env() {
        let env = |key: &str| match key {
            API_URL_ENV => Some("http://env/api".to_string()),
            _ => None,
        };
        let config = ProviderConfig::resolve(
            serde_json::json!({"token": "t", "api_url": "http://explicit/api"}),
            env,
        )
        .unwrap();
        assert_eq!(config.api_url, "http://explicit/api");
    }

    #[test]
    fn test_from_env_reads_token() {
        std::env::set_var(TOKEN_ENV, "xoxb-from-env");
        let config = ProviderConfig::from_env().unwrap();
        assert_eq!(config.token, "xoxb-from-env");
    }

    #[test]
    fn test_missing_token_fails() {
        let err = ProviderConfig::resolve(serde_json::json!({}), no_env).unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
    }

    #[test]
    fn test_page_limit_bounds() {
        assert!(ProviderConfig::new("t").with_page_limit(0).validate().is_err());
        assert!(ProviderConfig::new("t").with_page_limit(1001).validate().is_err());
        assert!(ProviderConfig::new("t").with_page_limit(1000).validate().is_ok());
    }

    #[test]
    fn test_method_url() {
        let config = ProviderConfig::new("t").with_api_url("http://127.0.0.1:8080/api/");
        assert_eq!(
            config.method_url("conversations.list"),
            "http://127.0.0.1:8080/api/conversations.list"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", ProviderConfig::new("xoxb-secret"));
        assert!(!rendered.contains("xoxb-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
