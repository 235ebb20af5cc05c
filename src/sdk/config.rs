//! Client configuration

use crate::sdk::errors::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backend address used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5450";

/// Connection settings for [`ApiClient`](crate::sdk::ApiClient)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend root, without trailing slash
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Session cookie forwarded as the `Cookie` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
    /// `User-Agent` header, reqwest's default when unset
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: 30,
            cookie: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Join an endpoint path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Configuration from `HOSTEN_API_URL`, `HOSTEN_API_TIMEOUT` and `HOSTEN_SESSION`
    pub fn from_env() -> Result<Self> {
        let mut builder = ConfigBuilder::new();

        if let Ok(url) = std::env::var("HOSTEN_API_URL") {
            builder = builder.base_url(&url);
        }

        if let Ok(timeout) = std::env::var("HOSTEN_API_TIMEOUT") {
            let secs = timeout.parse::<u64>().map_err(|e| {
                ApiError::Config(format!("Invalid HOSTEN_API_TIMEOUT {:?}: {}", timeout, e))
            })?;
            builder = builder.timeout(secs);
        }

        if let Ok(cookie) = std::env::var("HOSTEN_SESSION") {
            builder = builder.cookie(&cookie);
        }

        builder.build()
    }
}

/// Builder for [`ClientConfig`]
pub struct ConfigBuilder {
    config: ClientConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Request timeout in seconds
    pub fn timeout(mut self, timeout: u64) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn cookie(mut self, cookie: &str) -> Self {
        self.config.cookie = Some(cookie.to_string());
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.config.user_agent = Some(user_agent.to_string());
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<ClientConfig> {
        let parsed = url::Url::parse(&self.config.base_url).map_err(|e| {
            ApiError::Config(format!("Invalid base URL {}: {}", self.config.base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }
        if self.config.timeout == 0 {
            return Err(ApiError::Config("Timeout must be greater than 0".to_string()));
        }
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
