//! Configuration management for the console
//!
//! Settings come from a YAML file and from `HOSTEN_*` environment variables.
//! Environment values are merged over the file.

pub mod models;

pub use models::*;

use crate::sdk::{ClientConfig, ConfigBuilder};
use crate::utils::error::{ConsoleError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the console
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConsoleError::config(format!("Failed to read config file: {}", e)))?;

        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| ConsoleError::config(format!("Failed to parse config: {}", e)))?
        };

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(url) = std::env::var("HOSTEN_API_URL") {
            config.api.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(timeout) = std::env::var("HOSTEN_API_TIMEOUT") {
            config.api.timeout_secs = timeout.trim().parse().map_err(|e| {
                ConsoleError::config(format!("Invalid HOSTEN_API_TIMEOUT {:?}: {}", timeout, e))
            })?;
        }
        if let Ok(cookie) = std::env::var("HOSTEN_SESSION") {
            if !cookie.is_empty() {
                config.api.session_cookie = Some(cookie);
            }
        }
        if let Ok(path) = std::env::var("HOSTEN_STATE_FILE") {
            config.storage.state_file = path;
        }
        if let Ok(level) = std::env::var("HOSTEN_LOG_LEVEL") {
            config.logging.level = level.to_lowercase();
        }
        if let Ok(json) = std::env::var("HOSTEN_LOG_JSON") {
            config.logging.json = matches!(json.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        let parsed = url::Url::parse(&self.api.base_url).map_err(|e| {
            ConsoleError::config(format!("Invalid api.base_url {}: {}", self.api.base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConsoleError::config(format!(
                "api.base_url must use http or https, got {}",
                parsed.scheme()
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConsoleError::config("api.timeout_secs must be greater than 0"));
        }

        if self.storage.state_file.trim().is_empty() {
            return Err(ConsoleError::config("storage.state_file must not be empty"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConsoleError::config(format!(
                "Unknown log level {:?}, expected one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        self.api = self.api.merge(other.api);
        self.storage = self.storage.merge(other.storage);
        self.logging = self.logging.merge(other.logging);
        self
    }

    /// Client settings for [`crate::sdk::ApiClient`]
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut builder = ConfigBuilder::new()
            .base_url(&self.api.base_url)
            .timeout(self.api.timeout_secs)
            .user_agent(&format!("{}/{}", crate::NAME, crate::VERSION));
        if let Some(cookie) = &self.api.session_cookie {
            builder = builder.cookie(cookie);
        }
        Ok(builder.build()?)
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConsoleError::config(format!("Failed to serialize config to JSON: {}", e)))
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| ConsoleError::config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
