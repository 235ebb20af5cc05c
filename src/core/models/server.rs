//! Server models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment a registered server reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerEnvironment {
    Testing,
    Production,
    Staging,
    Development,
}

/// Runtime metrics pushed by the server agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMetrics {
    /// Seconds
    pub uptime: f64,
    /// Bytes
    pub memory: u64,
    /// Milliseconds since the epoch
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub name: String,
    pub environment: ServerEnvironment,
    pub host: String,
    pub client_id: String,
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ServerMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    pub servers: Vec<Server>,
}

/// Environment chosen when registering a server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployEnvironment {
    Prod,
    Staging,
    Dev,
    Testing,
}

impl DeployEnvironment {
    pub const ALL: [DeployEnvironment; 4] = [
        DeployEnvironment::Prod,
        DeployEnvironment::Staging,
        DeployEnvironment::Dev,
        DeployEnvironment::Testing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeployEnvironment::Prod => "prod",
            DeployEnvironment::Staging => "staging",
            DeployEnvironment::Dev => "dev",
            DeployEnvironment::Testing => "testing",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeployEnvironment::Prod => "Production",
            DeployEnvironment::Staging => "Staging",
            DeployEnvironment::Dev => "Development",
            DeployEnvironment::Testing => "Testing",
        }
    }
}

impl fmt::Display for DeployEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeployEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeployEnvironment::ALL
            .iter()
            .copied()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| format!("Unknown environment: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateServerPayload {
    pub name: String,
    pub environment: DeployEnvironment,
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Credentials the agent on the new server connects with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerResponse {
    pub client_id: String,
    pub client_secret: String,
}
