//! Process supervision models
//!
//! Commands are dispatched through the backend, which relays them to the
//! agent running on the target server.

use crate::auth::permission::PermissionAction;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Remote command kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessCommand {
    #[serde(rename = "PM2_LIST")]
    Pm2List,
    #[serde(rename = "PM2_START")]
    Pm2Start,
    #[serde(rename = "PM2_STOP")]
    Pm2Stop,
    #[serde(rename = "PM2_RESTART")]
    Pm2Restart,
}

impl ProcessCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessCommand::Pm2List => "PM2_LIST",
            ProcessCommand::Pm2Start => "PM2_START",
            ProcessCommand::Pm2Stop => "PM2_STOP",
            ProcessCommand::Pm2Restart => "PM2_RESTART",
        }
    }

    /// Permission that gates the command in the UI
    pub fn required_permission(self) -> PermissionAction {
        match self {
            ProcessCommand::Pm2List => PermissionAction::ProcessView,
            ProcessCommand::Pm2Start => PermissionAction::ProcessStart,
            ProcessCommand::Pm2Stop => PermissionAction::ProcessStop,
            ProcessCommand::Pm2Restart => PermissionAction::ProcessRestart,
        }
    }
}

impl fmt::Display for ProcessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PM2_LIST" | "LIST" => Ok(ProcessCommand::Pm2List),
            "PM2_START" | "START" => Ok(ProcessCommand::Pm2Start),
            "PM2_STOP" | "STOP" => Ok(ProcessCommand::Pm2Stop),
            "PM2_RESTART" | "RESTART" => Ok(ProcessCommand::Pm2Restart),
            _ => Err(format!("Unknown process command: {}", s)),
        }
    }
}

/// Target of a start/stop/restart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandPayload {
    pub app: String,
    #[serde(default)]
    pub options: String,
    #[serde(default)]
    pub script: String,
}

impl CommandPayload {
    pub fn for_app(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            ..Default::default()
        }
    }
}

/// Body of `POST /server/command`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    #[serde(rename = "type")]
    pub command: ProcessCommand,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<CommandPayload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Online,
    Stopped,
    Errored,
    Stopping,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessLogs {
    #[serde(default)]
    pub out: String,
    #[serde(default)]
    pub error: String,
}

/// One supervised process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEntry {
    pub pm_id: u32,
    pub name: String,
    pub pid: u32,
    pub status: ProcessStatus,
    /// Milliseconds
    pub uptime: u64,
    pub restarts: u32,
    pub cpu: f64,
    /// Bytes
    pub memory: u64,
    pub exec_mode: String,
    pub instances: u32,
    pub node_version: String,
    #[serde(default)]
    pub logs: ProcessLogs,
}

/// Reply to `PM2_LIST`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    #[serde(default)]
    pub result: Vec<ProcessEntry>,
    pub status: String,
}

impl ProcessInfo {
    pub fn online(&self) -> impl Iterator<Item = &ProcessEntry> {
        self.result
            .iter()
            .filter(|p| p.status == ProcessStatus::Online)
    }
}
