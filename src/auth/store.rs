//! Selected-team persistence
//!
//! The last selected team id survives restarts through a [`SelectionStore`].
//! Failures here are never fatal to callers; the context logs and moves on.

use crate::utils::error::{ConsoleError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// Key the selected team id is stored under
pub const SELECTED_TEAM_KEY: &str = "hosten:selectedTeamId";

/// Where the selected team id is kept between runs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SelectionStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>>;

    async fn save(&self, team_id: &str) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemorySelectionStore {
    value: RwLock<Option<String>>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a selection
    pub fn with_selection(team_id: impl Into<String>) -> Self {
        Self {
            value: RwLock::new(Some(team_id.into())),
        }
    }
}

#[async_trait]
impl SelectionStore for MemorySelectionStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.value.read().clone())
    }

    async fn save(&self, team_id: &str) -> Result<()> {
        *self.value.write() = Some(team_id.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.value.write() = None;
        Ok(())
    }
}

/// JSON key/value file, shared with other console state
#[derive(Debug)]
pub struct FileSelectionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                ConsoleError::storage(format!(
                    "Failed to parse state file {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(ConsoleError::storage(format!(
                "Failed to read state file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                ConsoleError::storage(format!("Failed to create state directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, content).await.map_err(|e| {
            ConsoleError::storage(format!(
                "Failed to write state file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl SelectionStore for FileSelectionStore {
    async fn load(&self) -> Result<Option<String>> {
        let map = self.read_map().await?;
        Ok(map.get(SELECTED_TEAM_KEY).cloned())
    }

    async fn save(&self, team_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(SELECTED_TEAM_KEY.to_string(), team_id.to_string());
        self.write_map(&map).await?;
        debug!("Persisted selected team {}", team_id);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(SELECTED_TEAM_KEY).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}
