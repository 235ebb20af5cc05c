//! # Hosten Console
//!
//! Client-side core of the Hosten server-management dashboard.
//!
//! Users belong to teams and hold a role in each. This crate resolves the
//! permissions the current user has in the selected team and exposes
//! predicates the front-end uses to show or hide actions. The backend stays
//! authoritative; every check here is advisory.
//!
//! ## Features
//!
//! - **Permission catalog**: the 19 `scope:verb` actions with labels
//! - **Role table**: owner, admin, member and viewer defaults
//! - **Team context**: race-free team selection with persisted choice
//! - **Backend SDK**: typed REST client plus an in-memory mock backend
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hosten_console::{AlertBus, MemorySelectionStore, MockTeamBackend, PermissionAction, TeamContext};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let context = TeamContext::new(
//!         Arc::new(MockTeamBackend::new()),
//!         Arc::new(MemorySelectionStore::new()),
//!         AlertBus::new(),
//!     );
//!     context.initialize().await;
//!
//!     if context.can(PermissionAction::ServerCreate) {
//!         println!("You can add servers to {:?}", context.selected_team_id());
//!     }
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod core;
pub mod sdk;
pub mod utils;

// Re-export main types
pub use auth::{
    AuthorizationSnapshot, FileSelectionStore, LoadState, MemorySelectionStore, PermissionAction,
    PermissionScope, PermissionSet, SelectionOutcome, SelectionStore, TeamContext, TeamRole,
};
pub use config::Config;
pub use crate::core::{Alert, AlertBus, AlertKind, AlertReceiver};
pub use sdk::{ApiClient, ApiError, ErrorClass, MockTeamBackend, TeamService};
pub use utils::error::{ConsoleError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Console build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build timestamp (unix seconds)
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: option_env!("BUILD_TIME").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        }
    }
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.version, self.git_hash)
    }
}

/// Version and provenance of this build
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
