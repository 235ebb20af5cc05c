//! Team authorization
//!
//! The permission catalog, the role to permission table with its predicates,
//! and the context that resolves the current user's permissions for the
//! selected team.

pub mod context;
pub mod permission;
pub mod rbac;
pub mod store;

// Re-export commonly used types
pub use context::{AuthorizationSnapshot, LoadState, SelectionOutcome, TeamContext};
pub use permission::{PermissionAction, PermissionScope, describe, display_label};
pub use rbac::{
    PermissionSet, TeamRole, default_permissions, has_all_permissions, has_any_permission,
    has_permission, has_role,
};
pub use store::{FileSelectionStore, MemorySelectionStore, SELECTED_TEAM_KEY, SelectionStore};
