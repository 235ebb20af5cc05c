//! Permission catalog
//!
//! The closed set of permission actions a team member can hold, grouped by
//! the resource scope they apply to. Labels and descriptions only drive
//! rendering of permission checklists; they never take part in a check.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource category a permission action applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionScope {
    /// Team settings and membership
    Team,
    /// Registered servers
    Server,
    /// Processes supervised on a server
    Process,
}

impl PermissionScope {
    /// All scopes in display order
    pub const ALL: [PermissionScope; 3] = [
        PermissionScope::Team,
        PermissionScope::Server,
        PermissionScope::Process,
    ];

    /// Wire prefix of the scope
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionScope::Team => "team",
            PermissionScope::Server => "server",
            PermissionScope::Process => "process",
        }
    }

    /// Catalog group for this scope
    pub fn group(self) -> &'static PermissionGroup {
        match self {
            PermissionScope::Team => &PERMISSION_GROUPS[0],
            PermissionScope::Server => &PERMISSION_GROUPS[1],
            PermissionScope::Process => &PERMISSION_GROUPS[2],
        }
    }
}

impl fmt::Display for PermissionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single scoped capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PermissionAction {
    #[serde(rename = "team:view")]
    TeamView,
    #[serde(rename = "team:edit")]
    TeamEdit,
    #[serde(rename = "team:delete")]
    TeamDelete,
    #[serde(rename = "team:manage_members")]
    TeamManageMembers,
    #[serde(rename = "team:manage_roles")]
    TeamManageRoles,
    #[serde(rename = "team:manage_permissions")]
    TeamManagePermissions,
    #[serde(rename = "team:invite_members")]
    TeamInviteMembers,
    #[serde(rename = "server:view")]
    ServerView,
    #[serde(rename = "server:create")]
    ServerCreate,
    #[serde(rename = "server:edit")]
    ServerEdit,
    #[serde(rename = "server:delete")]
    ServerDelete,
    #[serde(rename = "server:manage")]
    ServerManage,
    #[serde(rename = "process:view")]
    ProcessView,
    #[serde(rename = "process:start")]
    ProcessStart,
    #[serde(rename = "process:stop")]
    ProcessStop,
    #[serde(rename = "process:restart")]
    ProcessRestart,
    #[serde(rename = "process:delete")]
    ProcessDelete,
    #[serde(rename = "process:view_logs")]
    ProcessViewLogs,
    #[serde(rename = "process:manage")]
    ProcessManage,
}

impl PermissionAction {
    /// Every recognized action, in catalog order
    pub const ALL: [PermissionAction; 19] = [
        PermissionAction::TeamView,
        PermissionAction::TeamEdit,
        PermissionAction::TeamDelete,
        PermissionAction::TeamManageMembers,
        PermissionAction::TeamManageRoles,
        PermissionAction::TeamManagePermissions,
        PermissionAction::TeamInviteMembers,
        PermissionAction::ServerView,
        PermissionAction::ServerCreate,
        PermissionAction::ServerEdit,
        PermissionAction::ServerDelete,
        PermissionAction::ServerManage,
        PermissionAction::ProcessView,
        PermissionAction::ProcessStart,
        PermissionAction::ProcessStop,
        PermissionAction::ProcessRestart,
        PermissionAction::ProcessDelete,
        PermissionAction::ProcessViewLogs,
        PermissionAction::ProcessManage,
    ];

    /// Wire representation, e.g. `server:create`
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionAction::TeamView => "team:view",
            PermissionAction::TeamEdit => "team:edit",
            PermissionAction::TeamDelete => "team:delete",
            PermissionAction::TeamManageMembers => "team:manage_members",
            PermissionAction::TeamManageRoles => "team:manage_roles",
            PermissionAction::TeamManagePermissions => "team:manage_permissions",
            PermissionAction::TeamInviteMembers => "team:invite_members",
            PermissionAction::ServerView => "server:view",
            PermissionAction::ServerCreate => "server:create",
            PermissionAction::ServerEdit => "server:edit",
            PermissionAction::ServerDelete => "server:delete",
            PermissionAction::ServerManage => "server:manage",
            PermissionAction::ProcessView => "process:view",
            PermissionAction::ProcessStart => "process:start",
            PermissionAction::ProcessStop => "process:stop",
            PermissionAction::ProcessRestart => "process:restart",
            PermissionAction::ProcessDelete => "process:delete",
            PermissionAction::ProcessViewLogs => "process:view_logs",
            PermissionAction::ProcessManage => "process:manage",
        }
    }

    /// Scope derived from the action's prefix
    pub fn scope(self) -> PermissionScope {
        match self.as_str().split_once(':').map(|(prefix, _)| prefix) {
            Some("team") => PermissionScope::Team,
            Some("server") => PermissionScope::Server,
            _ => PermissionScope::Process,
        }
    }
}

impl fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PermissionAction::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("Unknown permission action: {}", s))
    }
}

/// Display metadata for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionInfo {
    pub action: PermissionAction,
    pub label: &'static str,
    pub description: &'static str,
}

/// Actions of one scope, as rendered in a checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionGroup {
    pub scope: PermissionScope,
    pub label: &'static str,
    pub icon: &'static str,
    pub permissions: &'static [PermissionInfo],
}

const fn info(
    action: PermissionAction,
    label: &'static str,
    description: &'static str,
) -> PermissionInfo {
    PermissionInfo {
        action,
        label,
        description,
    }
}

/// The permission catalog
pub static PERMISSION_GROUPS: [PermissionGroup; 3] = [
    PermissionGroup {
        scope: PermissionScope::Team,
        label: "Team",
        icon: "Users",
        permissions: &[
            info(PermissionAction::TeamView, "View Team", "View team details and members"),
            info(PermissionAction::TeamEdit, "Edit Team", "Edit team name, description, and settings"),
            info(PermissionAction::TeamDelete, "Delete Team", "Permanently delete the team"),
            info(PermissionAction::TeamManageMembers, "Manage Members", "Add, remove, and update team members"),
            info(PermissionAction::TeamManageRoles, "Manage Roles", "Create and modify team roles"),
            info(PermissionAction::TeamManagePermissions, "Manage Permissions", "Assign and revoke permissions"),
            info(PermissionAction::TeamInviteMembers, "Invite Members", "Send invitations to new members"),
        ],
    },
    PermissionGroup {
        scope: PermissionScope::Server,
        label: "Servers",
        icon: "Server",
        permissions: &[
            info(PermissionAction::ServerView, "View Servers", "View server list and details"),
            info(PermissionAction::ServerCreate, "Create Server", "Add new servers to the team"),
            info(PermissionAction::ServerEdit, "Edit Server", "Modify server configuration"),
            info(PermissionAction::ServerDelete, "Delete Server", "Remove servers from the team"),
            info(PermissionAction::ServerManage, "Manage Server", "Full server management access"),
        ],
    },
    PermissionGroup {
        scope: PermissionScope::Process,
        label: "Processes",
        icon: "Activity",
        permissions: &[
            info(PermissionAction::ProcessView, "View Processes", "View process list and status"),
            info(PermissionAction::ProcessStart, "Start Process", "Start stopped processes"),
            info(PermissionAction::ProcessStop, "Stop Process", "Stop running processes"),
            info(PermissionAction::ProcessRestart, "Restart Process", "Restart processes"),
            info(PermissionAction::ProcessDelete, "Delete Process", "Remove processes"),
            info(PermissionAction::ProcessViewLogs, "View Logs", "Access process logs and metrics"),
            info(PermissionAction::ProcessManage, "Manage Processes", "Full process management access"),
        ],
    },
];

/// Look up the display metadata of an action
pub fn describe(action: PermissionAction) -> Option<&'static PermissionInfo> {
    PERMISSION_GROUPS
        .iter()
        .flat_map(|group| group.permissions.iter())
        .find(|info| info.action == action)
}

/// Label to render for an action, falling back to its scope's label
pub fn display_label(action: PermissionAction) -> &'static str {
    describe(action)
        .map(|info| info.label)
        .unwrap_or_else(|| action.scope().group().label)
}
