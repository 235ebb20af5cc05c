//! Role-based access control for teams
//!
//! Maps each team role to its default permission set and provides the
//! set-membership predicates used to gate UI affordances. These checks are
//! advisory: the backend is the authority for every mutating action.

use super::permission::PermissionAction::{self, *};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Set of granted permission actions
pub type PermissionSet = HashSet<PermissionAction>;

/// Role of a user within a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Full control over the team and all resources
    Owner,
    /// Manages members and most settings
    Admin,
    /// Views and manages assigned resources
    Member,
    /// Read-only access
    Viewer,
}

const OWNER_PERMISSIONS: &[PermissionAction] = &[
    TeamView,
    TeamEdit,
    TeamDelete,
    TeamManageMembers,
    TeamManageRoles,
    TeamManagePermissions,
    TeamInviteMembers,
    ServerView,
    ServerCreate,
    ServerEdit,
    ServerDelete,
    ServerManage,
    ProcessView,
    ProcessStart,
    ProcessStop,
    ProcessRestart,
    ProcessDelete,
    ProcessViewLogs,
    ProcessManage,
];

const ADMIN_PERMISSIONS: &[PermissionAction] = &[
    TeamView,
    TeamEdit,
    TeamManageMembers,
    TeamInviteMembers,
    ServerView,
    ServerCreate,
    ServerEdit,
    ServerManage,
    ProcessView,
    ProcessStart,
    ProcessStop,
    ProcessRestart,
    ProcessViewLogs,
    ProcessManage,
];

const MEMBER_PERMISSIONS: &[PermissionAction] = &[
    TeamView,
    ServerView,
    ServerEdit,
    ProcessView,
    ProcessStart,
    ProcessStop,
    ProcessRestart,
    ProcessViewLogs,
];

const VIEWER_PERMISSIONS: &[PermissionAction] =
    &[TeamView, ServerView, ProcessView, ProcessViewLogs];

impl TeamRole {
    /// All roles, most privileged first
    pub const ALL: [TeamRole; 4] = [
        TeamRole::Owner,
        TeamRole::Admin,
        TeamRole::Member,
        TeamRole::Viewer,
    ];

    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            TeamRole::Owner => "owner",
            TeamRole::Admin => "admin",
            TeamRole::Member => "member",
            TeamRole::Viewer => "viewer",
        }
    }

    /// Position in the hierarchy (higher = more permissions)
    pub fn level(self) -> u8 {
        match self {
            TeamRole::Owner => 4,
            TeamRole::Admin => 3,
            TeamRole::Member => 2,
            TeamRole::Viewer => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TeamRole::Owner => "Owner",
            TeamRole::Admin => "Admin",
            TeamRole::Member => "Member",
            TeamRole::Viewer => "Viewer",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TeamRole::Owner => "Full control over the team and all resources",
            TeamRole::Admin => "Can manage team members and most settings",
            TeamRole::Member => "Can view and manage assigned resources",
            TeamRole::Viewer => "Read-only access to team resources",
        }
    }

    /// Badge colour
    pub fn color(self) -> &'static str {
        match self {
            TeamRole::Owner => "#f59e0b",
            TeamRole::Admin => "#8b5cf6",
            TeamRole::Member => "#3b82f6",
            TeamRole::Viewer => "#6b7280",
        }
    }

    /// Static default actions for the role
    pub fn default_actions(self) -> &'static [PermissionAction] {
        match self {
            TeamRole::Owner => OWNER_PERMISSIONS,
            TeamRole::Admin => ADMIN_PERMISSIONS,
            TeamRole::Member => MEMBER_PERMISSIONS,
            TeamRole::Viewer => VIEWER_PERMISSIONS,
        }
    }

    /// Default permission set for the role
    pub fn default_permissions(self) -> PermissionSet {
        self.default_actions().iter().copied().collect()
    }

    pub fn is_owner(self) -> bool {
        self == TeamRole::Owner
    }

    /// Owners count as admins
    pub fn is_admin(self) -> bool {
        matches!(self, TeamRole::Owner | TeamRole::Admin)
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(TeamRole::Owner),
            "admin" => Ok(TeamRole::Admin),
            "member" => Ok(TeamRole::Member),
            "viewer" => Ok(TeamRole::Viewer),
            _ => Err(format!("Unknown team role: {}", s)),
        }
    }
}

/// Default permission set for a role
pub fn default_permissions(role: TeamRole) -> PermissionSet {
    role.default_permissions()
}

/// True iff `action` is granted
pub fn has_permission(granted: &PermissionSet, action: PermissionAction) -> bool {
    granted.contains(&action)
}

/// True iff at least one of `actions` is granted; false for an empty list
pub fn has_any_permission(granted: &PermissionSet, actions: &[PermissionAction]) -> bool {
    actions.iter().any(|action| granted.contains(action))
}

/// True iff every one of `actions` is granted; true for an empty list
pub fn has_all_permissions(granted: &PermissionSet, actions: &[PermissionAction]) -> bool {
    actions.iter().all(|action| granted.contains(action))
}

/// True iff `role` is one of `allowed`
pub fn has_role(role: Option<TeamRole>, allowed: &[TeamRole]) -> bool {
    role.is_some_and(|role| allowed.contains(&role))
}

/// Permission check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
    /// Whether permission is granted
    pub granted: bool,
    /// Reason for denial (if not granted)
    pub denial_reason: Option<String>,
}

/// Detailed permission check
pub fn check_permission(granted: &PermissionSet, action: PermissionAction) -> PermissionCheck {
    if has_permission(granted, action) {
        PermissionCheck {
            granted: true,
            denial_reason: None,
        }
    } else {
        PermissionCheck {
            granted: false,
            denial_reason: Some(format!("Missing permission: {}", action)),
        }
    }
}

/// A pair of adjacent roles where the higher one lacks an action of the lower
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyViolation {
    pub higher: TeamRole,
    pub lower: TeamRole,
    pub missing: Vec<PermissionAction>,
}

impl fmt::Display for HierarchyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing: Vec<&str> = self.missing.iter().map(|a| a.as_str()).collect();
        write!(
            f,
            "role '{}' lacks permissions granted to '{}': {}",
            self.higher,
            self.lower,
            missing.join(", ")
        )
    }
}

/// Check owner ⊇ admin ⊇ member ⊇ viewer on the default table
pub fn verify_role_hierarchy() -> Result<(), HierarchyViolation> {
    for pair in TeamRole::ALL.windows(2) {
        let (higher, lower) = (pair[0], pair[1]);
        let granted = higher.default_permissions();
        let missing: Vec<PermissionAction> = lower
            .default_actions()
            .iter()
            .copied()
            .filter(|action| !granted.contains(action))
            .collect();

        if !missing.is_empty() {
            return Err(HierarchyViolation {
                higher,
                lower,
                missing,
            });
        }
    }

    Ok(())
}
