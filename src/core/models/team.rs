//! Team models
//!
//! Records returned by the backend for teams, their members and pending
//! invitations. The authorization layer reads `role` and `permissions` from
//! these and nothing else.

use crate::auth::permission::{PermissionAction, PermissionScope};
use crate::auth::rbac::{PermissionSet, TeamRole};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Decode a list, dropping entries this client does not recognize
///
/// The backend may grant actions newer than this client's catalog; those
/// must not fail the whole response.
fn skip_unrecognized<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| match T::deserialize(&value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Ignoring unrecognized permission entry {}: {}", value, e);
                None
            }
        })
        .collect())
}

/// Team/Organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_count: Option<u32>,
}

/// Public profile of a user as embedded in team records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// A permission granted to a member, optionally bound to one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPermission {
    pub id: String,
    pub action: PermissionAction,
    pub scope: PermissionScope,
    /// Specific server/process id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TeamPermission {
    /// Team-wide grant of `action`
    pub fn from_action(action: PermissionAction) -> Self {
        Self {
            id: format!("perm-{}", action),
            action,
            scope: action.scope(),
            resource_id: None,
            description: None,
        }
    }

    /// Grants for every default action of `role`
    pub fn defaults_for(role: TeamRole) -> Vec<Self> {
        role.default_actions()
            .iter()
            .copied()
            .map(Self::from_action)
            .collect()
    }
}

/// Membership of a user in a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub team_id: String,
    pub user_id: String,
    pub user: UserSummary,
    pub role: TeamRole,
    #[serde(default, deserialize_with = "skip_unrecognized")]
    pub permissions: Vec<TeamPermission>,
    pub joined_at: DateTime<Utc>,
}

impl TeamMember {
    /// Actions granted to the member
    pub fn permission_set(&self) -> PermissionSet {
        self.permissions.iter().map(|p| p.action).collect()
    }
}

/// Invitation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
    Revoked,
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Expired => "expired",
            InvitationStatus::Revoked => "revoked",
        };
        f.write_str(s)
    }
}

/// Invitation to join a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInvitation {
    pub id: String,
    pub team_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    pub email: String,
    pub role: TeamRole,
    /// Proposed permission override list
    #[serde(default, deserialize_with = "skip_unrecognized")]
    pub permissions: Vec<PermissionAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub invited_by: Inviter,
    pub token: String,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
}

impl TeamInvitation {
    /// Whether the invitation can still be accepted at `now`
    pub fn is_acceptable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && self.expires_at >= now
    }
}

/// Who sent an invitation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inviter {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Request body for creating an invitation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationPayload {
    pub team_id: String,
    pub email: String,
    pub role: TeamRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<PermissionAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CreateInvitationPayload {
    pub fn new(team_id: impl Into<String>, email: impl Into<String>, role: TeamRole) -> Self {
        Self {
            team_id: team_id.into(),
            email: email.into(),
            role,
            permissions: None,
            message: None,
        }
    }

    pub fn with_permissions(mut self, permissions: Vec<PermissionAction>) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Custom list if supplied, else the role's defaults
    pub fn effective_permissions(&self) -> Vec<PermissionAction> {
        match &self.permissions {
            Some(permissions) => permissions.clone(),
            None => self.role.default_actions().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationResponse {
    pub invitation: TeamInvitation,
    pub invite_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptInvitationResponse {
    pub team: Team,
    pub member: TeamMember,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTeamPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMemberPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<TeamRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<PermissionAction>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamsResponse {
    pub teams: Vec<Team>,
    pub total: usize,
}

/// `GET teams/{id}` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetails {
    pub team: Team,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    #[serde(default)]
    pub invitations: Vec<TeamInvitation>,
    pub current_user_role: TeamRole,
    #[serde(default, deserialize_with = "skip_unrecognized")]
    pub current_user_permissions: Vec<PermissionAction>,
}

impl TeamDetails {
    /// Pending invitations only
    pub fn pending_invitations(&self) -> impl Iterator<Item = &TeamInvitation> {
        self.invitations
            .iter()
            .filter(|i| i.status == InvitationStatus::Pending)
    }
}
