//! In-memory team backend
//!
//! Serves the demo data set (three teams, ten memberships, six invitations)
//! with the same ownership and invitation rules as the real service, so the
//! console can run without a backend.

use crate::auth::permission::PermissionAction;
use crate::auth::rbac::TeamRole;
use crate::core::models::*;
use crate::sdk::errors::{ApiError, Result};
use crate::sdk::services::TeamService;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Id of the user the mock acts as unless told otherwise
pub const DEFAULT_CURRENT_USER: &str = "user-001";

const INVITATION_TTL_DAYS: i64 = 7;

#[derive(Debug, Default)]
struct MockState {
    teams: Vec<Team>,
    members: HashMap<String, Vec<TeamMember>>,
    invitations: HashMap<String, Vec<TeamInvitation>>,
}

impl MockState {
    fn team(&self, team_id: &str) -> Result<&Team> {
        self.teams
            .iter()
            .find(|t| t.id == team_id)
            .ok_or_else(team_not_found)
    }

    fn team_mut(&mut self, team_id: &str) -> Result<&mut Team> {
        self.teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or_else(team_not_found)
    }

    fn members_mut(&mut self, team_id: &str) -> Result<&mut Vec<TeamMember>> {
        self.members.get_mut(team_id).ok_or_else(team_not_found)
    }

    fn sync_member_count(&mut self, team_id: &str) {
        let count = self.members.get(team_id).map_or(0, Vec::len) as u32;
        if let Some(team) = self.teams.iter_mut().find(|t| t.id == team_id) {
            team.member_count = Some(count);
        }
    }

    fn invitation_mut<F>(&mut self, predicate: F) -> Result<&mut TeamInvitation>
    where
        F: Fn(&TeamInvitation) -> bool,
    {
        self.invitations
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|i| predicate(i))
            .ok_or_else(|| ApiError::NotFound("Invitation not found".to_string()))
    }
}

fn team_not_found() -> ApiError {
    ApiError::NotFound("Team not found".to_string())
}

/// In-memory [`TeamService`]
#[derive(Debug)]
pub struct MockTeamBackend {
    state: Mutex<MockState>,
    users: Vec<UserSummary>,
    current_user: String,
    origin: String,
    latency: Duration,
    fixed_now: Option<DateTime<Utc>>,
}

impl MockTeamBackend {
    /// Backend seeded with the demo data set
    pub fn new() -> Self {
        let users = fixture_users();
        let state = fixture_state(&users);
        Self::with_state(state, users)
    }

    /// Backend with no teams at all
    pub fn empty() -> Self {
        Self::with_state(MockState::default(), fixture_users())
    }

    fn with_state(state: MockState, users: Vec<UserSummary>) -> Self {
        Self {
            state: Mutex::new(state),
            users,
            current_user: DEFAULT_CURRENT_USER.to_string(),
            origin: String::new(),
            latency: Duration::ZERO,
            fixed_now: None,
        }
    }

    /// Act as another user
    pub fn as_user(mut self, user_id: impl Into<String>) -> Self {
        self.current_user = user_id.into();
        self
    }

    /// Prefix for generated invite links
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into().trim_end_matches('/').to_string();
        self
    }

    /// Delay every call, like a slow network would
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Pin the clock used for expiry checks
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn current_user_id(&self) -> &str {
        &self.current_user
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    fn current_user(&self) -> UserSummary {
        self.users
            .iter()
            .find(|u| u.id == self.current_user)
            .cloned()
            .unwrap_or_else(|| UserSummary {
                id: self.current_user.clone(),
                email: format!("{}@hosten.io", self.current_user),
                username: self.current_user.clone(),
                avatar_url: None,
            })
    }

    fn invite_link(&self, token: &str) -> String {
        format!("{}/invite/{}", self.origin, token)
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for MockTeamBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

fn slugify(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

fn protect_owner(member: &TeamMember, message: &str) -> Result<()> {
    if member.role.is_owner() {
        return Err(ApiError::Validation(message.to_string()));
    }
    Ok(())
}

#[async_trait]
impl TeamService for MockTeamBackend {
    async fn list_teams(&self) -> Result<TeamsResponse> {
        self.pause().await;
        let state = self.state.lock();

        let teams: Vec<Team> = state
            .teams
            .iter()
            .filter(|team| {
                state
                    .members
                    .get(&team.id)
                    .is_some_and(|m| m.iter().any(|m| m.user_id == self.current_user))
            })
            .cloned()
            .collect();

        Ok(TeamsResponse {
            total: teams.len(),
            teams,
        })
    }

    async fn get_team(&self, team_id: &str) -> Result<TeamDetails> {
        self.pause().await;
        let state = self.state.lock();

        let team = state.team(team_id)?.clone();
        let members = state.members.get(team_id).cloned().unwrap_or_default();
        let invitations = state.invitations.get(team_id).cloned().unwrap_or_default();

        let role = members
            .iter()
            .find(|m| m.user_id == self.current_user)
            .map_or(TeamRole::Viewer, |m| m.role);

        debug!("mock get_team {} as {} ({})", team_id, self.current_user, role);

        Ok(TeamDetails {
            team,
            members,
            invitations,
            current_user_role: role,
            current_user_permissions: role.default_actions().to_vec(),
        })
    }

    async fn create_team(&self, payload: &CreateTeamPayload) -> Result<Team> {
        self.pause().await;
        let name = payload.name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("Team name is required".to_string()));
        }

        let now = self.now();
        let team = Team {
            id: new_id("team"),
            name: name.to_string(),
            slug: slugify(name),
            description: payload.description.clone(),
            avatar_url: None,
            owner_id: self.current_user.clone(),
            created_at: now,
            updated_at: now,
            member_count: Some(1),
            server_count: Some(0),
        };
        let owner = TeamMember {
            id: new_id("member"),
            team_id: team.id.clone(),
            user_id: self.current_user.clone(),
            user: self.current_user(),
            role: TeamRole::Owner,
            permissions: TeamPermission::defaults_for(TeamRole::Owner),
            joined_at: now,
        };

        let mut state = self.state.lock();
        state.teams.push(team.clone());
        state.members.insert(team.id.clone(), vec![owner]);
        state.invitations.insert(team.id.clone(), Vec::new());

        Ok(team)
    }

    async fn update_team(&self, team_id: &str, payload: &UpdateTeamPayload) -> Result<Team> {
        self.pause().await;
        let now = self.now();
        let mut state = self.state.lock();
        let team = state.team_mut(team_id)?;

        if let Some(name) = &payload.name {
            team.name = name.clone();
        }
        if let Some(description) = &payload.description {
            team.description = Some(description.clone());
        }
        if let Some(avatar_url) = &payload.avatar_url {
            team.avatar_url = Some(avatar_url.clone());
        }
        team.updated_at = now;

        Ok(team.clone())
    }

    async fn delete_team(&self, team_id: &str) -> Result<()> {
        self.pause().await;
        let mut state = self.state.lock();
        state.team(team_id)?;

        let is_owner = state
            .members
            .get(team_id)
            .and_then(|m| m.iter().find(|m| m.user_id == self.current_user))
            .is_some_and(|m| m.role.is_owner());
        if !is_owner {
            return Err(ApiError::Forbidden(
                "Only team owner can delete the team".to_string(),
            ));
        }

        state.teams.retain(|t| t.id != team_id);
        state.members.remove(team_id);
        state.invitations.remove(team_id);
        Ok(())
    }

    async fn list_members(&self, team_id: &str) -> Result<Vec<TeamMember>> {
        self.pause().await;
        let state = self.state.lock();
        state.team(team_id)?;
        Ok(state.members.get(team_id).cloned().unwrap_or_default())
    }

    async fn update_member(
        &self,
        team_id: &str,
        member_id: &str,
        payload: &UpdateMemberPayload,
    ) -> Result<TeamMember> {
        let mut member = None;
        if let Some(role) = payload.role {
            member = Some(self.update_member_role(team_id, member_id, role).await?);
        }
        if let Some(permissions) = &payload.permissions {
            member = Some(
                self.update_member_permissions(team_id, member_id, permissions)
                    .await?,
            );
        }
        match member {
            Some(member) => Ok(member),
            None => Err(ApiError::Validation("Nothing to update".to_string())),
        }
    }

    async fn update_member_role(
        &self,
        team_id: &str,
        member_id: &str,
        role: TeamRole,
    ) -> Result<TeamMember> {
        self.pause().await;
        let mut state = self.state.lock();
        let member = state
            .members_mut(team_id)?
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

        protect_owner(member, "Cannot change owner role")?;
        if role.is_owner() {
            return Err(ApiError::Validation(
                "Ownership cannot be granted through a role change".to_string(),
            ));
        }

        member.role = role;
        member.permissions = TeamPermission::defaults_for(role);
        Ok(member.clone())
    }

    async fn update_member_permissions(
        &self,
        team_id: &str,
        member_id: &str,
        permissions: &[PermissionAction],
    ) -> Result<TeamMember> {
        self.pause().await;
        let mut state = self.state.lock();
        let member = state
            .members_mut(team_id)?
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

        protect_owner(member, "Cannot change owner permissions")?;

        member.permissions = permissions
            .iter()
            .copied()
            .map(TeamPermission::from_action)
            .collect();
        Ok(member.clone())
    }

    async fn remove_member(&self, team_id: &str, member_id: &str) -> Result<()> {
        self.pause().await;
        let mut state = self.state.lock();
        let members = state.members_mut(team_id)?;
        let index = members
            .iter()
            .position(|m| m.id == member_id)
            .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

        protect_owner(&members[index], "Cannot remove team owner")?;

        members.remove(index);
        state.sync_member_count(team_id);
        Ok(())
    }

    async fn leave_team(&self, team_id: &str) -> Result<()> {
        self.pause().await;
        let mut state = self.state.lock();
        let members = state.members_mut(team_id)?;
        let index = members
            .iter()
            .position(|m| m.user_id == self.current_user)
            .ok_or_else(|| ApiError::Forbidden("You are not a member of this team".to_string()))?;

        protect_owner(
            &members[index],
            "Team owner cannot leave. Transfer ownership first.",
        )?;

        members.remove(index);
        state.sync_member_count(team_id);
        Ok(())
    }

    async fn list_invitations(&self, team_id: &str) -> Result<Vec<TeamInvitation>> {
        self.pause().await;
        let state = self.state.lock();
        state.team(team_id)?;
        Ok(state.invitations.get(team_id).cloned().unwrap_or_default())
    }

    async fn create_invitation(
        &self,
        payload: &CreateInvitationPayload,
    ) -> Result<InvitationResponse> {
        self.pause().await;
        let now = self.now();
        let inviter = self.current_user();
        let mut state = self.state.lock();
        let team = state.team(&payload.team_id)?.clone();

        let token = format!("inv_{}", &Uuid::new_v4().simple().to_string()[..13]);
        let invitation = TeamInvitation {
            id: new_id("invite"),
            team_id: team.id.clone(),
            team: Some(team),
            email: payload.email.trim().to_lowercase(),
            role: payload.role,
            permissions: payload.effective_permissions(),
            message: payload.message.clone(),
            invited_by: Inviter {
                id: inviter.id,
                username: inviter.username,
                email: inviter.email,
            },
            token,
            status: InvitationStatus::Pending,
            expires_at: now + ChronoDuration::days(INVITATION_TTL_DAYS),
            created_at: now,
            accepted_at: None,
        };

        state
            .invitations
            .entry(payload.team_id.clone())
            .or_default()
            .push(invitation.clone());

        Ok(InvitationResponse {
            invite_link: self.invite_link(&invitation.token),
            invitation,
        })
    }

    async fn revoke_invitation(&self, invitation_id: &str) -> Result<()> {
        self.pause().await;
        let mut state = self.state.lock();
        let invitation = state.invitation_mut(|i| i.id == invitation_id)?;
        invitation.status = InvitationStatus::Revoked;
        Ok(())
    }

    async fn resend_invitation(&self, invitation_id: &str) -> Result<InvitationResponse> {
        self.pause().await;
        let now = self.now();
        let mut state = self.state.lock();
        let invitation = state.invitation_mut(|i| i.id == invitation_id)?;

        invitation.expires_at = now + ChronoDuration::days(INVITATION_TTL_DAYS);
        invitation.status = InvitationStatus::Pending;

        Ok(InvitationResponse {
            invite_link: self.invite_link(&invitation.token),
            invitation: invitation.clone(),
        })
    }

    async fn get_invitation(&self, token: &str) -> Result<TeamInvitation> {
        self.pause().await;
        let mut state = self.state.lock();
        state.invitation_mut(|i| i.token == token).map(|i| i.clone())
    }

    async fn accept_invitation(&self, token: &str) -> Result<AcceptInvitationResponse> {
        self.pause().await;
        let now = self.now();
        let user = self.current_user();
        let mut state = self.state.lock();

        let invitation = state.invitation_mut(|i| i.token == token)?;
        if invitation.status != InvitationStatus::Pending {
            return Err(ApiError::Conflict(format!(
                "Invitation is {}",
                invitation.status
            )));
        }
        if invitation.expires_at < now {
            invitation.status = InvitationStatus::Expired;
            return Err(ApiError::Http {
                status: 410,
                message: "Invitation has expired".to_string(),
            });
        }
        let team_id = invitation.team_id.clone();
        let role = invitation.role;

        let already_member = state
            .members
            .get(&team_id)
            .is_some_and(|m| m.iter().any(|m| m.user_id == user.id));
        if already_member {
            return Err(ApiError::Conflict(
                "Already a member of this team".to_string(),
            ));
        }

        let invitation = state.invitation_mut(|i| i.token == token)?;
        invitation.status = InvitationStatus::Accepted;
        invitation.accepted_at = Some(now);

        let member = TeamMember {
            id: new_id("member"),
            team_id: team_id.clone(),
            user_id: user.id.clone(),
            user,
            role,
            permissions: TeamPermission::defaults_for(role),
            joined_at: now,
        };
        state
            .members
            .entry(team_id.clone())
            .or_default()
            .push(member.clone());
        state.sync_member_count(&team_id);

        let team = state.team(&team_id)?.clone();
        Ok(AcceptInvitationResponse { team, member })
    }
}

fn ts(value: &str) -> DateTime<Utc> {
    value.parse().unwrap_or_default()
}

fn user(id: &str, username: &str, email: &str) -> UserSummary {
    UserSummary {
        id: id.to_string(),
        email: email.to_string(),
        username: username.to_string(),
        avatar_url: None,
    }
}

fn fixture_users() -> Vec<UserSummary> {
    vec![
        user("user-001", "admin", "admin@hosten.io"),
        user("user-002", "johndoe", "john.doe@example.com"),
        user("user-003", "janesmith", "jane.smith@example.com"),
        user("user-004", "bobwilson", "bob.wilson@example.com"),
        user("user-005", "alicejohnson", "alice.johnson@example.com"),
    ]
}

fn fixture_team(
    id: &str,
    name: &str,
    description: &str,
    owner_id: &str,
    (created_at, updated_at): (&str, &str),
    (member_count, server_count): (u32, u32),
) -> Team {
    Team {
        id: id.to_string(),
        name: name.to_string(),
        slug: slugify(name),
        description: Some(description.to_string()),
        avatar_url: None,
        owner_id: owner_id.to_string(),
        created_at: ts(created_at),
        updated_at: ts(updated_at),
        member_count: Some(member_count),
        server_count: Some(server_count),
    }
}

fn fixture_state(users: &[UserSummary]) -> MockState {
    let find = |id: &str| {
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .unwrap_or_else(|| user(id, id, id))
    };

    let teams = vec![
        fixture_team(
            "team-001",
            "Production Team",
            "Main production infrastructure management team",
            "user-001",
            ("2025-06-15T10:30:00Z", "2026-01-20T14:22:00Z"),
            (5, 8),
        ),
        fixture_team(
            "team-002",
            "Development Squad",
            "Development and staging environments",
            "user-001",
            ("2025-08-20T09:00:00Z", "2026-01-18T11:45:00Z"),
            (3, 4),
        ),
        fixture_team(
            "team-003",
            "QA Testing",
            "Quality assurance and testing infrastructure",
            "user-002",
            ("2025-10-01T14:00:00Z", "2026-01-15T16:30:00Z"),
            (2, 2),
        ),
    ];

    let memberships = [
        ("member-001", "team-001", "user-001", TeamRole::Owner, "2025-06-15T10:30:00Z"),
        ("member-002", "team-001", "user-002", TeamRole::Admin, "2025-07-01T08:00:00Z"),
        ("member-003", "team-001", "user-003", TeamRole::Member, "2025-08-15T14:30:00Z"),
        ("member-004", "team-001", "user-004", TeamRole::Member, "2025-09-20T11:00:00Z"),
        ("member-005", "team-001", "user-005", TeamRole::Viewer, "2025-11-10T09:15:00Z"),
        ("member-006", "team-002", "user-001", TeamRole::Owner, "2025-08-20T09:00:00Z"),
        ("member-007", "team-002", "user-003", TeamRole::Admin, "2025-08-25T10:00:00Z"),
        ("member-008", "team-002", "user-004", TeamRole::Member, "2025-09-01T15:30:00Z"),
        ("member-009", "team-003", "user-002", TeamRole::Owner, "2025-10-01T14:00:00Z"),
        ("member-010", "team-003", "user-001", TeamRole::Member, "2025-10-05T11:00:00Z"),
    ];

    let mut members: HashMap<String, Vec<TeamMember>> = HashMap::new();
    for (id, team_id, user_id, role, joined_at) in memberships {
        members.entry(team_id.to_string()).or_default().push(TeamMember {
            id: id.to_string(),
            team_id: team_id.to_string(),
            user_id: user_id.to_string(),
            user: find(user_id),
            role,
            permissions: TeamPermission::defaults_for(role),
            joined_at: ts(joined_at),
        });
    }

    struct InviteRow {
        id: &'static str,
        team: usize,
        email: &'static str,
        role: TeamRole,
        message: Option<&'static str>,
        invited_by: &'static str,
        token: &'static str,
        status: InvitationStatus,
        expires_at: &'static str,
        created_at: &'static str,
        accepted_at: Option<&'static str>,
    }

    let rows = [
        InviteRow {
            id: "invite-001",
            team: 0,
            email: "newuser@example.com",
            role: TeamRole::Member,
            message: Some("Welcome to the Production Team!"),
            invited_by: "user-001",
            token: "inv_abc123def456",
            status: InvitationStatus::Pending,
            expires_at: "2026-02-01T10:30:00Z",
            created_at: "2026-01-20T10:30:00Z",
            accepted_at: None,
        },
        InviteRow {
            id: "invite-002",
            team: 0,
            email: "developer@company.com",
            role: TeamRole::Admin,
            message: None,
            invited_by: "user-001",
            token: "inv_xyz789ghi012",
            status: InvitationStatus::Pending,
            expires_at: "2026-01-30T14:00:00Z",
            created_at: "2026-01-16T14:00:00Z",
            accepted_at: None,
        },
        InviteRow {
            id: "invite-003",
            team: 0,
            email: "past.member@old.com",
            role: TeamRole::Viewer,
            message: None,
            invited_by: "user-002",
            token: "inv_old123expired",
            status: InvitationStatus::Expired,
            expires_at: "2025-12-15T10:00:00Z",
            created_at: "2025-12-01T10:00:00Z",
            accepted_at: None,
        },
        InviteRow {
            id: "invite-004",
            team: 0,
            email: "accepted.user@done.com",
            role: TeamRole::Member,
            message: None,
            invited_by: "user-001",
            token: "inv_accepted456",
            status: InvitationStatus::Accepted,
            expires_at: "2026-01-10T10:00:00Z",
            created_at: "2025-12-25T10:00:00Z",
            accepted_at: Some("2025-12-28T15:30:00Z"),
        },
        InviteRow {
            id: "invite-005",
            team: 0,
            email: "revoked.user@cancelled.com",
            role: TeamRole::Member,
            message: None,
            invited_by: "user-001",
            token: "inv_revoked789",
            status: InvitationStatus::Revoked,
            expires_at: "2026-01-20T10:00:00Z",
            created_at: "2026-01-05T10:00:00Z",
            accepted_at: None,
        },
        InviteRow {
            id: "invite-006",
            team: 1,
            email: "dev.intern@company.com",
            role: TeamRole::Viewer,
            message: Some("Join our development team!"),
            invited_by: "user-001",
            token: "inv_dev123intern",
            status: InvitationStatus::Pending,
            expires_at: "2026-02-05T09:00:00Z",
            created_at: "2026-01-22T09:00:00Z",
            accepted_at: None,
        },
    ];

    let mut invitations: HashMap<String, Vec<TeamInvitation>> = teams
        .iter()
        .map(|t| (t.id.clone(), Vec::new()))
        .collect();
    for row in rows {
        let team = teams[row.team].clone();
        let inviter = find(row.invited_by);
        invitations
            .entry(team.id.clone())
            .or_default()
            .push(TeamInvitation {
                id: row.id.to_string(),
                team_id: team.id.clone(),
                team: Some(team),
                email: row.email.to_string(),
                role: row.role,
                permissions: row.role.default_actions().to_vec(),
                message: row.message.map(str::to_string),
                invited_by: Inviter {
                    id: inviter.id,
                    username: inviter.username,
                    email: inviter.email,
                },
                token: row.token.to_string(),
                status: row.status,
                expires_at: ts(row.expires_at),
                created_at: ts(row.created_at),
                accepted_at: row.accepted_at.map(ts),
            });
    }

    MockState {
        teams,
        members,
        invitations,
    }
}
