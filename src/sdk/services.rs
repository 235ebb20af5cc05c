//! Team service seam
//!
//! [`TeamService`] is everything the team layer needs from the backend. The
//! HTTP [`ApiClient`](crate::sdk::ApiClient) implements it against the REST
//! API and [`MockTeamBackend`](crate::sdk::mock::MockTeamBackend) in memory.

use crate::auth::permission::PermissionAction;
use crate::auth::rbac::TeamRole;
use crate::core::models::{
    AcceptInvitationResponse, CreateInvitationPayload, CreateTeamPayload, InvitationResponse,
    Team, TeamDetails, TeamInvitation, TeamMember, TeamsResponse, UpdateMemberPayload,
    UpdateTeamPayload,
};
use crate::sdk::errors::Result;
use async_trait::async_trait;

/// Team, membership and invitation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamService: Send + Sync {
    /// Teams the current user belongs to
    async fn list_teams(&self) -> Result<TeamsResponse>;

    /// Team with members, invitations and the current user's role
    async fn get_team(&self, team_id: &str) -> Result<TeamDetails>;

    async fn create_team(&self, payload: &CreateTeamPayload) -> Result<Team>;

    async fn update_team(&self, team_id: &str, payload: &UpdateTeamPayload) -> Result<Team>;

    /// Owner only
    async fn delete_team(&self, team_id: &str) -> Result<()>;

    async fn list_members(&self, team_id: &str) -> Result<Vec<TeamMember>>;

    async fn update_member(
        &self,
        team_id: &str,
        member_id: &str,
        payload: &UpdateMemberPayload,
    ) -> Result<TeamMember>;

    async fn update_member_role(
        &self,
        team_id: &str,
        member_id: &str,
        role: TeamRole,
    ) -> Result<TeamMember>;

    async fn update_member_permissions(
        &self,
        team_id: &str,
        member_id: &str,
        permissions: &[PermissionAction],
    ) -> Result<TeamMember>;

    async fn remove_member(&self, team_id: &str, member_id: &str) -> Result<()>;

    /// Current user leaves the team
    async fn leave_team(&self, team_id: &str) -> Result<()>;

    async fn list_invitations(&self, team_id: &str) -> Result<Vec<TeamInvitation>>;

    async fn create_invitation(
        &self,
        payload: &CreateInvitationPayload,
    ) -> Result<InvitationResponse>;

    async fn revoke_invitation(&self, invitation_id: &str) -> Result<()>;

    /// Re-send and push the expiry back
    async fn resend_invitation(&self, invitation_id: &str) -> Result<InvitationResponse>;

    /// Invitation by its public token
    async fn get_invitation(&self, token: &str) -> Result<TeamInvitation>;

    async fn accept_invitation(&self, token: &str) -> Result<AcceptInvitationResponse>;
}
