//! Collaborators whose calls block until the test releases them
//!
//! `GatedTeamService` lets tests resolve concurrent selections in any order;
//! `GatedSelectionStore` holds writes to the persisted selection.

use async_trait::async_trait;
use hosten_console::core::models::*;
use hosten_console::sdk::Result;
use hosten_console::{
    ApiError, MemorySelectionStore, PermissionAction, SelectionStore, TeamRole, TeamService,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::oneshot;

type Gate = oneshot::Sender<Result<TeamDetails>>;

pub struct GatedTeamService {
    teams: Mutex<Result<TeamsResponse>>,
    pending: Mutex<HashMap<String, VecDeque<Gate>>>,
    get_team_calls: AtomicUsize,
}

impl GatedTeamService {
    pub fn new() -> Self {
        Self::with_teams(&[])
    }

    pub fn with_teams(ids: &[&str]) -> Self {
        Self {
            teams: Mutex::new(Ok(super::TeamFactory::list(ids))),
            pending: Mutex::new(HashMap::new()),
            get_team_calls: AtomicUsize::new(0),
        }
    }

    /// Make `list_teams` fail from now on
    pub fn fail_team_list(&self, error: ApiError) {
        *self.teams.lock() = Err(error);
    }

    /// Number of `get_team(team_id)` calls still waiting
    pub fn pending(&self, team_id: &str) -> usize {
        self.pending.lock().get(team_id).map_or(0, VecDeque::len)
    }

    pub fn get_team_calls(&self) -> usize {
        self.get_team_calls.load(Ordering::SeqCst)
    }

    /// Resolve the oldest waiting `get_team(team_id)` call
    pub fn release(&self, team_id: &str, result: Result<TeamDetails>) {
        let gate = self
            .pending
            .lock()
            .get_mut(team_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| panic!("no pending get_team call for {}", team_id));
        let _ = gate.send(result);
    }
}

fn unsupported<T>(operation: &str) -> Result<T> {
    Err(ApiError::InvalidRequest(format!(
        "{} is not supported by the gated service",
        operation
    )))
}

#[async_trait]
impl TeamService for GatedTeamService {
    async fn list_teams(&self) -> Result<TeamsResponse> {
        self.teams.lock().clone()
    }

    async fn get_team(&self, team_id: &str) -> Result<TeamDetails> {
        self.get_team_calls.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .entry(team_id.to_string())
            .or_default()
            .push_back(tx);
        rx.await
            .unwrap_or_else(|_| Err(ApiError::Network("gate dropped".to_string())))
    }

    async fn create_team(&self, _payload: &CreateTeamPayload) -> Result<Team> {
        unsupported("create_team")
    }

    async fn update_team(&self, _team_id: &str, _payload: &UpdateTeamPayload) -> Result<Team> {
        unsupported("update_team")
    }

    async fn delete_team(&self, _team_id: &str) -> Result<()> {
        unsupported("delete_team")
    }

    async fn list_members(&self, _team_id: &str) -> Result<Vec<TeamMember>> {
        unsupported("list_members")
    }

    async fn update_member(
        &self,
        _team_id: &str,
        _member_id: &str,
        _payload: &UpdateMemberPayload,
    ) -> Result<TeamMember> {
        unsupported("update_member")
    }

    async fn update_member_role(
        &self,
        _team_id: &str,
        _member_id: &str,
        _role: TeamRole,
    ) -> Result<TeamMember> {
        unsupported("update_member_role")
    }

    async fn update_member_permissions(
        &self,
        _team_id: &str,
        _member_id: &str,
        _permissions: &[PermissionAction],
    ) -> Result<TeamMember> {
        unsupported("update_member_permissions")
    }

    async fn remove_member(&self, _team_id: &str, _member_id: &str) -> Result<()> {
        unsupported("remove_member")
    }

    async fn leave_team(&self, _team_id: &str) -> Result<()> {
        unsupported("leave_team")
    }

    async fn list_invitations(&self, _team_id: &str) -> Result<Vec<TeamInvitation>> {
        unsupported("list_invitations")
    }

    async fn create_invitation(
        &self,
        _payload: &CreateInvitationPayload,
    ) -> Result<InvitationResponse> {
        unsupported("create_invitation")
    }

    async fn revoke_invitation(&self, _invitation_id: &str) -> Result<()> {
        unsupported("revoke_invitation")
    }

    async fn resend_invitation(&self, _invitation_id: &str) -> Result<InvitationResponse> {
        unsupported("resend_invitation")
    }

    async fn get_invitation(&self, _token: &str) -> Result<TeamInvitation> {
        unsupported("get_invitation")
    }

    async fn accept_invitation(&self, _token: &str) -> Result<AcceptInvitationResponse> {
        unsupported("accept_invitation")
    }
}

/// A selection store whose next `save` waits for [`GatedSelectionStore::release_save`]
#[derive(Default)]
pub struct GatedSelectionStore {
    inner: MemorySelectionStore,
    hold_next: AtomicBool,
    held: Mutex<VecDeque<oneshot::Sender<()>>>,
}

impl GatedSelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold_next_save(&self) {
        self.hold_next.store(true, Ordering::SeqCst);
    }

    /// Number of `save` calls currently held
    pub fn held_saves(&self) -> usize {
        self.held.lock().len()
    }

    pub fn release_save(&self) {
        let gate = self
            .held
            .lock()
            .pop_front()
            .unwrap_or_else(|| panic!("no held save"));
        let _ = gate.send(());
    }
}

#[async_trait]
impl SelectionStore for GatedSelectionStore {
    async fn load(&self) -> hosten_console::Result<Option<String>> {
        self.inner.load().await
    }

    async fn save(&self, team_id: &str) -> hosten_console::Result<()> {
        if self.hold_next.swap(false, Ordering::SeqCst) {
            let (tx, rx) = oneshot::channel();
            self.held.lock().push_back(tx);
            let _ = rx.await;
        }
        self.inner.save(team_id).await
    }

    async fn clear(&self) -> hosten_console::Result<()> {
        self.inner.clear().await
    }
}
