//! Authorization context
//!
//! Owns the selected team and the current user's resolved authorization
//! snapshot for it. Readers get lock-free access to the snapshot; writers are
//! the selection operations below, which fetch team details from the
//! [`TeamService`] and commit the result only if no newer selection or
//! refresh was issued in the meantime.
//!
//! Checks made here gate presentation only. The backend enforces access on
//! every request regardless of what this context says.

use crate::auth::permission::{PermissionAction, display_label};
use crate::auth::rbac::{self, PermissionSet, TeamRole};
use crate::auth::store::SelectionStore;
use crate::core::alerts::{AlertBus, AlertKind};
use crate::core::models::{Team, TeamDetails};
use crate::sdk::errors::{ApiError, ErrorClass};
use crate::sdk::services::TeamService;
use crate::utils::error::{ConsoleError, Result};
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Resolved role and permissions of the current user in one team
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationSnapshot {
    pub team_id: String,
    pub role: TeamRole,
    pub permissions: PermissionSet,
}

impl AuthorizationSnapshot {
    pub fn from_details(details: &TeamDetails) -> Self {
        Self {
            team_id: details.team.id.clone(),
            role: details.current_user_role,
            permissions: details.current_user_permissions.iter().copied().collect(),
        }
    }

    pub fn can(&self, action: PermissionAction) -> bool {
        rbac::has_permission(&self.permissions, action)
    }
}

/// Where the context is in its selection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    NoTeamSelected,
    /// Details for the selected team are being fetched
    Loading,
    Ready,
    /// The last fetch failed with this class
    Error(ErrorClass),
}

/// Result of a selection operation
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// The fetched snapshot was committed
    Ready(Arc<AuthorizationSnapshot>),
    /// No team is selected
    Cleared,
    /// A newer selection or refresh won; nothing was committed
    Superseded,
    /// Nothing about the selection changed
    Unchanged,
    /// The fetch failed; an error alert was published
    Failed(ApiError),
}

impl SelectionOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, SelectionOutcome::Ready(_))
    }
}

#[derive(Debug)]
struct ContextState {
    selected: Option<String>,
    /// Bumped by every selection change and every fetch
    epoch: u64,
    /// Bumped by selection changes only; refreshes leave it alone
    generation: u64,
    load_state: LoadState,
    teams: Vec<Team>,
    details: Option<Arc<TeamDetails>>,
}

enum Persist<'a> {
    Save(&'a str),
    Clear,
}

/// Team selection plus authorization queries for the active team
pub struct TeamContext {
    service: Arc<dyn TeamService>,
    store: Arc<dyn SelectionStore>,
    alerts: AlertBus,
    snapshot: ArcSwapOption<AuthorizationSnapshot>,
    state: Mutex<ContextState>,
    persist_lock: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for TeamContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamContext")
            .field("snapshot", &self.snapshot.load_full())
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl TeamContext {
    pub fn new(
        service: Arc<dyn TeamService>,
        store: Arc<dyn SelectionStore>,
        alerts: AlertBus,
    ) -> Self {
        Self {
            service,
            store,
            alerts,
            snapshot: ArcSwapOption::const_empty(),
            state: Mutex::new(ContextState {
                selected: None,
                epoch: 0,
                generation: 0,
                load_state: LoadState::Uninitialized,
                teams: Vec::new(),
                details: None,
            }),
            persist_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Restore the persisted selection, or pick the first team
    ///
    /// A restored team the user can no longer access is dropped and the
    /// first team of the list is selected instead.
    pub async fn initialize(&self) -> SelectionOutcome {
        let restored = match self.store.load().await {
            Ok(restored) => restored,
            Err(e) => {
                warn!("Failed to restore selected team: {}", e);
                None
            }
        };

        let Some(team_id) = restored else {
            debug!("No persisted team selection");
            return self.refresh_teams().await;
        };

        info!("Restoring selected team {}", team_id);
        let outcome = self.select_team(Some(&team_id)).await;

        if let SelectionOutcome::Failed(e) = &outcome {
            if e.class().revokes_access() {
                warn!("Restored team {} is no longer accessible", team_id);
                self.state.lock().selected = None;
                return self.refresh_teams().await;
            }
        }

        // The list only feeds the team switcher here; failures were alerted.
        let _ = self.refresh_teams().await;
        outcome
    }

    /// Select a team, or clear the selection with `None`
    ///
    /// The previous snapshot stays visible while the new one loads.
    pub async fn select_team(&self, team_id: Option<&str>) -> SelectionOutcome {
        let Some(team_id) = team_id else {
            return self.clear_selection().await;
        };

        let (epoch, generation) = {
            let mut state = self.state.lock();
            state.epoch += 1;
            state.generation += 1;
            state.selected = Some(team_id.to_string());
            state.load_state = LoadState::Loading;
            (state.epoch, state.generation)
        };
        debug!("Selecting team {} (epoch {})", team_id, epoch);

        self.fetch_and_commit(team_id, epoch, generation).await
    }

    /// Re-fetch the selected team's details
    pub async fn refresh_current_team(&self) -> SelectionOutcome {
        let (team_id, epoch, generation) = {
            let mut state = self.state.lock();
            let Some(team_id) = state.selected.clone() else {
                return SelectionOutcome::Cleared;
            };
            state.epoch += 1;
            state.load_state = LoadState::Loading;
            (team_id, state.epoch, state.generation)
        };
        debug!("Refreshing team {} (epoch {})", team_id, epoch);

        self.fetch_and_commit(&team_id, epoch, generation).await
    }

    /// Reload the team list; selects the first team when none is selected
    pub async fn refresh_teams(&self) -> SelectionOutcome {
        let teams = match self.service.list_teams().await {
            Ok(response) => response.teams,
            Err(e) => {
                error!("Failed to load teams: {}", e);
                {
                    let mut state = self.state.lock();
                    if state.selected.is_none() {
                        state.load_state = LoadState::Error(e.class());
                    }
                }
                self.alerts.notify(AlertKind::Error, e.user_message());
                return SelectionOutcome::Failed(e);
            }
        };

        let first = {
            let mut state = self.state.lock();
            state.teams = teams;
            if state.selected.is_some() {
                return SelectionOutcome::Unchanged;
            }
            match state.teams.first() {
                Some(team) => team.id.clone(),
                None => {
                    state.load_state = LoadState::NoTeamSelected;
                    return SelectionOutcome::Cleared;
                }
            }
        };

        info!("Auto-selecting first team {}", first);
        self.select_team(Some(&first)).await
    }

    async fn clear_selection(&self) -> SelectionOutcome {
        let generation = {
            let mut state = self.state.lock();
            state.epoch += 1;
            state.generation += 1;
            state.selected = None;
            state.details = None;
            state.load_state = LoadState::NoTeamSelected;
            self.snapshot.store(None);
            state.generation
        };
        info!("Team selection cleared");

        self.persist(generation, Persist::Clear).await;
        SelectionOutcome::Cleared
    }

    async fn fetch_and_commit(
        &self,
        team_id: &str,
        epoch: u64,
        generation: u64,
    ) -> SelectionOutcome {
        let result = self.service.get_team(team_id).await;

        let committed = {
            let mut state = self.state.lock();
            if state.epoch != epoch || state.selected.as_deref() != Some(team_id) {
                debug!("Discarding stale response for team {} (epoch {})", team_id, epoch);
                return SelectionOutcome::Superseded;
            }

            match result {
                Ok(details) => {
                    if details.team.id != team_id {
                        warn!(
                            "Requested team {} but backend answered for {}",
                            team_id, details.team.id
                        );
                        return SelectionOutcome::Superseded;
                    }

                    let snapshot = Arc::new(AuthorizationSnapshot::from_details(&details));
                    self.snapshot.store(Some(snapshot.clone()));
                    state.details = Some(Arc::new(details));
                    state.load_state = LoadState::Ready;
                    Ok(snapshot)
                }
                Err(e) => {
                    let class = e.class();
                    state.load_state = LoadState::Error(class);

                    let keep_last_good = !class.revokes_access()
                        && self
                            .snapshot
                            .load()
                            .as_ref()
                            .is_some_and(|s| s.team_id == team_id);
                    if !keep_last_good {
                        self.snapshot.store(None);
                        state.details = None;
                    }
                    Err(e)
                }
            }
        };

        match committed {
            Ok(snapshot) => {
                info!(
                    "Team {} ready: role {}, {} permissions",
                    team_id,
                    snapshot.role,
                    snapshot.permissions.len()
                );
                self.persist(generation, Persist::Save(team_id)).await;
                SelectionOutcome::Ready(snapshot)
            }
            Err(e) => {
                error!("Failed to load team {}: {}", team_id, e);
                if e.class().revokes_access() {
                    self.persist(generation, Persist::Clear).await;
                }
                self.alerts.notify(AlertKind::Error, e.user_message());
                SelectionOutcome::Failed(e)
            }
        }
    }

    /// Write the selection through unless a newer one has been made since
    ///
    /// Refreshes of the same selection do not count as newer.
    async fn persist(&self, generation: u64, action: Persist<'_>) {
        let _guard = self.persist_lock.lock().await;
        if self.state.lock().generation != generation {
            debug!("Skipping persistence for superseded selection {}", generation);
            return;
        }

        let result = match action {
            Persist::Save(team_id) => self.store.save(team_id).await,
            Persist::Clear => self.store.clear().await,
        };
        if let Err(e) = result {
            warn!("Failed to persist team selection: {}", e);
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn can(&self, action: PermissionAction) -> bool {
        self.snapshot
            .load()
            .as_ref()
            .is_some_and(|s| rbac::has_permission(&s.permissions, action))
    }

    pub fn can_any(&self, actions: &[PermissionAction]) -> bool {
        self.snapshot
            .load()
            .as_ref()
            .is_some_and(|s| rbac::has_any_permission(&s.permissions, actions))
    }

    /// False without a snapshot, even for an empty list
    pub fn can_all(&self, actions: &[PermissionAction]) -> bool {
        self.snapshot
            .load()
            .as_ref()
            .is_some_and(|s| rbac::has_all_permissions(&s.permissions, actions))
    }

    /// Gate an action, naming it in the error
    pub fn require(&self, action: PermissionAction) -> Result<()> {
        if self.can(action) {
            return Ok(());
        }
        Err(ConsoleError::forbidden(format!(
            "{} ({}) is not permitted in the current team",
            display_label(action),
            action
        )))
    }

    pub fn current_role(&self) -> Option<TeamRole> {
        self.snapshot.load().as_ref().map(|s| s.role)
    }

    pub fn is_owner(&self) -> bool {
        self.current_role().is_some_and(TeamRole::is_owner)
    }

    /// Owner or admin
    pub fn is_admin(&self) -> bool {
        self.current_role().is_some_and(TeamRole::is_admin)
    }

    pub fn has_role(&self, roles: &[TeamRole]) -> bool {
        rbac::has_role(self.current_role(), roles)
    }

    pub fn permissions(&self) -> PermissionSet {
        self.snapshot
            .load()
            .as_ref()
            .map(|s| s.permissions.clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Option<Arc<AuthorizationSnapshot>> {
        self.snapshot.load_full()
    }

    pub fn state(&self) -> LoadState {
        self.state.lock().load_state
    }

    pub fn selected_team_id(&self) -> Option<String> {
        self.state.lock().selected.clone()
    }

    pub fn teams(&self) -> Vec<Team> {
        self.state.lock().teams.clone()
    }

    /// Details of the committed team, if any
    pub fn current_details(&self) -> Option<Arc<TeamDetails>> {
        self.state.lock().details.clone()
    }

    pub fn current_team(&self) -> Option<Team> {
        self.current_details().map(|d| d.team.clone())
    }

    pub fn alerts(&self) -> &AlertBus {
        &self.alerts
    }
}
