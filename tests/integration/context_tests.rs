//! Team context integration tests
//!
//! Selection races, failure handling and persistence, exercised through
//! the public `TeamContext` API.

#[cfg(test)]
mod tests {
    use crate::common::{DetailsFactory, GatedSelectionStore, GatedTeamService, eventually};
    use hosten_console::PermissionAction::*;
    use hosten_console::{
        AlertBus, AlertKind, ApiError, ConsoleError, ErrorClass, FileSelectionStore, LoadState,
        MemorySelectionStore, MockTeamBackend, SelectionOutcome, SelectionStore, TeamContext,
        TeamRole,
    };
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    fn context_with(service: Arc<GatedTeamService>) -> (TeamContext, Arc<MemorySelectionStore>) {
        let store = Arc::new(MemorySelectionStore::new());
        let context = TeamContext::new(service, store.clone(), AlertBus::new());
        (context, store)
    }

    // ==================== Out-of-order resolution ====================

    /// A selects, B selects, B resolves, then A resolves: B wins
    #[tokio::test]
    async fn test_late_response_for_previous_team_is_discarded() {
        let service = Arc::new(GatedTeamService::with_teams(&["team-a", "team-b"]));
        let (context, store) = context_with(service.clone());

        let (outcome_a, outcome_b, ()) = futures::join!(
            context.select_team(Some("team-a")),
            context.select_team(Some("team-b")),
            async {
                eventually(|| service.pending("team-a") == 1 && service.pending("team-b") == 1)
                    .await;
                service.release(
                    "team-b",
                    Ok(DetailsFactory::with_permissions(
                        "team-b",
                        TeamRole::Viewer,
                        &[TeamView],
                    )),
                );
                service.release("team-a", Ok(DetailsFactory::for_role("team-a", TeamRole::Owner)));
            }
        );

        assert_eq!(outcome_a, SelectionOutcome::Superseded);
        assert!(outcome_b.is_ready());

        let snapshot = context.snapshot().unwrap();
        assert_eq!(snapshot.team_id, "team-b");
        assert_eq!(snapshot.role, TeamRole::Viewer);
        assert!(context.can(TeamView));
        assert!(!context.can(TeamDelete));
        assert_eq!(context.selected_team_id().as_deref(), Some("team-b"));

        assert_eq!(store.load().await.unwrap().as_deref(), Some("team-b"));
    }

    /// A selects, B selects, A resolves first: still only B is committed
    #[tokio::test]
    async fn test_early_response_for_previous_team_is_discarded() {
        let service = Arc::new(GatedTeamService::with_teams(&["team-a", "team-b"]));
        let (context, store) = context_with(service.clone());

        let (outcome_a, outcome_b, ()) = futures::join!(
            context.select_team(Some("team-a")),
            context.select_team(Some("team-b")),
            async {
                eventually(|| service.pending("team-a") == 1 && service.pending("team-b") == 1)
                    .await;
                service.release("team-a", Ok(DetailsFactory::for_role("team-a", TeamRole::Owner)));
                service.release("team-b", Ok(DetailsFactory::for_role("team-b", TeamRole::Member)));
            }
        );

        assert_eq!(outcome_a, SelectionOutcome::Superseded);
        assert!(outcome_b.is_ready());
        assert_eq!(context.current_role(), Some(TeamRole::Member));
        assert!(!context.is_owner());
        assert_eq!(store.load().await.unwrap().as_deref(), Some("team-b"));
    }

    /// Failure for a superseded team must not clear the new team's state
    #[tokio::test]
    async fn test_late_failure_for_previous_team_is_ignored() {
        let service = Arc::new(GatedTeamService::with_teams(&["team-a", "team-b"]));
        let (context, _store) = context_with(service.clone());

        let (outcome_a, outcome_b, ()) = futures::join!(
            context.select_team(Some("team-a")),
            context.select_team(Some("team-b")),
            async {
                eventually(|| service.pending("team-a") == 1 && service.pending("team-b") == 1)
                    .await;
                service.release("team-b", Ok(DetailsFactory::for_role("team-b", TeamRole::Admin)));
                service.release("team-a", Err(ApiError::Forbidden("gone".to_string())));
            }
        );

        assert_eq!(outcome_a, SelectionOutcome::Superseded);
        assert!(outcome_b.is_ready());
        assert_eq!(context.state(), LoadState::Ready);
        assert!(context.is_admin());
    }

    /// A response carrying a different team than requested is never committed
    #[tokio::test]
    async fn test_mismatched_team_in_response_is_discarded() {
        let service = Arc::new(GatedTeamService::with_teams(&["team-a"]));
        let (context, _store) = context_with(service.clone());

        let (outcome, ()) = futures::join!(context.select_team(Some("team-a")), async {
            eventually(|| service.pending("team-a") == 1).await;
            service.release("team-a", Ok(DetailsFactory::for_role("team-z", TeamRole::Owner)));
        });

        assert_eq!(outcome, SelectionOutcome::Superseded);
        assert!(context.snapshot().is_none());
        assert!(!context.can(TeamView));
    }

    /// Clearing while a fetch is in flight wins over the late response
    #[tokio::test]
    async fn test_clear_during_fetch() {
        let service = Arc::new(GatedTeamService::with_teams(&["team-a"]));
        let (context, store) = context_with(service.clone());

        let (outcome, cleared) = futures::join!(context.select_team(Some("team-a")), async {
            eventually(|| service.pending("team-a") == 1).await;
            let cleared = context.select_team(None).await;
            service.release("team-a", Ok(DetailsFactory::for_role("team-a", TeamRole::Owner)));
            cleared
        });

        assert_eq!(cleared, SelectionOutcome::Cleared);
        assert_eq!(outcome, SelectionOutcome::Superseded);
        assert_eq!(context.state(), LoadState::NoTeamSelected);
        assert!(context.permissions().is_empty());
        assert_eq!(store.load().await.unwrap(), None);
    }

    // ==================== Failure handling ====================

    async fn select_and_resolve(
        context: &TeamContext,
        service: &GatedTeamService,
        team_id: &str,
        result: hosten_console::sdk::Result<hosten_console::core::models::TeamDetails>,
    ) -> SelectionOutcome {
        let (outcome, ()) = futures::join!(context.select_team(Some(team_id)), async {
            eventually(|| service.pending(team_id) == 1).await;
            service.release(team_id, result);
        });
        outcome
    }

    #[tokio::test]
    async fn test_forbidden_yields_empty_permissions() {
        let service = Arc::new(GatedTeamService::with_teams(&["team-a"]));
        let store = Arc::new(MemorySelectionStore::with_selection("team-a"));
        let alerts = AlertBus::new();
        let mut rx = alerts.subscribe();
        let context = TeamContext::new(service.clone(), store.clone(), alerts);

        let outcome = select_and_resolve(
            &context,
            &service,
            "team-a",
            Err(ApiError::Forbidden("not a member".to_string())),
        )
        .await;

        assert!(matches!(outcome, SelectionOutcome::Failed(ApiError::Forbidden(_))));
        assert_eq!(context.state(), LoadState::Error(ErrorClass::Forbidden));
        assert!(context.permissions().is_empty());
        assert!(!context.can(TeamView));
        assert!(!context.can_all(&[]));
        assert_eq!(context.current_role(), None);

        // Revoked access also forgets the persisted choice
        assert_eq!(store.load().await.unwrap(), None);

        let alert = rx.try_recv().unwrap();
        assert_eq!(alert.kind, AlertKind::Error);
        assert_eq!(alert.message, "You no longer have access to this resource.");
    }

    #[tokio::test]
    async fn test_not_found_after_ready_drops_snapshot() {
        let service = Arc::new(GatedTeamService::with_teams(&["team-a"]));
        let (context, _store) = context_with(service.clone());

        let ready = select_and_resolve(
            &context,
            &service,
            "team-a",
            Ok(DetailsFactory::for_role("team-a", TeamRole::Owner)),
        )
        .await;
        assert!(ready.is_ready());
        assert!(context.can(TeamDelete));

        let (outcome, ()) = futures::join!(context.refresh_current_team(), async {
            eventually(|| service.pending("team-a") == 1).await;
            service.release("team-a", Err(ApiError::NotFound("deleted".to_string())));
        });

        assert!(matches!(outcome, SelectionOutcome::Failed(ApiError::NotFound(_))));
        assert!(context.snapshot().is_none());
        assert!(context.current_details().is_none());
        assert!(!context.can(TeamView));
    }

    #[tokio::test]
    async fn test_transient_failure_keeps_last_good_snapshot() {
        let service = Arc::new(GatedTeamService::with_teams(&["team-a"]));
        let (context, store) = context_with(service.clone());

        select_and_resolve(
            &context,
            &service,
            "team-a",
            Ok(DetailsFactory::for_role("team-a", TeamRole::Member)),
        )
        .await;

        let (outcome, ()) = futures::join!(context.refresh_current_team(), async {
            eventually(|| service.pending("team-a") == 1).await;
            service.release(
                "team-a",
                Err(ApiError::Server {
                    status: 503,
                    message: "maintenance".to_string(),
                }),
            );
        });

        assert!(matches!(outcome, SelectionOutcome::Failed(_)));
        assert_eq!(context.state(), LoadState::Error(ErrorClass::Transient));
        assert_eq!(context.current_role(), Some(TeamRole::Member));
        assert!(context.can(ProcessRestart));
        assert_eq!(store.load().await.unwrap().as_deref(), Some("team-a"));
    }

    /// Permissions of team A never survive a failed switch to team B
    #[tokio::test]
    async fn test_transient_failure_on_switch_drops_previous_team() {
        let service = Arc::new(GatedTeamService::with_teams(&["team-a", "team-b"]));
        let (context, _store) = context_with(service.clone());

        select_and_resolve(
            &context,
            &service,
            "team-a",
            Ok(DetailsFactory::for_role("team-a", TeamRole::Owner)),
        )
        .await;

        let outcome = select_and_resolve(
            &context,
            &service,
            "team-b",
            Err(ApiError::Network("connection reset".to_string())),
        )
        .await;

        assert!(matches!(outcome, SelectionOutcome::Failed(ApiError::Network(_))));
        assert!(context.snapshot().is_none());
        assert!(!context.can(TeamDelete));
        assert_eq!(context.selected_team_id().as_deref(), Some("team-b"));
    }

    #[tokio::test]
    async fn test_team_list_failure_without_selection() {
        let service = Arc::new(GatedTeamService::new());
        service.fail_team_list(ApiError::Unauthorized("expired".to_string()));
        let (context, _store) = context_with(service.clone());

        let outcome = context.initialize().await;
        assert!(matches!(outcome, SelectionOutcome::Failed(ApiError::Unauthorized(_))));
        assert_eq!(context.state(), LoadState::Error(ErrorClass::Unauthorized));
        assert_eq!(service.get_team_calls(), 0);
    }

    // ==================== Role checks ====================

    #[tokio::test]
    async fn test_viewer_checks() {
        let service = Arc::new(GatedTeamService::with_teams(&["team-a"]));
        let (context, _store) = context_with(service.clone());

        select_and_resolve(
            &context,
            &service,
            "team-a",
            Ok(DetailsFactory::for_role("team-a", TeamRole::Viewer)),
        )
        .await;

        assert!(context.can(ProcessViewLogs));
        assert!(!context.can(ProcessStart));
        assert!(context.can_any(&[ProcessStart, ProcessView]));
        assert!(!context.can_all(&[ProcessStart, ProcessView]));
        assert!(!context.is_admin());
        assert!(context.has_role(&[TeamRole::Viewer, TeamRole::Member]));

        let err = context.require(ProcessStart).unwrap_err();
        assert!(matches!(err, ConsoleError::Forbidden(_)));
        assert!(err.to_string().contains("Start Process"));
    }

    #[tokio::test]
    async fn test_owner_checks() {
        let service = Arc::new(GatedTeamService::with_teams(&["team-a"]));
        let (context, _store) = context_with(service.clone());

        select_and_resolve(
            &context,
            &service,
            "team-a",
            Ok(DetailsFactory::for_role("team-a", TeamRole::Owner)),
        )
        .await;

        assert!(context.is_owner());
        assert!(context.is_admin());
        assert!(context.can_all(hosten_console::PermissionAction::ALL.as_slice()));
        assert_ok!(context.require(TeamManagePermissions));
    }

    /// Explicit permissions from the backend win over role defaults
    #[tokio::test]
    async fn test_backend_permissions_are_authoritative() {
        let service = Arc::new(GatedTeamService::with_teams(&["team-a"]));
        let (context, _store) = context_with(service.clone());

        select_and_resolve(
            &context,
            &service,
            "team-a",
            Ok(DetailsFactory::with_permissions(
                "team-a",
                TeamRole::Admin,
                &[TeamView, ServerView],
            )),
        )
        .await;

        assert_eq!(context.current_role(), Some(TeamRole::Admin));
        assert!(context.is_admin());
        assert!(!context.can(ServerCreate));
        assert_eq!(context.permissions().len(), 2);
    }

    // ==================== Persistence ====================

    #[tokio::test]
    async fn test_selection_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".hosten").join("state.json");

        {
            let context = TeamContext::new(
                Arc::new(MockTeamBackend::new()),
                Arc::new(FileSelectionStore::new(&path)),
                AlertBus::new(),
            );
            assert!(context.initialize().await.is_ready());
            assert_eq!(context.selected_team_id().as_deref(), Some("team-001"));

            assert!(context.select_team(Some("team-003")).await.is_ready());
            assert_eq!(context.current_role(), Some(TeamRole::Member));
        }

        let restarted = TeamContext::new(
            Arc::new(MockTeamBackend::new()),
            Arc::new(FileSelectionStore::new(&path)),
            AlertBus::new(),
        );
        assert!(restarted.initialize().await.is_ready());
        assert_eq!(restarted.selected_team_id().as_deref(), Some("team-003"));
        assert_eq!(restarted.current_role(), Some(TeamRole::Member));
        assert_eq!(restarted.teams().len(), 3);
    }

    /// A refresh racing a slow save must not stop the new selection being written
    #[tokio::test]
    async fn test_refresh_during_slow_save_still_persists_selection() {
        let service = Arc::new(GatedTeamService::with_teams(&["team-a", "team-b"]));
        let store = Arc::new(GatedSelectionStore::new());
        let context = TeamContext::new(service.clone(), store.clone(), AlertBus::new());
        store.hold_next_save();

        let (outcome_b, outcome_a, refresh) = futures::join!(
            context.select_team(Some("team-b")),
            async {
                eventually(|| service.pending("team-b") == 1).await;
                service.release("team-b", Ok(DetailsFactory::for_role("team-b", TeamRole::Member)));
                eventually(|| store.held_saves() == 1).await;
                context.select_team(Some("team-a")).await
            },
            async {
                eventually(|| service.pending("team-a") == 1).await;
                service.release("team-a", Ok(DetailsFactory::for_role("team-a", TeamRole::Owner)));
                eventually(|| context.snapshot().is_some_and(|s| s.team_id == "team-a")).await;

                let (refresh, ()) = futures::join!(context.refresh_current_team(), async {
                    eventually(|| service.pending("team-a") == 1).await;
                    service.release("team-a", Err(ApiError::Network("reset".to_string())));
                });
                store.release_save();
                refresh
            }
        );

        assert!(outcome_b.is_ready());
        assert!(outcome_a.is_ready());
        assert!(matches!(refresh, SelectionOutcome::Failed(ApiError::Network(_))));

        assert_eq!(context.selected_team_id().as_deref(), Some("team-a"));
        assert_eq!(context.current_role(), Some(TeamRole::Owner));
        assert_eq!(store.load().await.unwrap().as_deref(), Some("team-a"));
    }

    #[tokio::test]
    async fn test_inaccessible_persisted_team_falls_back_to_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let store = Arc::new(FileSelectionStore::new(&path));
        store.save("team-999").await.unwrap();

        let context = TeamContext::new(Arc::new(MockTeamBackend::new()), store.clone(), AlertBus::new());
        let outcome = context.initialize().await;

        assert!(outcome.is_ready());
        assert_eq!(context.selected_team_id().as_deref(), Some("team-001"));
        assert_eq!(store.load().await.unwrap().as_deref(), Some("team-001"));
    }

    #[tokio::test]
    async fn test_corrupt_state_file_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ definitely not json").unwrap();

        let context = TeamContext::new(
            Arc::new(MockTeamBackend::new().as_user("user-005")),
            Arc::new(FileSelectionStore::new(&path)),
            AlertBus::new(),
        );

        assert!(context.initialize().await.is_ready());
        assert_eq!(context.current_role(), Some(TeamRole::Viewer));
    }
}
