//! In-memory backend integration tests
//!
//! Drives the team context and the demo backend together, the way the CLI
//! does with `--mock`.

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use hosten_console::PermissionAction::*;
    use hosten_console::core::models::{
        CreateInvitationPayload, CreateTeamPayload, InvitationStatus, UpdateTeamPayload,
    };
    use hosten_console::{
        AlertBus, ApiError, LoadState, MemorySelectionStore, MockTeamBackend, SelectionOutcome,
        SelectionStore, TeamContext, TeamRole, TeamService,
    };
    use std::sync::Arc;

    fn january() -> DateTime<Utc> {
        "2026-01-25T12:00:00Z".parse().unwrap()
    }

    fn context_for(backend: Arc<MockTeamBackend>) -> (TeamContext, Arc<MemorySelectionStore>) {
        let store = Arc::new(MemorySelectionStore::new());
        let context = TeamContext::new(backend, store.clone(), AlertBus::new());
        (context, store)
    }

    #[tokio::test]
    async fn test_default_user_sees_three_teams() {
        let (context, _store) = context_for(Arc::new(MockTeamBackend::new()));

        assert!(context.initialize().await.is_ready());
        let ids: Vec<String> = context.teams().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["team-001", "team-002", "team-003"]);

        assert!(context.is_owner());
        assert!(context.select_team(Some("team-003")).await.is_ready());
        assert_eq!(context.current_role(), Some(TeamRole::Member));
        assert!(context.can(ProcessStart));
        assert!(!context.can(ServerCreate));
    }

    #[tokio::test]
    async fn test_user_without_teams() {
        let (context, store) = context_for(Arc::new(MockTeamBackend::empty()));

        assert_eq!(context.initialize().await, SelectionOutcome::Cleared);
        assert_eq!(context.state(), LoadState::NoTeamSelected);
        assert!(context.teams().is_empty());
        assert!(!context.can(TeamView));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_accepted_invitation_grants_access() {
        let backend = Arc::new(MockTeamBackend::new().as_user("user-005").at(january()));
        let (context, _store) = context_for(backend.clone());

        assert!(context.initialize().await.is_ready());
        assert_eq!(context.teams().len(), 1);
        assert_eq!(context.current_role(), Some(TeamRole::Viewer));

        let accepted = backend.accept_invitation("inv_dev123intern").await.unwrap();
        assert_eq!(accepted.member.role, TeamRole::Viewer);

        // A selection exists, so the refresh only updates the list
        assert_eq!(context.refresh_teams().await, SelectionOutcome::Unchanged);
        assert_eq!(context.teams().len(), 2);

        assert!(context.select_team(Some("team-002")).await.is_ready());
        assert!(context.can(ProcessViewLogs));
        assert!(!context.can(ProcessStop));
    }

    #[tokio::test]
    async fn test_created_team_is_owned_then_deleted() {
        let backend = Arc::new(MockTeamBackend::new());
        let (context, store) = context_for(backend.clone());
        context.initialize().await;

        let team = backend
            .create_team(&CreateTeamPayload {
                name: "  Night Shift Ops ".to_string(),
                description: Some("On-call rotation".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(team.slug, "night-shift-ops");

        assert!(context.select_team(Some(&team.id)).await.is_ready());
        assert!(context.is_owner());
        assert_eq!(store.load().await.unwrap(), Some(team.id.clone()));

        let renamed = backend
            .update_team(
                &team.id,
                &UpdateTeamPayload {
                    name: Some("Night Ops".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(context.refresh_current_team().await.is_ready());
        assert_eq!(context.current_team().unwrap().name, renamed.name);

        backend.delete_team(&team.id).await.unwrap();
        let outcome = context.refresh_current_team().await;
        assert!(matches!(outcome, SelectionOutcome::Failed(ApiError::NotFound(_))));
        assert!(context.permissions().is_empty());
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invitation_uses_role_defaults() {
        let backend = MockTeamBackend::new()
            .with_origin("https://console.hosten.io/")
            .at(january());

        let response = backend
            .create_invitation(&CreateInvitationPayload::new(
                "team-001",
                "  Ops@Example.com ",
                TeamRole::Admin,
            ))
            .await
            .unwrap();

        assert_eq!(response.invitation.email, "ops@example.com");
        assert_eq!(response.invitation.status, InvitationStatus::Pending);
        assert_eq!(
            response.invitation.permissions,
            TeamRole::Admin.default_actions().to_vec()
        );
        assert_eq!(
            response.invite_link,
            format!("https://console.hosten.io/invite/{}", response.invitation.token)
        );
        assert_eq!(
            response.invitation.expires_at - response.invitation.created_at,
            chrono::Duration::days(7)
        );

        let custom = backend
            .create_invitation(
                &CreateInvitationPayload::new("team-001", "ro@example.com", TeamRole::Member)
                    .with_permissions(vec![TeamView]),
            )
            .await
            .unwrap();
        assert_eq!(custom.invitation.permissions, vec![TeamView]);

        let pending = backend.list_invitations("team-001").await.unwrap();
        assert!(pending.iter().any(|i| i.email == "ro@example.com"));
    }

    #[tokio::test]
    async fn test_leaving_removes_team_from_list() {
        let backend = Arc::new(MockTeamBackend::new());
        let (context, _store) = context_for(backend.clone());
        context.initialize().await;

        backend.leave_team("team-003").await.unwrap();
        context.refresh_teams().await;

        assert!(context.teams().iter().all(|t| t.id != "team-003"));
        assert_eq!(context.teams().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_team_is_not_found() {
        let backend = MockTeamBackend::new();
        assert!(matches!(
            backend.get_team("team-404").await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            backend.list_members("team-404").await,
            Err(ApiError::NotFound(_))
        ));
    }
}
