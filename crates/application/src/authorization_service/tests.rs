use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use roleward_core::{AppError, AppResult, IdentitySource, NonEmptyString};
use roleward_domain::{GateDecision, LogicalPrincipal, Permission, Role, Surface, SystemRole};

use crate::test_support::{FakeRoleRepository, actor, principal};

use super::AuthorizationService;

fn service(repository: Arc<FakeRoleRepository>) -> AuthorizationService {
    AuthorizationService::new(repository)
}

#[tokio::test]
async fn check_permission_follows_creator_role() -> AppResult<()> {
    let service = service(Arc::new(FakeRoleRepository::seeded()));
    let creator = actor(SystemRole::Creator)?;

    assert!(
        !service
            .check_permission(Some(&creator), "manage_platform_config")
            .await
    );
    assert!(
        service
            .check_permission(Some(&creator), "create_proposals")
            .await
    );
    Ok(())
}

#[tokio::test]
async fn check_permission_swallows_unknown_ids() -> AppResult<()> {
    let service = service(Arc::new(FakeRoleRepository::seeded()));
    let owner = actor(SystemRole::Owner)?;

    assert!(!service.check_permission(Some(&owner), "drop_tables").await);
    assert!(!service.check_permission(None, "view_dashboard").await);
    Ok(())
}

#[tokio::test]
async fn registry_edits_are_visible_on_next_check() -> AppResult<()> {
    let repository = Arc::new(FakeRoleRepository::seeded());
    let service = service(repository.clone());
    let creator = actor(SystemRole::Creator)?;

    assert!(!service.has_permission(Some(&creator), Permission::ViewAnalytics).await);

    let edited = SystemRole::Creator
        .definition()
        .with_permissions(BTreeSet::from([Permission::ViewAnalytics]))?;
    repository.insert(edited).await;

    assert!(service.has_permission(Some(&creator), Permission::ViewAnalytics).await);
    assert!(!service.has_permission(Some(&creator), Permission::CreateProposals).await);
    Ok(())
}

#[tokio::test]
async fn registry_outage_fails_closed_for_non_elevated() -> AppResult<()> {
    let repository = Arc::new(FakeRoleRepository::seeded());
    repository.fail_reads.store(true, Ordering::SeqCst);
    let service = service(repository);

    let creator = actor(SystemRole::Creator)?;
    let super_admin = actor(SystemRole::SuperAdmin)?;

    assert!(!service.check_permission(Some(&creator), "create_proposals").await);
    assert!(service.check_permission(Some(&super_admin), "manage_users").await);
    Ok(())
}

#[tokio::test]
async fn require_permission_reports_authorization_error() -> AppResult<()> {
    let service = service(Arc::new(FakeRoleRepository::seeded()));
    let platform_admin = actor(SystemRole::PlatformAdmin)?;

    let result = service
        .require_permission(&platform_admin, Permission::EmergencyControls)
        .await;
    assert!(matches!(result, Err(AppError::Authorization(_))));

    let result = service
        .require_permission(&platform_admin, Permission::ManageUsers)
        .await;
    assert!(result.is_ok());
    Ok(())
}

#[tokio::test]
async fn resolve_accessible_surfaces_returns_matching_surfaces() -> AppResult<()> {
    let service = service(Arc::new(FakeRoleRepository::seeded()));
    let platform_admin = actor(SystemRole::PlatformAdmin)?;

    let surfaces = service
        .resolve_accessible_surfaces(Some(&platform_admin))
        .await;
    assert_eq!(
        surfaces,
        vec![
            Surface::ProposalReview,
            Surface::UserManagement,
            Surface::Compliance,
            Surface::ContentModeration,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn gate_redirects_single_capability_principal() -> AppResult<()> {
    let service = service(Arc::new(FakeRoleRepository::seeded()));
    let creator = actor(SystemRole::Creator)?;
    let user = actor(SystemRole::User)?;

    assert_eq!(
        service.resolve_gate_decision(Some(&creator)).await,
        GateDecision::Redirect(Surface::CreatorDashboard)
    );
    assert_eq!(
        service.resolve_gate_decision(Some(&user)).await,
        GateDecision::NoAccess
    );
    assert_eq!(
        service.resolve_gate_decision(None).await,
        GateDecision::NoAccess
    );
    Ok(())
}

#[tokio::test]
async fn resolve_access_pairs_surfaces_with_decision_from_one_read() -> AppResult<()> {
    let repository = Arc::new(FakeRoleRepository::seeded());
    let service = service(repository.clone());
    let creator = actor(SystemRole::Creator)?;

    let (surfaces, decision) = service.resolve_access(Some(&creator)).await;
    assert_eq!(surfaces, vec![Surface::CreatorDashboard]);
    assert_eq!(decision, GateDecision::Redirect(Surface::CreatorDashboard));
    assert_eq!(repository.list_reads.load(Ordering::SeqCst), 1);

    let widened = SystemRole::Creator.definition().with_permissions(BTreeSet::from([
        Permission::CreateProposals,
        Permission::ApproveProposals,
    ]))?;
    repository.insert(widened).await;

    let (surfaces, decision) = service.resolve_access(Some(&creator)).await;
    assert_eq!(surfaces.len(), 2);
    assert_eq!(decision, GateDecision::Chooser(surfaces));
    assert_eq!(repository.list_reads.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn gate_offers_chooser_to_elevated_principals() -> AppResult<()> {
    let service = service(Arc::new(FakeRoleRepository::seeded()));
    let super_admin = actor(SystemRole::SuperAdmin)?;

    let decision = service.resolve_gate_decision(Some(&super_admin)).await;
    assert!(
        matches!(decision, GateDecision::Chooser(surfaces) if surfaces.contains(&Surface::SuperAdminConsole))
    );
    Ok(())
}

#[tokio::test]
async fn custom_role_surfaces_resolve_through_registry() -> AppResult<()> {
    let repository = Arc::new(FakeRoleRepository::seeded());
    repository
        .insert(Role::custom(
            NonEmptyString::new("Treasury")?,
            "Token desk",
            BTreeSet::from([Permission::ManageTokens]),
        )?)
        .await;
    let service = service(repository);

    let treasurer = LogicalPrincipal::single(
        principal(
            "treasurer",
            IdentitySource::Legacy,
            "wallet1treasury",
            SystemRole::User,
        )?
        .with_role(roleward_domain::RoleId::parse("treasury")?),
    );

    assert_eq!(
        service.resolve_gate_decision(Some(&treasurer)).await,
        GateDecision::Redirect(Surface::TokenManagement)
    );
    Ok(())
}
