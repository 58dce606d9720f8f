use std::collections::HashMap;
use std::sync::Arc;

use roleward_core::{AppError, AppResult, ConnectedIdentity, IdentitySource};
use roleward_domain::{GateDecision, Surface, SystemRole};

use crate::test_support::{
    FakeAuditRepository, FakeCredentialVerifier, FakePrincipalDirectory, FakeRoleRepository,
    FakeSessionStore, principal,
};
use crate::{
    AssignRoleInput, AuthMode, AuthorizationService, CreateRoleInput, IdentityAdapter,
    OverviewService, RoleRegistryService, SessionConfig, SessionService,
};

use super::AdminConsole;

struct Harness {
    console: AdminConsole,
    store: Arc<FakeSessionStore>,
    unified: Arc<FakePrincipalDirectory>,
}

async fn harness(mode: AuthMode) -> AppResult<Harness> {
    let roles = Arc::new(FakeRoleRepository::seeded());
    let legacy = Arc::new(FakePrincipalDirectory::new(IdentitySource::Legacy));
    let unified = Arc::new(FakePrincipalDirectory::new(IdentitySource::Unified));
    let store = Arc::new(FakeSessionStore::default());
    let audit = Arc::new(FakeAuditRepository::default());

    unified
        .put(principal(
            "unified-a",
            IdentitySource::Unified,
            "wallet1a",
            SystemRole::SuperAdmin,
        )?)
        .await;
    unified
        .put(principal(
            "unified-b",
            IdentitySource::Unified,
            "wallet1b",
            SystemRole::Creator,
        )?)
        .await;

    let verifier = FakeCredentialVerifier {
        secrets: HashMap::from([
            ("wallet1a".to_owned(), "secret-a".to_owned()),
            ("wallet1b".to_owned(), "secret-b".to_owned()),
        ]),
    };

    let authorization_service = AuthorizationService::new(roles.clone());
    let identity_adapter = IdentityAdapter::new(legacy, unified.clone());
    let console = AdminConsole::new(
        authorization_service.clone(),
        RoleRegistryService::new(
            authorization_service.clone(),
            roles.clone(),
            identity_adapter.clone(),
            audit.clone(),
        ),
        SessionService::new(
            SessionConfig {
                mode,
                ..SessionConfig::default()
            },
            authorization_service.clone(),
            identity_adapter.clone(),
            roles.clone(),
            Arc::new(verifier),
            store.clone(),
            audit,
        ),
        OverviewService::new(authorization_service, roles, identity_adapter),
    );

    Ok(Harness {
        console,
        store,
        unified,
    })
}

fn identity(value: &str) -> AppResult<ConnectedIdentity> {
    ConnectedIdentity::new(value, IdentitySource::Unified)
}

#[tokio::test]
async fn identity_change_invalidates_session_and_old_grants() -> AppResult<()> {
    let harness = harness(AuthMode::Production).await?;

    assert!(!harness.console.connect(identity("wallet1a")?).await);
    harness
        .console
        .login(None, Some("secret-a".to_owned()))
        .await?;
    assert!(harness.console.check_permission("manage_roles").await);

    assert!(!harness.console.connect(identity("wallet1b")?).await);
    assert!(harness.console.current_session().await.is_none());
    assert!(!harness.console.check_permission("manage_roles").await);
    assert!(!harness.console.check_permission("view_dashboard").await);
    assert!(harness.store.records.lock().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn same_identity_keeps_session() -> AppResult<()> {
    let harness = harness(AuthMode::Production).await?;

    harness.console.connect(identity("wallet1b")?).await;
    harness
        .console
        .login(None, Some("secret-b".to_owned()))
        .await?;

    assert!(harness.console.connect(identity("wallet1b")?).await);
    assert!(harness.console.check_permission("create_proposals").await);
    assert_eq!(
        harness.console.gate_decision().await,
        GateDecision::Redirect(Surface::CreatorDashboard)
    );
    Ok(())
}

#[tokio::test]
async fn login_requires_connected_identity() -> AppResult<()> {
    let harness = harness(AuthMode::Demo).await?;

    let result = harness
        .console
        .login(Some("owner".to_owned()), None)
        .await;
    assert!(matches!(result, Err(AppError::Authentication(_))));
    Ok(())
}

#[tokio::test]
async fn mutations_require_session_but_listing_does_not() -> AppResult<()> {
    let harness = harness(AuthMode::Production).await?;
    harness.console.connect(identity("wallet1a")?).await;

    assert_eq!(
        harness.console.list_roles().await?.len(),
        SystemRole::all().len()
    );
    let result = harness
        .console
        .create_role(CreateRoleInput {
            name: "Reviewers".to_owned(),
            description: String::new(),
            permissions: Vec::new(),
        })
        .await;
    assert!(matches!(result, Err(AppError::Authorization(_))));
    assert!(matches!(
        harness.console.overview().await,
        Err(AppError::Authorization(_))
    ));
    assert!(harness.console.available_surfaces().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn demo_session_drives_surfaces_and_mutations() -> AppResult<()> {
    let harness = harness(AuthMode::Demo).await?;
    harness.console.connect(identity("wallet1visitor")?).await;

    harness
        .console
        .login(Some("super_admin".to_owned()), None)
        .await?;

    let surfaces = harness.console.available_surfaces().await;
    assert!(surfaces.contains(&Surface::SuperAdminConsole));
    assert!(!surfaces.contains(&Surface::OwnerConsole));
    assert!(matches!(
        harness.console.gate_decision().await,
        GateDecision::Chooser(_)
    ));

    let created = harness
        .console
        .create_role(CreateRoleInput {
            name: "Reviewers".to_owned(),
            description: String::new(),
            permissions: vec!["approve_proposals".to_owned()],
        })
        .await?;
    harness.console.delete_role(created.id().as_str()).await?;

    assert!(harness.console.logout().await.is_none());
    assert!(!harness.console.check_permission("view_dashboard").await);
    Ok(())
}

#[tokio::test]
async fn persisted_session_resumes_on_reconnect() -> AppResult<()> {
    let harness = harness(AuthMode::Production).await?;
    harness.console.connect(identity("wallet1a")?).await;
    harness
        .console
        .login(None, Some("secret-a".to_owned()))
        .await?;

    let restarted = console_sharing_store(&harness);
    assert!(restarted.connect(identity("wallet1a")?).await);
    assert!(restarted.check_permission("emergency_controls").await);
    Ok(())
}

#[tokio::test]
async fn refresh_drops_deactivated_principal() -> AppResult<()> {
    let harness = harness(AuthMode::Production).await?;
    harness.console.connect(identity("wallet1b")?).await;
    harness
        .console
        .login(None, Some("secret-b".to_owned()))
        .await?;

    harness
        .unified
        .put(
            principal(
                "unified-b",
                IdentitySource::Unified,
                "wallet1b",
                SystemRole::Creator,
            )?
            .with_active(false),
        )
        .await;

    let result = harness.console.refresh_session().await;
    assert!(matches!(result, Err(AppError::Authentication(_))));
    assert!(harness.console.current_session().await.is_none());
    Ok(())
}

#[tokio::test]
async fn demotion_applies_to_the_next_check() -> AppResult<()> {
    let harness = harness(AuthMode::Production).await?;
    harness.console.connect(identity("wallet1a")?).await;
    harness
        .console
        .login(None, Some("secret-a".to_owned()))
        .await?;
    assert!(harness.console.check_permission("emergency_controls").await);

    harness
        .console
        .assign_role(AssignRoleInput {
            identity_source: IdentitySource::Unified,
            principal_id: "unified-a".to_owned(),
            role_id: "user".to_owned(),
        })
        .await?;

    assert!(!harness.console.check_permission("emergency_controls").await);
    assert!(!harness.console.check_permission("manage_roles").await);
    let result = harness
        .console
        .create_role(CreateRoleInput {
            name: "Escape Hatch".to_owned(),
            description: String::new(),
            permissions: Vec::new(),
        })
        .await;
    assert!(matches!(result, Err(AppError::Authorization(_))));
    assert_eq!(harness.console.access().await, (Vec::new(), GateDecision::NoAccess));
    assert_eq!(
        harness
            .console
            .current_session()
            .await
            .map(|session| session.role.as_str().to_owned()),
        Some("user".to_owned())
    );
    Ok(())
}

#[tokio::test]
async fn deactivated_principal_loses_grants_before_refresh() -> AppResult<()> {
    let harness = harness(AuthMode::Production).await?;
    harness.console.connect(identity("wallet1a")?).await;
    harness
        .console
        .login(None, Some("secret-a".to_owned()))
        .await?;

    harness
        .unified
        .put(
            principal(
                "unified-a",
                IdentitySource::Unified,
                "wallet1a",
                SystemRole::SuperAdmin,
            )?
            .with_active(false),
        )
        .await;

    assert!(!harness.console.check_permission("view_dashboard").await);
    assert!(matches!(
        harness.console.overview().await,
        Err(AppError::Authorization(_))
    ));
    Ok(())
}

fn console_sharing_store(previous: &Harness) -> AdminConsole {
    let roles = Arc::new(FakeRoleRepository::seeded());
    let legacy = Arc::new(FakePrincipalDirectory::new(IdentitySource::Legacy));
    let audit = Arc::new(FakeAuditRepository::default());
    let authorization_service = AuthorizationService::new(roles.clone());
    let identity_adapter = IdentityAdapter::new(legacy, previous.unified.clone());

    AdminConsole::new(
        authorization_service.clone(),
        RoleRegistryService::new(
            authorization_service.clone(),
            roles.clone(),
            identity_adapter.clone(),
            audit.clone(),
        ),
        SessionService::new(
            SessionConfig::default(),
            authorization_service.clone(),
            identity_adapter.clone(),
            roles.clone(),
            Arc::new(FakeCredentialVerifier::default()),
            previous.store.clone(),
            audit,
        ),
        OverviewService::new(authorization_service, roles, identity_adapter),
    )
}
