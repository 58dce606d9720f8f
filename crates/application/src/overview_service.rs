use std::future::Future;
use std::sync::Arc;

use roleward_core::{AppResult, IdentitySource};
use roleward_domain::{LogicalPrincipal, Permission, Principal, Role};
use tracing::warn;

use crate::{AuthorizationService, IdentityAdapter, RoleRepository};

/// Supporting data that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Subsystem whose load failed.
    pub subsystem: &'static str,
    /// Failure description.
    pub message: String,
}

/// Data backing the admin overview screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminOverview {
    /// Role registry contents.
    pub roles: Vec<Role>,
    /// Legacy principal records, when the actor may manage users.
    pub legacy_principals: Vec<Principal>,
    /// Unified principal records, when the actor may manage users.
    pub unified_principals: Vec<Principal>,
    /// Loads that failed; the rest of the overview is still usable.
    pub warnings: Vec<LoadWarning>,
}

/// Loads overview data from independent collaborators concurrently.
#[derive(Clone)]
pub struct OverviewService {
    authorization_service: AuthorizationService,
    role_repository: Arc<dyn RoleRepository>,
    identity_adapter: IdentityAdapter,
}

impl OverviewService {
    /// Creates a new overview service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        role_repository: Arc<dyn RoleRepository>,
        identity_adapter: IdentityAdapter,
    ) -> Self {
        Self {
            authorization_service,
            role_repository,
            identity_adapter,
        }
    }

    /// Loads the overview, isolating each subsystem's failure.
    pub async fn load_overview(&self, actor: &LogicalPrincipal) -> AppResult<AdminOverview> {
        self.authorization_service
            .require_permission(actor, Permission::ViewDashboard)
            .await?;
        let include_principals = self
            .authorization_service
            .has_permission(Some(actor), Permission::ManageUsers)
            .await;

        let legacy = self.identity_adapter.directory(IdentitySource::Legacy);
        let unified = self.identity_adapter.directory(IdentitySource::Unified);

        let (roles, legacy_principals, unified_principals) = tokio::join!(
            self.role_repository.list_roles(),
            load_if(include_principals, legacy.list_principals()),
            load_if(include_principals, unified.list_principals()),
        );

        let mut warnings = Vec::new();
        let roles = collect("roles", roles, &mut warnings);
        let legacy_principals = collect("legacy_principals", legacy_principals, &mut warnings);
        let unified_principals = collect("unified_principals", unified_principals, &mut warnings);

        Ok(AdminOverview {
            roles,
            legacy_principals,
            unified_principals,
            warnings,
        })
    }
}

async fn load_if<T>(
    enabled: bool,
    load: impl Future<Output = AppResult<Vec<T>>>,
) -> AppResult<Vec<T>> {
    if enabled { load.await } else { Ok(Vec::new()) }
}

fn collect<T>(
    subsystem: &'static str,
    result: AppResult<Vec<T>>,
    warnings: &mut Vec<LoadWarning>,
) -> Vec<T> {
    match result {
        Ok(values) => values,
        Err(error) => {
            warn!(subsystem, error = %error, "overview load failed");
            warnings.push(LoadWarning {
                subsystem,
                message: error.to_string(),
            });
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use roleward_core::{AppError, AppResult, IdentitySource};
    use roleward_domain::SystemRole;

    use super::OverviewService;
    use crate::test_support::{FakePrincipalDirectory, FakeRoleRepository, actor, principal};
    use crate::{AuthorizationService, IdentityAdapter};

    struct Harness {
        service: OverviewService,
        legacy: Arc<FakePrincipalDirectory>,
        unified: Arc<FakePrincipalDirectory>,
    }

    async fn harness() -> AppResult<Harness> {
        let roles = Arc::new(FakeRoleRepository::seeded());
        let legacy = Arc::new(FakePrincipalDirectory::new(IdentitySource::Legacy));
        let unified = Arc::new(FakePrincipalDirectory::new(IdentitySource::Unified));
        legacy
            .put(principal(
                "legacy-1",
                IdentitySource::Legacy,
                "wallet1one",
                SystemRole::Creator,
            )?)
            .await;
        unified
            .put(principal(
                "unified-1",
                IdentitySource::Unified,
                "account-1",
                SystemRole::User,
            )?)
            .await;

        let service = OverviewService::new(
            AuthorizationService::new(roles.clone()),
            roles,
            IdentityAdapter::new(legacy.clone(), unified.clone()),
        );

        Ok(Harness {
            service,
            legacy,
            unified,
        })
    }

    #[tokio::test]
    async fn loads_every_subsystem() -> AppResult<()> {
        let harness = harness().await?;
        let overview = harness
            .service
            .load_overview(&actor(SystemRole::PlatformAdmin)?)
            .await?;

        assert_eq!(overview.roles.len(), SystemRole::all().len());
        assert_eq!(overview.legacy_principals.len(), 1);
        assert_eq!(overview.unified_principals.len(), 1);
        assert!(overview.warnings.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn failing_subsystem_is_reported_without_blocking_others() -> AppResult<()> {
        let harness = harness().await?;
        harness.legacy.fail_reads.store(true, Ordering::SeqCst);

        let overview = harness
            .service
            .load_overview(&actor(SystemRole::SuperAdmin)?)
            .await?;

        assert_eq!(overview.roles.len(), SystemRole::all().len());
        assert!(overview.legacy_principals.is_empty());
        assert_eq!(overview.unified_principals.len(), 1);
        assert_eq!(overview.warnings.len(), 1);
        assert_eq!(overview.warnings[0].subsystem, "legacy_principals");
        Ok(())
    }

    #[tokio::test]
    async fn principal_lists_need_user_management() -> AppResult<()> {
        let harness = harness().await?;
        harness.unified.fail_reads.store(true, Ordering::SeqCst);

        let overview = harness
            .service
            .load_overview(&actor(SystemRole::Creator)?)
            .await?;

        assert!(overview.legacy_principals.is_empty());
        assert!(overview.unified_principals.is_empty());
        assert!(overview.warnings.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn overview_requires_dashboard_access() -> AppResult<()> {
        let harness = harness().await?;
        let result = harness.service.load_overview(&actor(SystemRole::User)?).await;
        assert!(result.is_ok());

        let inactive = roleward_domain::LogicalPrincipal::single(
            principal(
                "gone",
                IdentitySource::Unified,
                "account-gone",
                SystemRole::Owner,
            )?
            .with_active(false),
        );
        let result = harness.service.load_overview(&inactive).await;
        assert!(matches!(result, Err(AppError::Authorization(_))));
        Ok(())
    }
}
