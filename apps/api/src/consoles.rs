use std::collections::HashMap;
use std::sync::Arc;

use roleward_application::{
    AdminConsole, AuthMode, AuthorizationService, OverviewService, RoleRegistryService,
    SessionService,
};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Scope shared by requests that carry neither a cookie nor an identity.
const DETACHED_SCOPE: &str = "detached";

/// Admin consoles keyed by the id stored in each client's cookie session.
///
/// Every console persists its admin session under its own storage key, so
/// one client's login never answers another client's checks.
pub struct AdminConsoles {
    authorization_service: AuthorizationService,
    role_registry_service: RoleRegistryService,
    session_service: SessionService,
    overview_service: OverviewService,
    consoles: RwLock<HashMap<String, Arc<AdminConsole>>>,
}

impl AdminConsoles {
    pub fn new(
        authorization_service: AuthorizationService,
        role_registry_service: RoleRegistryService,
        session_service: SessionService,
        overview_service: OverviewService,
    ) -> Self {
        Self {
            authorization_service,
            role_registry_service,
            session_service,
            overview_service,
            consoles: RwLock::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.session_service.mode()
    }

    /// Registers a console under a fresh id.
    pub async fn open(&self) -> (String, Arc<AdminConsole>) {
        let console_id = Uuid::new_v4().to_string();
        let console = self.open_with(console_id.as_str()).await;
        (console_id, console)
    }

    /// Returns the console registered under `console_id`, registering one
    /// when the process has not seen the id yet. A persisted admin session
    /// for that id is resumed on the next `connect`.
    pub async fn open_with(&self, console_id: &str) -> Arc<AdminConsole> {
        if let Some(console) = self.consoles.read().await.get(console_id) {
            return console.clone();
        }

        let mut consoles = self.consoles.write().await;
        consoles
            .entry(console_id.to_owned())
            .or_insert_with(|| {
                debug!(console_id, "opened admin console");
                Arc::new(self.build(console_id))
            })
            .clone()
    }

    /// Returns an unregistered console that holds no identity.
    pub fn detached(&self) -> Arc<AdminConsole> {
        Arc::new(self.build(DETACHED_SCOPE))
    }

    /// Forgets a console after its client logged out.
    pub async fn close(&self, console_id: &str) {
        if self.consoles.write().await.remove(console_id).is_some() {
            debug!(console_id, "closed admin console");
        }
    }

    fn build(&self, scope: &str) -> AdminConsole {
        AdminConsole::new(
            self.authorization_service.clone(),
            self.role_registry_service.clone(),
            self.session_service.scoped(scope),
            self.overview_service.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use roleward_application::{
        AuthMode, AuthorizationService, IdentityAdapter, OverviewService, RoleRegistryService,
        SessionConfig, SessionService,
    };
    use roleward_core::IdentitySource;
    use roleward_infrastructure::{
        Argon2CredentialVerifier, InMemoryAuditRepository, InMemoryPrincipalDirectory,
        InMemoryRoleRepository, InMemorySessionStore,
    };

    use super::AdminConsoles;

    fn consoles() -> AdminConsoles {
        let roles = Arc::new(InMemoryRoleRepository::new());
        let audit = Arc::new(InMemoryAuditRepository::new());
        let authorization_service = AuthorizationService::new(roles.clone());
        let identity_adapter = IdentityAdapter::new(
            Arc::new(InMemoryPrincipalDirectory::new(IdentitySource::Legacy)),
            Arc::new(InMemoryPrincipalDirectory::new(IdentitySource::Unified)),
        );

        AdminConsoles::new(
            authorization_service.clone(),
            RoleRegistryService::new(
                authorization_service.clone(),
                roles.clone(),
                identity_adapter.clone(),
                audit.clone(),
            ),
            SessionService::new(
                SessionConfig {
                    mode: AuthMode::Demo,
                    ..SessionConfig::default()
                },
                authorization_service.clone(),
                identity_adapter.clone(),
                roles.clone(),
                Arc::new(Argon2CredentialVerifier::new(HashMap::new())),
                Arc::new(InMemorySessionStore::new()),
                audit,
            ),
            OverviewService::new(authorization_service, roles, identity_adapter),
        )
    }

    #[tokio::test]
    async fn consoles_are_shared_per_id_and_forgotten_on_close() {
        let consoles = consoles();

        let (first_id, first) = consoles.open().await;
        let (second_id, second) = consoles.open().await;
        assert_ne!(first_id, second_id);
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &consoles.open_with(first_id.as_str()).await));

        consoles.close(first_id.as_str()).await;
        assert!(!Arc::ptr_eq(&first, &consoles.open_with(first_id.as_str()).await));
        assert_eq!(consoles.mode(), AuthMode::Demo);
    }
}
