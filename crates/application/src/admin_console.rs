use roleward_core::{AppError, AppResult, ConnectedIdentity};
use roleward_domain::{GateDecision, LogicalPrincipal, Principal, Role, Surface};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{
    AdminOverview, AssignRoleInput, AuthMode, AuthorizationService, CreateRoleInput,
    LoginRequest, OverviewService, RoleRegistryService, Session, SessionOutcome, SessionService,
};

#[cfg(test)]
mod tests;

#[derive(Debug, Default)]
struct ConsoleState {
    identity: Option<ConnectedIdentity>,
    session: Option<Session>,
    principal: Option<LogicalPrincipal>,
}

impl ConsoleState {
    fn end_session(&mut self) -> Option<Session> {
        self.principal = None;
        self.session.take()
    }
}

/// Per-client facade over the admin services.
///
/// Holds one client's connected identity and session, and answers every
/// capability question for that session's principal.
pub struct AdminConsole {
    authorization_service: AuthorizationService,
    role_registry_service: RoleRegistryService,
    session_service: SessionService,
    overview_service: OverviewService,
    state: RwLock<ConsoleState>,
}

impl AdminConsole {
    /// Creates a console with no connected identity.
    #[must_use]
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
            state: RwLock::new(ConsoleState::default()),
        }
    }

    /// Returns the configured login mode.
    #[must_use]
    pub fn mode(&self) -> AuthMode {
        self.session_service.mode()
    }

    /// Records the identity currently connected to the admin surface.
    ///
    /// A session bound to another identity is invalidated. When no session
    /// is held, a persisted one for the new identity is resumed. Returns
    /// whether a session is active afterwards.
    pub async fn connect(&self, identity: ConnectedIdentity) -> bool {
        let mut state = self.state.write().await;

        if let Some(session) = state.session.as_ref() {
            if !self.session_service.validate(session, identity.value()).await {
                state.end_session();
            }
        }

        let changed = state.identity.as_ref() != Some(&identity);
        if state.session.is_none() && changed {
            if let Some(outcome) = self.session_service.resume(&identity).await {
                debug!(principal_id = %outcome.session.principal_id, "resumed admin session");
                state.session = Some(outcome.session);
                state.principal = Some(outcome.principal);
            }
        }

        state.identity = Some(identity);
        state.session.is_some()
    }

    /// Returns whether the current principal holds a permission.
    pub async fn check_permission(&self, permission_id: &str) -> bool {
        let principal = self.current_principal().await;
        self.authorization_service
            .check_permission(principal.as_ref(), permission_id)
            .await
    }

    /// Returns the surfaces the current principal may reach.
    pub async fn available_surfaces(&self) -> Vec<Surface> {
        let principal = self.current_principal().await;
        self.authorization_service
            .resolve_accessible_surfaces(principal.as_ref())
            .await
    }

    /// Returns the routing decision for the admin entry screen.
    pub async fn gate_decision(&self) -> GateDecision {
        let principal = self.current_principal().await;
        self.authorization_service
            .resolve_gate_decision(principal.as_ref())
            .await
    }

    /// Returns the reachable surfaces and the routing decision derived from
    /// the same registry read.
    pub async fn access(&self) -> (Vec<Surface>, GateDecision) {
        let principal = self.current_principal().await;
        self.authorization_service
            .resolve_access(principal.as_ref())
            .await
    }

    /// Starts a session for the connected identity.
    pub async fn login(
        &self,
        requested_role: Option<String>,
        credentials: Option<String>,
    ) -> AppResult<SessionOutcome> {
        let mut state = self.state.write().await;
        let identity = state.identity.clone().ok_or_else(|| {
            AppError::Authentication("no identity is connected".to_owned())
        })?;

        let outcome = self
            .session_service
            .login(LoginRequest {
                identity,
                requested_role,
                credentials,
            })
            .await?;

        state.session = Some(outcome.session.clone());
        state.principal = Some(outcome.principal.clone());
        Ok(outcome)
    }

    /// Ends the current session. Returns a warning when persisted state
    /// could not be cleared.
    pub async fn logout(&self) -> Option<String> {
        let mut state = self.state.write().await;
        let session = state.end_session();
        self.session_service.logout(session.as_ref()).await
    }

    /// Re-materializes the current session from the registry.
    ///
    /// A principal that is no longer an active admin loses the session.
    pub async fn refresh_session(&self) -> AppResult<SessionOutcome> {
        let mut state = self.state.write().await;
        let (Some(session), Some(principal)) = (state.session.as_ref(), state.principal.as_ref())
        else {
            return Err(AppError::Authentication("no active admin session".to_owned()));
        };

        match self.session_service.refresh(session, principal).await {
            Ok(outcome) => {
                state.session = Some(outcome.session.clone());
                state.principal = Some(outcome.principal.clone());
                Ok(outcome)
            }
            Err(error) => {
                info!(error = %error, "admin session dropped on refresh");
                let session = state.end_session();
                self.session_service.logout(session.as_ref()).await;
                Err(error)
            }
        }
    }

    /// Returns the current session, if any.
    pub async fn current_session(&self) -> Option<Session> {
        self.state.read().await.session.clone()
    }

    /// Lists every role. Available without a session so demo login can
    /// offer the roles to assume.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.role_registry_service.list_roles().await
    }

    /// Returns one role.
    pub async fn get_role(&self, role_id: &str) -> AppResult<Role> {
        self.role_registry_service.get_role(role_id).await
    }

    /// Creates a custom role as the current principal.
    pub async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let actor = self.actor().await?;
        self.role_registry_service.create_role(&actor, input).await
    }

    /// Replaces a role's permission set as the current principal.
    pub async fn update_role_permissions(
        &self,
        role_id: &str,
        permissions: &[String],
    ) -> AppResult<Role> {
        let actor = self.actor().await?;
        self.role_registry_service
            .update_role_permissions(role_id, permissions, &actor)
            .await
    }

    /// Updates a role's description as the current principal.
    pub async fn update_role_details(&self, role_id: &str, description: &str) -> AppResult<Role> {
        let actor = self.actor().await?;
        self.role_registry_service
            .update_role_details(role_id, description, &actor)
            .await
    }

    /// Deletes a custom role as the current principal.
    pub async fn delete_role(&self, role_id: &str) -> AppResult<()> {
        let actor = self.actor().await?;
        self.role_registry_service.delete_role(role_id, &actor).await
    }

    /// Moves a principal record to another role as the current principal.
    pub async fn assign_role(&self, input: AssignRoleInput) -> AppResult<Principal> {
        let actor = self.actor().await?;
        self.role_registry_service.assign_role(&actor, input).await
    }

    /// Loads the admin overview for the current principal.
    pub async fn overview(&self) -> AppResult<AdminOverview> {
        let actor = self.actor().await?;
        self.overview_service.load_overview(&actor).await
    }

    /// Re-resolves the session principal so every check sees the role it
    /// holds now. The cached session follows a changed role.
    async fn current_principal(&self) -> Option<LogicalPrincipal> {
        let cached = self.state.read().await.principal.clone()?;
        let current = self.session_service.current_principal(&cached).await;

        match current.as_ref() {
            Some(principal) if principal != &cached => {
                let permissions = self
                    .authorization_service
                    .effective_permissions(Some(principal))
                    .await;
                let mut state = self.state.write().await;
                if state.principal.as_ref() == Some(&cached) {
                    info!(
                        principal_id = principal.primary().id(),
                        role = %principal.role(),
                        "session principal changed in directory"
                    );
                    state.principal = Some(principal.clone());
                    if let Some(session) = state.session.as_mut() {
                        session.role = principal.role().clone();
                        session.permissions = permissions;
                    }
                }
            }
            Some(_) => {}
            None => debug!(
                principal_id = cached.primary().id(),
                "session principal no longer resolves, denying"
            ),
        }

        current
    }

    async fn actor(&self) -> AppResult<LogicalPrincipal> {
        self.current_principal()
            .await
            .ok_or_else(|| AppError::Authorization("no active admin session".to_owned()))
    }
}
