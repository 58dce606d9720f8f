use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use roleward_core::{AppError, AppResult, ConnectedIdentity};
use roleward_domain::{AuditAction, LogicalPrincipal, Permission, Principal, RoleId};
use tracing::{info, warn};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, CredentialVerifier, IdentityAdapter,
    PersistedSession, RoleRepository, SessionStore,
};


/// Storage key used when none is configured.
pub const DEFAULT_SESSION_STORAGE_KEY: &str = "roleward:admin_session";

/// How login establishes trust in a connected identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Credentials are required and the identity must be a known principal.
    Production,
    /// Any connected identity may assume any role without credentials.
    Demo,
}

impl AuthMode {
    /// Derives the mode from trusted configuration flags.
    ///
    /// Demo mode needs both a non-production environment and the explicit
    /// opt-in flag; every other combination yields production.
    #[must_use]
    pub fn from_flags(is_production_environment: bool, allow_demo_login: bool) -> Self {
        if !is_production_environment && allow_demo_login {
            Self::Demo
        } else {
            Self::Production
        }
    }
}

/// Session manager configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Login mode.
    pub mode: AuthMode,
    /// Key the session record is persisted under.
    pub storage_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::Production,
            storage_key: DEFAULT_SESSION_STORAGE_KEY.to_owned(),
        }
    }
}

/// Current principal's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Principal record id.
    pub principal_id: String,
    /// Wallet address or account id the session is bound to.
    pub bound_identity: String,
    /// Authoritative role at the last refresh.
    pub role: RoleId,
    /// Permissions materialized at the last refresh.
    pub permissions: BTreeSet<Permission>,
    /// Login time.
    pub created_at: DateTime<Utc>,
    /// Last activity time.
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    fn to_record(&self) -> PersistedSession {
        PersistedSession {
            principal_id: self.principal_id.clone(),
            bound_identity: self.bound_identity.clone(),
            role: self.role.clone(),
            created_at: self.created_at,
            last_active_at: self.last_active_at,
        }
    }
}

/// Login parameters supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// Identity currently connected to the admin surface.
    pub identity: ConnectedIdentity,
    /// Role to assume; mandatory in demo mode unless the identity is known.
    pub requested_role: Option<String>,
    /// Secret checked by the credential verifier in production mode.
    pub credentials: Option<String>,
}

/// Result of a session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    /// The usable in-memory session.
    pub session: Session,
    /// The principal the session resolves permissions for.
    pub principal: LogicalPrincipal,
    /// Set when the session could not be persisted.
    pub persistence_warning: Option<String>,
}

/// Owns login, refresh, validation and invalidation of admin sessions.
#[derive(Clone)]
pub struct SessionService {
    config: SessionConfig,
    authorization_service: AuthorizationService,
    identity_adapter: IdentityAdapter,
    role_repository: Arc<dyn RoleRepository>,
    credential_verifier: Arc<dyn CredentialVerifier>,
    store: Arc<dyn SessionStore>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl SessionService {
    /// Creates a session service from required dependencies.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        authorization_service: AuthorizationService,
        identity_adapter: IdentityAdapter,
        role_repository: Arc<dyn RoleRepository>,
        credential_verifier: Arc<dyn CredentialVerifier>,
        store: Arc<dyn SessionStore>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            config,
            authorization_service,
            identity_adapter,
            role_repository,
            credential_verifier,
            store,
            audit_repository,
        }
    }

    /// Returns the configured login mode.
    #[must_use]
    pub fn mode(&self) -> AuthMode {
        self.config.mode
    }

    /// Returns a copy persisting its session under `"{storage_key}:{scope}"`.
    #[must_use]
    pub fn scoped(&self, scope: &str) -> Self {
        Self {
            config: SessionConfig {
                storage_key: format!("{}:{scope}", self.config.storage_key),
                ..self.config.clone()
            },
            ..self.clone()
        }
    }

    /// Returns the storage key the session record is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        self.config.storage_key.as_str()
    }

    /// Re-reads the session principal from its directories.
    ///
    /// In production mode role assignments made since login apply to the
    /// next check, and a principal that is gone or inactive yields `None`.
    pub async fn current_principal(
        &self,
        principal: &LogicalPrincipal,
    ) -> Option<LogicalPrincipal> {
        match self.config.mode {
            AuthMode::Production => match self.identity_adapter.reload(principal).await {
                Ok(reloaded) => reloaded.filter(LogicalPrincipal::is_active),
                Err(error) => {
                    warn!(
                        principal_id = principal.primary().id(),
                        error = %error,
                        "failed to reload session principal"
                    );
                    None
                }
            },
            AuthMode::Demo => Some(principal.clone()),
        }
    }

    /// Establishes a session for the connected identity.
    pub async fn login(&self, request: LoginRequest) -> AppResult<SessionOutcome> {
        let principal = match self.config.mode {
            AuthMode::Production => self.authenticate(&request).await?,
            AuthMode::Demo => self.assume_role(&request).await?,
        };

        let now = Utc::now();
        let session = Session {
            principal_id: principal.primary().id().to_owned(),
            bound_identity: request.identity.value().to_owned(),
            role: principal.role().clone(),
            permissions: self
                .authorization_service
                .effective_permissions(Some(&principal))
                .await,
            created_at: now,
            last_active_at: now,
        };

        info!(
            principal_id = %session.principal_id,
            role = %session.role,
            mode = ?self.config.mode,
            "admin session started"
        );
        self.record(
            AuditAction::SessionStarted,
            &session,
            format!("logged in as '{}'", session.role),
        )
        .await;

        let persistence_warning = self.persist(&session).await;
        Ok(SessionOutcome {
            session,
            principal,
            persistence_warning,
        })
    }

    /// Marks the session active now and re-materializes its permissions.
    ///
    /// In production mode the principal records are re-read so role
    /// assignments made since login take effect.
    pub async fn refresh(
        &self,
        session: &Session,
        principal: &LogicalPrincipal,
    ) -> AppResult<SessionOutcome> {
        let principal = match self.config.mode {
            AuthMode::Production => self
                .identity_adapter
                .reload(principal)
                .await?
                .filter(LogicalPrincipal::is_active)
                .ok_or_else(|| {
                    AppError::Authentication(format!(
                        "principal '{}' is no longer an active admin",
                        session.principal_id
                    ))
                })?,
            AuthMode::Demo => principal.clone(),
        };

        let refreshed = Session {
            role: principal.role().clone(),
            permissions: self
                .authorization_service
                .effective_permissions(Some(&principal))
                .await,
            last_active_at: Utc::now().max(session.last_active_at),
            ..session.clone()
        };

        let persistence_warning = self.persist(&refreshed).await;
        Ok(SessionOutcome {
            session: refreshed,
            principal,
            persistence_warning,
        })
    }

    /// Returns whether the session is still bound to the connected identity.
    ///
    /// A mismatch clears the persisted record before returning `false`.
    pub async fn validate(&self, session: &Session, current_identity: &str) -> bool {
        if session.bound_identity == current_identity {
            return true;
        }

        warn!(
            principal_id = %session.principal_id,
            "connected identity changed, invalidating admin session"
        );
        if let Some(warning) = self.clear_persisted().await {
            warn!(warning = %warning, "stale session record could not be cleared");
        }
        self.record(
            AuditAction::SessionInvalidated,
            session,
            "connected identity no longer matches".to_owned(),
        )
        .await;

        false
    }

    /// Clears persisted session state unconditionally.
    ///
    /// Returns a warning when the persisted record could not be removed.
    pub async fn logout(&self, session: Option<&Session>) -> Option<String> {
        if let Some(session) = session {
            info!(principal_id = %session.principal_id, "admin session ended");
            self.record(AuditAction::SessionEnded, session, "logged out".to_owned())
                .await;
        }

        self.clear_persisted().await
    }

    /// Rehydrates a persisted session for the connected identity.
    ///
    /// Records bound to another identity, or whose principal can no longer
    /// be resolved, are discarded.
    pub async fn resume(&self, identity: &ConnectedIdentity) -> Option<SessionOutcome> {
        let record = match self.store.load(self.config.storage_key.as_str()).await {
            Ok(record) => record?,
            Err(error) => {
                warn!(error = %error, "failed to load persisted admin session");
                return None;
            }
        };

        if record.bound_identity != identity.value() {
            self.clear_persisted().await;
            return None;
        }

        let principal = match self.config.mode {
            AuthMode::Production => self
                .identity_adapter
                .resolve(identity)
                .await
                .filter(LogicalPrincipal::is_active),
            AuthMode::Demo => demo_principal(identity, record.role.clone()).ok(),
        };
        let Some(principal) = principal else {
            self.clear_persisted().await;
            return None;
        };

        let session = Session {
            principal_id: principal.primary().id().to_owned(),
            bound_identity: record.bound_identity,
            role: principal.role().clone(),
            permissions: self
                .authorization_service
                .effective_permissions(Some(&principal))
                .await,
            created_at: record.created_at,
            last_active_at: Utc::now().max(record.last_active_at),
        };

        let persistence_warning = self.persist(&session).await;
        Some(SessionOutcome {
            session,
            principal,
            persistence_warning,
        })
    }

    async fn authenticate(&self, request: &LoginRequest) -> AppResult<LogicalPrincipal> {
        let secret = request
            .credentials
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Authentication("credentials are required".to_owned()))?;

        if !self
            .credential_verifier
            .verify(request.identity.value(), secret)
            .await?
        {
            return Err(AppError::Authentication("invalid credentials".to_owned()));
        }

        let principal = self
            .identity_adapter
            .resolve(&request.identity)
            .await
            .filter(LogicalPrincipal::is_active)
            .ok_or_else(|| {
                AppError::Authentication(format!(
                    "identity '{}' is not an active admin principal",
                    request.identity.value()
                ))
            })?;

        if let Some(requested) = request.requested_role.as_deref() {
            if requested != principal.role().as_str() {
                return Err(AppError::Authentication(format!(
                    "identity '{}' does not hold role '{requested}'",
                    request.identity.value()
                )));
            }
        }

        Ok(principal)
    }

    async fn assume_role(&self, request: &LoginRequest) -> AppResult<LogicalPrincipal> {
        let Some(requested) = request.requested_role.as_deref() else {
            return self
                .identity_adapter
                .resolve(&request.identity)
                .await
                .ok_or_else(|| {
                    AppError::Authentication("demo login requires a role to assume".to_owned())
                });
        };

        let role_id = RoleId::parse(requested)
            .map_err(|error| AppError::Authentication(error.to_string()))?;
        if self.role_repository.find_role(&role_id).await?.is_none() {
            return Err(AppError::Authentication(format!(
                "role '{role_id}' does not exist"
            )));
        }

        warn!(
            identity = request.identity.value(),
            role = %role_id,
            "demo login assumed role without credential verification"
        );
        demo_principal(&request.identity, role_id)
    }

    async fn persist(&self, session: &Session) -> Option<String> {
        match self
            .store
            .save(self.config.storage_key.as_str(), &session.to_record())
            .await
        {
            Ok(()) => None,
            Err(error) => {
                warn!(error = %error, "failed to persist admin session, continuing in memory");
                Some(format!("session was not persisted: {error}"))
            }
        }
    }

    async fn clear_persisted(&self) -> Option<String> {
        match self.store.clear(self.config.storage_key.as_str()).await {
            Ok(()) => None,
            Err(error) => {
                warn!(error = %error, "failed to clear persisted admin session");
                Some(format!("session record was not cleared: {error}"))
            }
        }
    }

    async fn record(&self, action: AuditAction, session: &Session, detail: String) {
        let result = self
            .audit_repository
            .append_event(AuditEvent {
                actor: session.principal_id.clone(),
                action,
                resource_type: "admin_session".to_owned(),
                resource_id: session.bound_identity.clone(),
                detail: Some(detail),
                recorded_at: Utc::now(),
            })
            .await;

        if let Err(error) = result {
            warn!(action = action.as_str(), error = %error, "failed to append session audit event");
        }
    }
}

fn demo_principal(identity: &ConnectedIdentity, role: RoleId) -> AppResult<LogicalPrincipal> {
    let principal = Principal::new(
        format!("demo:{}", identity.value()),
        identity.source(),
        identity.value(),
        role,
        Utc::now(),
    )?;

    Ok(LogicalPrincipal::single(principal))
}
