mod sessions;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use roleward_application::{
    AuditRepository, AuthMode, AuthorizationService, CredentialVerifier, IdentityAdapter,
    OverviewService, PrincipalDirectory, RoleRegistryService, RoleRepository, SessionService,
    SessionStore,
};
use roleward_core::{AppError, AppResult, IdentitySource};
use roleward_infrastructure::{
    Argon2CredentialVerifier, InMemoryAuditRepository, InMemoryRoleRepository,
    InMemorySessionStore, MIGRATOR, PostgresAuditRepository, PostgresRoleRepository,
    PrincipalSeed, RedisSessionStore,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, RoleStoreConfig, SessionStoreConfig};
use crate::consoles::AdminConsoles;
use crate::state::AppState;

pub use sessions::{build_memory_session_layer, build_postgres_session_layer};

const REDIS_SESSION_KEY_PREFIX: &str = "sessions";

pub async fn connect_postgres(database_url: &str) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    MIGRATOR
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    Ok(pool)
}

pub async fn build_app_state(config: &ApiConfig, postgres_pool: Option<PgPool>) -> AppResult<AppState> {
    let (role_repository, audit_repository): (Arc<dyn RoleRepository>, Arc<dyn AuditRepository>) =
        match postgres_pool.clone() {
            Some(pool) => {
                let roles = PostgresRoleRepository::new(pool.clone());
                roles.seed_system_roles().await?;
                (Arc::new(roles), Arc::new(PostgresAuditRepository::new(pool)))
            }
            None => (
                Arc::new(InMemoryRoleRepository::new()),
                Arc::new(InMemoryAuditRepository::new()),
            ),
        };

    let seed = match config.seed_principals_file.as_deref() {
        Some(path) => PrincipalSeed::from_json(read_document(path)?.as_str())?,
        None => PrincipalSeed::default(),
    };
    let legacy: Arc<dyn PrincipalDirectory> = Arc::new(seed.directory(IdentitySource::Legacy)?);
    let unified: Arc<dyn PrincipalDirectory> = Arc::new(seed.directory(IdentitySource::Unified)?);

    let credential_verifier: Arc<dyn CredentialVerifier> =
        match config.admin_credentials_file.as_deref() {
            Some(path) => Arc::new(Argon2CredentialVerifier::from_json(
                read_document(path)?.as_str(),
            )?),
            None => {
                if config.auth_mode() == AuthMode::Production {
                    warn!("ADMIN_CREDENTIALS_FILE is not set, production login will always fail");
                }
                Arc::new(Argon2CredentialVerifier::new(HashMap::new()))
            }
        };

    let (session_store, redis_client): (Arc<dyn SessionStore>, Option<redis::Client>) =
        match &config.session_store {
            SessionStoreConfig::Memory => (Arc::new(InMemorySessionStore::new()), None),
            SessionStoreConfig::Redis {
                redis_url,
                ttl_seconds,
            } => {
                let client = redis::Client::open(redis_url.as_str()).map_err(|error| {
                    AppError::Validation(format!("invalid REDIS_URL: {error}"))
                })?;
                let store = RedisSessionStore::new(client.clone(), REDIS_SESSION_KEY_PREFIX)
                    .with_ttl_seconds(*ttl_seconds);
                (Arc::new(store), Some(client))
            }
        };

    let authorization_service = AuthorizationService::new(role_repository.clone());
    let identity_adapter = IdentityAdapter::new(legacy, unified);
    let role_registry_service = RoleRegistryService::new(
        authorization_service.clone(),
        role_repository.clone(),
        identity_adapter.clone(),
        audit_repository.clone(),
    );
    role_registry_service.sync_assignment_counts().await?;

    let consoles = AdminConsoles::new(
        authorization_service.clone(),
        role_registry_service,
        SessionService::new(
            config.session_config(),
            authorization_service.clone(),
            identity_adapter.clone(),
            role_repository.clone(),
            credential_verifier,
            session_store,
            audit_repository,
        ),
        OverviewService::new(authorization_service, role_repository, identity_adapter),
    );

    info!(
        mode = ?consoles.mode(),
        environment = %config.environment,
        role_store = role_store_label(&config.role_store),
        "admin consoles initialised"
    );

    Ok(AppState {
        consoles: Arc::new(consoles),
        frontend_url: config.frontend_url.clone(),
        postgres_pool,
        redis_client,
    })
}

fn read_document(path: &Path) -> AppResult<String> {
    std::fs::read_to_string(path).map_err(|error| {
        AppError::Validation(format!("failed to read '{}': {error}", path.display()))
    })
}

fn role_store_label(role_store: &RoleStoreConfig) -> &'static str {
    match role_store {
        RoleStoreConfig::Memory => "memory",
        RoleStoreConfig::Postgres { .. } => "postgres",
    }
}
