//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_credential_verifier;
mod in_memory_audit_repository;
mod in_memory_principal_directory;
mod in_memory_role_repository;
mod in_memory_session_store;
mod postgres_audit_repository;
mod postgres_role_repository;
mod redis_session_store;

pub use argon2_credential_verifier::Argon2CredentialVerifier;
pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_principal_directory::{InMemoryPrincipalDirectory, PrincipalSeed};
pub use in_memory_role_repository::InMemoryRoleRepository;
pub use in_memory_session_store::InMemorySessionStore;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use redis_session_store::RedisSessionStore;

/// Embedded migrations for the PostgreSQL adapters.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
