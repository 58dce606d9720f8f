//! Application services and ports.

#![forbid(unsafe_code)]

mod admin_console;
mod audit_ports;
mod authorization_service;
mod identity_adapter;
mod identity_ports;
mod overview_service;
mod role_registry_ports;
mod role_registry_service;
mod session_ports;
mod session_service;

#[cfg(test)]
mod test_support;

pub use admin_console::AdminConsole;
pub use audit_ports::{AuditEvent, AuditRepository};
pub use authorization_service::AuthorizationService;
pub use identity_adapter::IdentityAdapter;
pub use identity_ports::{CredentialVerifier, PrincipalDirectory};
pub use overview_service::{AdminOverview, LoadWarning, OverviewService};
pub use role_registry_ports::{AssignRoleInput, CreateRoleInput, RoleRepository};
pub use role_registry_service::{RoleRegistryService, parse_permission_set};
pub use session_ports::{PersistedSession, SessionStore};
pub use session_service::{
    AuthMode, DEFAULT_SESSION_STORAGE_KEY, LoginRequest, Session, SessionConfig, SessionOutcome,
    SessionService,
};
