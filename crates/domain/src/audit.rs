use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a custom role is created.
    RoleCreated,
    /// Emitted when a role's permission set is replaced.
    RolePermissionsUpdated,
    /// Emitted when a role's description changes.
    RoleDetailsUpdated,
    /// Emitted when a custom role is deleted.
    RoleDeleted,
    /// Emitted when a principal moves to another role.
    RoleAssigned,
    /// Emitted when a session is established.
    SessionStarted,
    /// Emitted on explicit logout.
    SessionEnded,
    /// Emitted when a session no longer matches the connected identity.
    SessionInvalidated,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreated => "role.created",
            Self::RolePermissionsUpdated => "role.permissions_updated",
            Self::RoleDetailsUpdated => "role.details_updated",
            Self::RoleDeleted => "role.deleted",
            Self::RoleAssigned => "role.assigned",
            Self::SessionStarted => "session.started",
            Self::SessionEnded => "session.ended",
            Self::SessionInvalidated => "session.invalidated",
        }
    }
}
