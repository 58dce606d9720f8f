use async_trait::async_trait;
use roleward_core::{AppResult, IdentitySource};
use roleward_domain::{Role, RoleId};

/// Input payload for creating custom roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Display name; the role id is derived from it.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Transport permission ids to grant.
    pub permissions: Vec<String>,
}

/// Input payload for moving a principal to another role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignRoleInput {
    /// Identity source holding the principal record.
    pub identity_source: IdentitySource,
    /// Principal record id.
    pub principal_id: String,
    /// Target role id.
    pub role_id: String,
}

/// Repository port for the role registry.
///
/// Writes must be visible to the next read from the same caller.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists all roles ordered by id.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Finds one role.
    async fn find_role(&self, role_id: &RoleId) -> AppResult<Option<Role>>;

    /// Inserts a new role, failing with a duplicate error on id collision.
    async fn insert_role(&self, role: Role) -> AppResult<Role>;

    /// Replaces an existing role definition in one step.
    async fn replace_role(&self, role: Role) -> AppResult<Role>;

    /// Deletes a role.
    ///
    /// System roles and roles still held by principals are refused even when
    /// the caller skipped its own checks.
    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()>;

    /// Moves the assignment counter of a role by `delta`.
    async fn adjust_assigned_count(&self, role_id: &RoleId, delta: i64) -> AppResult<()>;

    /// Overwrites the assignment counter of a role. Unknown ids are ignored.
    async fn set_assigned_count(&self, role_id: &RoleId, assigned_count: u32) -> AppResult<()>;
}
