use std::collections::BTreeMap;

use async_trait::async_trait;
use roleward_application::RoleRepository;
use roleward_core::{AppError, AppResult};
use roleward_domain::{Role, RoleId, SystemRole};
use tokio::sync::RwLock;

/// In-memory role registry seeded with the system roles.
#[derive(Debug)]
pub struct InMemoryRoleRepository {
    roles: RwLock<BTreeMap<RoleId, Role>>,
}

impl InMemoryRoleRepository {
    /// Creates a registry holding every system role with its default grants.
    #[must_use]
    pub fn new() -> Self {
        Self {
            roles: RwLock::new(
                SystemRole::all()
                    .iter()
                    .map(|role| (role.id(), role.definition()))
                    .collect(),
            ),
        }
    }
}

impl Default for InMemoryRoleRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.roles.read().await.values().cloned().collect())
    }

    async fn find_role(&self, role_id: &RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.get(role_id).cloned())
    }

    async fn insert_role(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.write().await;

        if roles.contains_key(role.id()) {
            return Err(AppError::DuplicateRole(format!(
                "role '{}' already exists",
                role.id()
            )));
        }

        roles.insert(role.id().clone(), role.clone());
        Ok(role)
    }

    async fn replace_role(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.write().await;

        let Some(existing) = roles.get_mut(role.id()) else {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                role.id()
            )));
        };
        *existing = role.clone();

        Ok(role)
    }

    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()> {
        let mut roles = self.roles.write().await;

        let Some(role) = roles.get(role_id) else {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        };
        role.ensure_deletable()?;

        roles.remove(role_id);
        Ok(())
    }

    async fn adjust_assigned_count(&self, role_id: &RoleId, delta: i64) -> AppResult<()> {
        // Orphaned role ids held by principals have no counter to move.
        if let Some(role) = self.roles.write().await.get_mut(role_id) {
            *role = role.with_assignment_delta(delta);
        }

        Ok(())
    }

    async fn set_assigned_count(&self, role_id: &RoleId, assigned_count: u32) -> AppResult<()> {
        if let Some(role) = self.roles.write().await.get_mut(role_id) {
            *role = role.with_assigned_count(assigned_count);
        }

        Ok(())
    }
}
