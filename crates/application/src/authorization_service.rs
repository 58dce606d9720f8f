use std::sync::Arc;

use roleward_core::AppResult;
use roleward_domain::RoleTable;
use tracing::warn;

use crate::RoleRepository;

mod permissions;
mod surfaces;

#[cfg(test)]
mod tests;

/// Application service answering permission and surface questions.
///
/// Every call reads the role registry afresh, so role edits are visible to
/// the next check without any invalidation step.
#[derive(Clone)]
pub struct AuthorizationService {
    role_repository: Arc<dyn RoleRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a role repository.
    #[must_use]
    pub fn new(role_repository: Arc<dyn RoleRepository>) -> Self {
        Self { role_repository }
    }

    /// Reads a snapshot of the role registry.
    pub async fn role_table(&self) -> AppResult<RoleTable> {
        Ok(self
            .role_repository
            .list_roles()
            .await?
            .into_iter()
            .collect())
    }

    /// Reads a registry snapshot for boolean checks.
    ///
    /// A failed read yields an empty table: only elevated tiers and explicit
    /// overrides can grant anything until the registry is reachable again.
    async fn role_table_for_check(&self) -> RoleTable {
        match self.role_table().await {
            Ok(table) => table,
            Err(error) => {
                warn!(error = %error, "role registry unavailable during permission check");
                RoleTable::default()
            }
        }
    }
}
