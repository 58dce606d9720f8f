use std::collections::BTreeSet;

use roleward_core::AppError;
use roleward_domain::{LogicalPrincipal, Permission, PermissionResolver};

use super::*;

impl AuthorizationService {
    /// Returns whether the principal holds a permission given by transport id.
    ///
    /// Never fails: unknown ids, missing principals and registry outages all
    /// resolve to `false`.
    pub async fn check_permission(
        &self,
        principal: Option<&LogicalPrincipal>,
        permission_id: &str,
    ) -> bool {
        let roles = self.role_table_for_check().await;
        PermissionResolver::new(&roles).check_id(principal, permission_id)
    }

    /// Returns whether the principal holds the permission.
    pub async fn has_permission(
        &self,
        principal: Option<&LogicalPrincipal>,
        permission: Permission,
    ) -> bool {
        let roles = self.role_table_for_check().await;
        PermissionResolver::new(&roles).check(principal, permission)
    }

    /// Ensures an acting principal holds the permission before a mutation.
    pub async fn require_permission(
        &self,
        actor: &LogicalPrincipal,
        permission: Permission,
    ) -> AppResult<()> {
        let roles = self.role_table().await?;
        if PermissionResolver::new(&roles).check(Some(actor), permission) {
            return Ok(());
        }

        Err(AppError::Authorization(format!(
            "principal '{}' is missing permission '{}'",
            actor.primary().id(),
            permission.as_str()
        )))
    }

    /// Materializes every permission the principal holds right now.
    pub async fn effective_permissions(
        &self,
        principal: Option<&LogicalPrincipal>,
    ) -> BTreeSet<Permission> {
        let roles = self.role_table_for_check().await;
        PermissionResolver::new(&roles).effective_permissions(principal)
    }
}
