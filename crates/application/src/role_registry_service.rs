use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use roleward_core::{AppError, AppResult, NonEmptyString};
use roleward_domain::{
    AuditAction, ELEVATED_AUTHORIZATION_PERMISSION, LogicalPrincipal, Permission,
    ROLE_MANAGEMENT_PERMISSION, Role, RoleId,
};
use tracing::info;

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, CreateRoleInput, IdentityAdapter,
    RoleRepository,
};

mod assignments;


/// Application service for the role registry and role editor.
#[derive(Clone)]
pub struct RoleRegistryService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn RoleRepository>,
    identity_adapter: IdentityAdapter,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleRegistryService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn RoleRepository>,
        identity_adapter: IdentityAdapter,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            identity_adapter,
            audit_repository,
        }
    }

    /// Lists every role in the registry.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.repository.list_roles().await
    }

    /// Returns one role.
    pub async fn get_role(&self, role_id: &str) -> AppResult<Role> {
        let role_id = RoleId::parse(role_id)?;
        self.find_existing(&role_id).await
    }

    /// Creates a custom role and emits an audit event.
    pub async fn create_role(
        &self,
        actor: &LogicalPrincipal,
        input: CreateRoleInput,
    ) -> AppResult<Role> {
        self.authorization_service
            .require_permission(actor, ROLE_MANAGEMENT_PERMISSION)
            .await?;

        let permissions = parse_permission_set(&input.permissions)?;
        let role = Role::custom(NonEmptyString::new(input.name)?, input.description, permissions)?;
        let role = self.repository.insert_role(role).await?;

        info!(role_id = %role.id(), actor = actor.primary().id(), "created role");
        self.append_audit(
            actor,
            AuditAction::RoleCreated,
            &role,
            format!("created role '{}'", role.name()),
        )
        .await?;

        Ok(role)
    }

    /// Replaces a role's permission set.
    ///
    /// System roles require the elevated-authorization permission, custom roles
    /// the role-management permission. The stored set is exactly the new set.
    pub async fn update_role_permissions(
        &self,
        role_id: &str,
        permissions: &[String],
        actor: &LogicalPrincipal,
    ) -> AppResult<Role> {
        let role_id = RoleId::parse(role_id)?;
        let role = self.find_existing(&role_id).await?;

        let required = if role.is_system() {
            ELEVATED_AUTHORIZATION_PERMISSION
        } else {
            ROLE_MANAGEMENT_PERMISSION
        };
        self.authorization_service
            .require_permission(actor, required)
            .await?;

        let permissions = parse_permission_set(permissions)?;
        let updated = self
            .repository
            .replace_role(role.with_permissions(permissions)?)
            .await?;

        info!(
            role_id = %updated.id(),
            actor = actor.primary().id(),
            permission_count = updated.permissions().len(),
            "replaced role permissions"
        );
        self.append_audit(
            actor,
            AuditAction::RolePermissionsUpdated,
            &updated,
            format!(
                "set permissions of '{}' to [{}]",
                updated.id(),
                join_permissions(updated.permissions())
            ),
        )
        .await?;

        Ok(updated)
    }

    /// Updates a role's description. Ids and names stay immutable.
    pub async fn update_role_details(
        &self,
        role_id: &str,
        description: &str,
        actor: &LogicalPrincipal,
    ) -> AppResult<Role> {
        let role_id = RoleId::parse(role_id)?;
        let role = self.find_existing(&role_id).await?;

        let required = if role.is_system() {
            ELEVATED_AUTHORIZATION_PERMISSION
        } else {
            ROLE_MANAGEMENT_PERMISSION
        };
        self.authorization_service
            .require_permission(actor, required)
            .await?;

        let updated = self
            .repository
            .replace_role(role.with_description(description))
            .await?;

        self.append_audit(
            actor,
            AuditAction::RoleDetailsUpdated,
            &updated,
            format!("updated description of '{}'", updated.id()),
        )
        .await?;

        Ok(updated)
    }

    /// Deletes a custom role that nobody holds.
    pub async fn delete_role(&self, role_id: &str, actor: &LogicalPrincipal) -> AppResult<()> {
        let role_id = RoleId::parse(role_id)?;
        let role = self.find_existing(&role_id).await?;

        if role.is_system() {
            return Err(AppError::ProtectedRole(format!(
                "system role '{role_id}' cannot be deleted"
            )));
        }

        self.authorization_service
            .require_permission(actor, ROLE_MANAGEMENT_PERMISSION)
            .await?;

        role.ensure_deletable()?;

        self.repository.delete_role(&role_id).await?;

        info!(role_id = %role_id, actor = actor.primary().id(), "deleted role");
        self.append_audit(
            actor,
            AuditAction::RoleDeleted,
            &role,
            format!("deleted role '{}'", role.name()),
        )
        .await
    }

    async fn find_existing(&self, role_id: &RoleId) -> AppResult<Role> {
        self.repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    async fn append_audit(
        &self,
        actor: &LogicalPrincipal,
        action: AuditAction,
        role: &Role,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.primary().id().to_owned(),
                action,
                resource_type: "role".to_owned(),
                resource_id: role.id().to_string(),
                detail: Some(detail),
                recorded_at: Utc::now(),
            })
            .await
    }
}

/// Parses transport permission ids, rejecting ids outside the catalog.
pub fn parse_permission_set(values: &[String]) -> AppResult<BTreeSet<Permission>> {
    values
        .iter()
        .map(|value| Permission::from_str(value.trim()))
        .collect()
}

fn join_permissions(permissions: &BTreeSet<Permission>) -> String {
    permissions
        .iter()
        .map(Permission::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
