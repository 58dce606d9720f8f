use std::collections::BTreeMap;

use roleward_core::IdentitySource;
use roleward_domain::{Principal, ROLE_ASSIGNMENT_PERMISSION};

use crate::AssignRoleInput;

use super::*;

impl RoleRegistryService {
    /// Moves a principal record to another role and keeps both counters exact.
    ///
    /// Elevated roles can only be handed out by an actor holding at least the
    /// same elevation tier.
    pub async fn assign_role(
        &self,
        actor: &LogicalPrincipal,
        input: AssignRoleInput,
    ) -> AppResult<Principal> {
        self.authorization_service
            .require_permission(actor, ROLE_ASSIGNMENT_PERMISSION)
            .await?;

        let target_role_id = RoleId::parse(input.role_id.as_str())?;
        let target_role = self.find_existing(&target_role_id).await?;

        if let Some(required) = target_role.id().elevation_tier() {
            if actor.elevation_tier() < Some(required) {
                return Err(AppError::Authorization(format!(
                    "principal '{}' cannot grant elevated role '{}'",
                    actor.primary().id(),
                    target_role.id()
                )));
            }
        }

        let directory = self.identity_adapter.directory(input.identity_source);
        let principal = directory
            .find_by_id(input.principal_id.as_str())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "{} principal '{}' does not exist",
                    input.identity_source, input.principal_id
                ))
            })?;

        let previous_role_id = principal.role().clone();
        if previous_role_id == target_role_id {
            return Ok(principal);
        }

        let updated = principal.with_role(target_role_id.clone());
        directory.save_principal(updated.clone()).await?;
        self.repository
            .adjust_assigned_count(&previous_role_id, -1)
            .await?;
        self.repository
            .adjust_assigned_count(&target_role_id, 1)
            .await?;

        info!(
            principal_id = updated.id(),
            source = %updated.identity_source(),
            from_role = %previous_role_id,
            to_role = %target_role_id,
            "assigned role"
        );
        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.primary().id().to_owned(),
                action: AuditAction::RoleAssigned,
                resource_type: "principal_role".to_owned(),
                resource_id: format!("{}:{}", updated.identity_source(), updated.id()),
                detail: Some(format!(
                    "moved '{}' from '{previous_role_id}' to '{target_role_id}'",
                    updated.id()
                )),
                recorded_at: Utc::now(),
            })
            .await?;

        Ok(updated)
    }

    /// Recomputes every role counter from the principal directories.
    ///
    /// Roles nobody holds are reset to zero. Principals pointing at unknown
    /// role ids are skipped.
    pub async fn sync_assignment_counts(&self) -> AppResult<()> {
        let mut held: BTreeMap<RoleId, u32> = BTreeMap::new();
        for source in [IdentitySource::Legacy, IdentitySource::Unified] {
            let directory = self.identity_adapter.directory(source);
            for principal in directory.list_principals().await? {
                *held.entry(principal.role().clone()).or_default() += 1;
            }
        }

        for role in self.repository.list_roles().await? {
            let assigned_count = held.get(role.id()).copied().unwrap_or_default();
            if assigned_count != role.assigned_count() {
                self.repository
                    .set_assigned_count(role.id(), assigned_count)
                    .await?;
            }
        }

        info!(held_roles = held.len(), "synchronized role assignment counts");
        Ok(())
    }
}
