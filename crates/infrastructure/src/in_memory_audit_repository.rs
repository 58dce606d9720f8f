use async_trait::async_trait;
use roleward_application::{AuditEvent, AuditRepository};
use roleward_core::AppResult;
use tokio::sync::RwLock;
use tracing::info;

/// Audit repository that keeps events in memory and mirrors them to the log.
#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryAuditRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded event, oldest first.
    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        info!(
            target: "roleward::audit",
            actor = %event.actor,
            action = event.action.as_str(),
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            detail = event.detail.as_deref().unwrap_or_default(),
            "audit event"
        );
        self.events.write().await.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use roleward_application::{AuditEvent, AuditRepository};
    use roleward_core::AppResult;
    use roleward_domain::AuditAction;

    use super::InMemoryAuditRepository;

    #[tokio::test]
    async fn keeps_events_in_append_order() -> AppResult<()> {
        let repository = InMemoryAuditRepository::new();
        for action in [AuditAction::RoleCreated, AuditAction::RoleDeleted] {
            repository
                .append_event(AuditEvent {
                    actor: "unified-1".to_owned(),
                    action,
                    resource_type: "role".to_owned(),
                    resource_id: "reviewers".to_owned(),
                    detail: None,
                    recorded_at: Utc::now(),
                })
                .await?;
        }

        let actions: Vec<_> = repository
            .events()
            .await
            .into_iter()
            .map(|event| event.action)
            .collect();
        assert_eq!(actions, vec![AuditAction::RoleCreated, AuditAction::RoleDeleted]);
        Ok(())
    }
}
