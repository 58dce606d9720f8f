use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roleward_core::AppResult;
use roleward_domain::RoleId;
use serde::{Deserialize, Serialize};

/// Session record written to the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    /// Principal record id.
    pub principal_id: String,
    /// Wallet address or account id the session is bound to.
    pub bound_identity: String,
    /// Role held when the session was written.
    pub role: RoleId,
    /// Session creation time.
    pub created_at: DateTime<Utc>,
    /// Last activity time.
    pub last_active_at: DateTime<Utc>,
}

/// Port for persisting the current session under a stable key.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Writes the record, replacing any previous value.
    async fn save(&self, key: &str, record: &PersistedSession) -> AppResult<()>;

    /// Reads the record, if present.
    async fn load(&self, key: &str) -> AppResult<Option<PersistedSession>>;

    /// Removes the record. Removing a missing key succeeds.
    async fn clear(&self, key: &str) -> AppResult<()>;
}
