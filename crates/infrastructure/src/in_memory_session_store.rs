use std::collections::HashMap;

use async_trait::async_trait;
use roleward_application::{PersistedSession, SessionStore};
use roleward_core::AppResult;
use tokio::sync::RwLock;

/// Process-local session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    records: RwLock<HashMap<String, PersistedSession>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, key: &str, record: &PersistedSession) -> AppResult<()> {
        self.records
            .write()
            .await
            .insert(key.to_owned(), record.clone());
        Ok(())
    }

    async fn load(&self, key: &str) -> AppResult<Option<PersistedSession>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn clear(&self, key: &str) -> AppResult<()> {
        self.records.write().await.remove(key);
        Ok(())
    }
}
