//! Redis-backed admin session store.

use async_trait::async_trait;
use redis::AsyncCommands;
use roleward_application::{PersistedSession, SessionStore};
use roleward_core::{AppError, AppResult};

/// Redis implementation of the session store port.
///
/// Records are stored as JSON strings under `{key_prefix}:{key}`.
#[derive(Debug, Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    key_prefix: String,
    ttl_seconds: Option<u64>,
}

impl RedisSessionStore {
    /// Creates a store with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
            ttl_seconds: None,
        }
    }

    /// Expires idle records after the given number of seconds.
    #[must_use]
    pub fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = (ttl_seconds > 0).then_some(ttl_seconds);
        self
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}:{key}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, key: &str, record: &PersistedSession) -> AppResult<()> {
        let encoded_record = serde_json::to_string(record).map_err(|error| {
            AppError::Internal(format!("failed to encode session record: {error}"))
        })?;
        let key = self.key_for(key);
        let mut connection = self.connection().await?;

        let result = match self.ttl_seconds {
            Some(ttl_seconds) => {
                connection
                    .set_ex::<_, _, ()>(key, encoded_record, ttl_seconds)
                    .await
            }
            None => connection.set::<_, _, ()>(key, encoded_record).await,
        };

        result.map_err(|error| AppError::Internal(format!("failed to save session record: {error}")))
    }

    async fn load(&self, key: &str) -> AppResult<Option<PersistedSession>> {
        let key = self.key_for(key);
        let mut connection = self.connection().await?;

        let encoded_record: Option<String> = connection
            .get(key)
            .await
            .map_err(|error| AppError::Internal(format!("failed to load session record: {error}")))?;

        encoded_record
            .as_deref()
            .map(|value| {
                serde_json::from_str::<PersistedSession>(value).map_err(|error| {
                    AppError::Internal(format!("failed to decode session record: {error}"))
                })
            })
            .transpose()
    }

    async fn clear(&self, key: &str) -> AppResult<()> {
        let key = self.key_for(key);
        let mut connection = self.connection().await?;

        connection
            .del::<_, i64>(key)
            .await
            .map_err(|error| AppError::Internal(format!("failed to clear session record: {error}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use roleward_application::{PersistedSession, SessionStore};
    use roleward_core::AppResult;
    use roleward_domain::RoleId;

    use super::RedisSessionStore;

    fn test_store() -> Option<RedisSessionStore> {
        let redis_url = std::env::var("REDIS_URL").ok()?;
        let client = match redis::Client::open(redis_url) {
            Ok(client) => client,
            Err(error) => panic!("invalid REDIS_URL in test: {error}"),
        };
        Some(RedisSessionStore::new(client, format!("roleward-test-{}", Utc::now().timestamp_micros())))
    }

    #[test]
    fn keys_are_prefixed() -> AppResult<()> {
        let client = redis::Client::open("redis://127.0.0.1/")
            .map_err(|error| roleward_core::AppError::Internal(error.to_string()))?;
        let store = RedisSessionStore::new(client, "roleward");
        assert_eq!(store.key_for("admin_session"), "roleward:admin_session");
        Ok(())
    }

    #[tokio::test]
    async fn save_load_and_clear() -> AppResult<()> {
        let Some(store) = test_store() else {
            return Ok(());
        };

        let now = Utc::now();
        let record = PersistedSession {
            principal_id: "legacy-1".to_owned(),
            bound_identity: "wallet1admin".to_owned(),
            role: RoleId::parse("platform_admin")?,
            created_at: now,
            last_active_at: now,
        };

        store.save("session", &record).await?;
        assert_eq!(store.load("session").await?, Some(record));
        store.clear("session").await?;
        assert_eq!(store.load("session").await?, None);
        Ok(())
    }
}
