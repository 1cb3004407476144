//! Redis-backed session store.

use super::service::{CacheError, CacheResult, SessionStore};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

/// Redis session store keyed by account id.
///
/// Uses `ConnectionManager` for automatic reconnection; the manager is cheap to
/// clone and every operation works on its own clone.
pub struct RedisSessionStore {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisSessionStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            key_prefix: "user:".to_string(),
        })
    }

    fn build_key(&self, account_id: i64) -> String {
        format!("{}{}", self.key_prefix, account_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save_refresh_token(
        &self,
        account_id: i64,
        value: &str,
        ttl: Duration,
    ) -> CacheResult<()> {
        let key = self.build_key(account_id);
        let mut conn = self.client.clone();

        conn.set_ex::<_, _, ()>(&key, value, ttl.as_secs().max(1))
            .await
            .map_err(|e| CacheError::OperationError(format!("SET {} failed: {}", key, e)))?;

        debug!(account_id, ttl_secs = ttl.as_secs(), "Stored refresh token");
        Ok(())
    }

    async fn load_refresh_token(&self, account_id: i64) -> CacheResult<Option<String>> {
        let key = self.build_key(account_id);
        let mut conn = self.client.clone();

        let value = conn
            .get::<_, Option<String>>(&key)
            .await
            .map_err(|e| CacheError::OperationError(format!("GET {} failed: {}", key, e)))?;

        debug!(account_id, hit = value.is_some(), "Loaded refresh token");
        Ok(value)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
