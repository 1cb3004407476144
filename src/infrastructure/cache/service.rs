//! Session store trait and error types.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Per-account refresh-token storage.
///
/// Exactly one value is kept per account: saving overwrites whatever was stored
/// before. Unlike a read-through cache, failures are reported to the caller,
/// since a missing or unreadable entry decides whether a session may continue.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisSessionStore`] - Redis-backed store with TTL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores `value` for `account_id`, replacing any previous value.
    ///
    /// The entry disappears after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::OperationError`] if the write fails.
    async fn save_refresh_token(
        &self,
        account_id: i64,
        value: &str,
        ttl: Duration,
    ) -> CacheResult<()>;

    /// Loads the value stored for `account_id`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` if an unexpired entry exists
    /// - `Ok(None)` if nothing is stored or the entry expired
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::OperationError`] if the read fails.
    async fn load_refresh_token(&self, account_id: i64) -> CacheResult<Option<String>>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
