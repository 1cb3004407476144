//! Refresh-token storage backed by the key-value cache.
//!
//! Provides a [`SessionStore`] trait with a Redis implementation
//! ([`RedisSessionStore`]). Entries expire through the cache's own TTL.

mod redis_cache;
mod service;

pub use redis_cache::RedisSessionStore;
pub use service::{CacheError, CacheResult, SessionStore};

#[cfg(test)]
pub use service::MockSessionStore;
