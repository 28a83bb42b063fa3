//! Cache port used by the permission cache and the rate limiter
//!
//! Values are opaque strings; callers own the encoding.

use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Key/value cache backend
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a live value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value for `ttl`
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Remove keys, missing keys are ignored
    async fn invalidate(&self, keys: &[String]) -> Result<()>;

    /// Atomically increment a counter and return the new value.
    /// The TTL is applied only when the increment creates the key.
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64>;

    /// Backend name for logs
    fn backend_name(&self) -> &'static str;
}
