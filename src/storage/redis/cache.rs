//! Basic Redis cache operations

use super::pool::RedisPool;
use crate::utils::error::{AuthzError, Result};
use redis::AsyncCommands;

impl RedisPool {
    /// Get a value from cache
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection();
        let value: Option<String> = conn.conn.get(key).await.map_err(AuthzError::Redis)?;
        Ok(value)
    }

    /// Set a key-value pair with a TTL in seconds
    pub async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut conn = self.get_connection();
        let _: () = conn
            .conn
            .set_ex(key, value, ttl_seconds.max(1))
            .await
            .map_err(AuthzError::Redis)?;
        Ok(())
    }

    /// Delete keys
    pub async fn delete_many(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.get_connection();
        let _: () = conn.conn.del(keys).await.map_err(AuthzError::Redis)?;
        Ok(())
    }
}
