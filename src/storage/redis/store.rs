use super::pool::RedisPool;
use crate::core::traits::CacheStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
impl CacheStore for RedisPool {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        RedisPool::get(self, key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.set_ex(key, &value, ttl.as_secs()).await
    }

    async fn invalidate(&self, keys: &[String]) -> Result<()> {
        self.delete_many(keys).await
    }

    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64> {
        self.increment_with_ttl(key, ttl.as_secs()).await
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
