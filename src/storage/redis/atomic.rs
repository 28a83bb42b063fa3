//! Redis atomic operations

use super::pool::RedisPool;
use crate::utils::error::{AuthzError, Result};

/// INCR, and EXPIRE only when the INCR created the key
const INCREMENT_WITH_TTL: &str = r"
local current = redis.call('INCR', KEYS[1])
if current == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return current
";

impl RedisPool {
    /// Increment a counter, starting its window on first increment
    pub async fn increment_with_ttl(&self, key: &str, ttl_seconds: u64) -> Result<u64> {
        let mut conn = self.get_connection();
        let value: i64 = redis::Script::new(INCREMENT_WITH_TTL)
            .key(key)
            .arg(ttl_seconds.max(1))
            .invoke_async(&mut conn.conn)
            .await
            .map_err(AuthzError::Redis)?;

        u64::try_from(value)
            .map_err(|_| AuthzError::cache(format!("Counter '{}' went negative", key)))
    }
}
