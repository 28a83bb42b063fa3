//! Redis storage implementation
//!
//! Redis-backed cache of role and permission sets and rate-limit counters.
//!
//! ## Module Structure
//!
//! - `pool` - Connection management and health checks
//! - `cache` - Basic cache operations (get, set, delete)
//! - `atomic` - Atomic counter operations
//! - `store` - [`CacheStore`](crate::core::traits::CacheStore) implementation

// Module declarations
mod pool;
mod cache;
mod atomic;
mod store;

// Re-export public types
pub use pool::{RedisConnection, RedisPool};
