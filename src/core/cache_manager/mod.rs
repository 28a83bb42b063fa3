//! Permission caching
//!
//! A read-through cache of per-user roles and resolved permissions on top of a
//! pluggable [`CacheStore`](crate::core::traits::CacheStore) backend, plus the
//! in-process backend.

pub mod manager;
pub mod memory;
pub mod types;

pub use manager::PermissionCache;
pub use memory::MemoryCacheStore;
pub use types::{CacheEntry, CacheStats, keys};
