//! Configuration data models
//!
//! This module defines all configuration structures used by the engine.

#![allow(missing_docs)]

pub mod authz;
pub mod cache;
pub mod logging;
pub mod storage;

pub use authz::*;
pub use cache::*;
pub use logging::*;
pub use storage::*;

/// Default TTL of cached role and permission sets, in seconds
pub fn default_cache_ttl() -> u64 {
    300
}

pub fn default_cache_max_entries() -> usize {
    10_000
}

pub fn default_admin_role() -> String {
    "admin".to_string()
}

pub fn default_moderator_role() -> String {
    "moderator".to_string()
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_connection_timeout() -> u64 {
    5
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}
