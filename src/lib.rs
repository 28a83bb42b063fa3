//! # forum-authz
//!
//! Role-based authorization and permission resolution for forum backends.
//!
//! ## Features
//!
//! - **Role inheritance**: single-parent role hierarchies, cycle-safe traversal
//! - **Permission merging**: priority-based resolution across every role a user holds
//! - **Conditions**: ownership, category, post count, account age, time window and upload limits
//! - **Rate limits**: fixed-window counters on the cache backend
//! - **Caching**: read-through per-user role and permission sets, in memory or in Redis
//! - **Guards**: actix-web guards and middleware with 401/403 categorization
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forum_authz::{AuthorizationService, Config, PermissionContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/authz.yaml").await?;
//!     let authz = AuthorizationService::from_config(&config).await?;
//!
//!     let ctx = PermissionContext::new().with_owner(42);
//!     if authz.has_permission(42, "topic.edit", &ctx).await? {
//!         println!("user 42 may edit the topic");
//!     }
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use auth::rbac::{
    AuthorizationService, CategoryAction, CategoryFlags, Condition, ConditionSet, Grant,
    NewPermission, NewRole, Permission, PermissionCheck, PermissionContext, PermissionGrant,
    ResolvedPermissionSet, Role,
};
pub use config::Config;
pub use crate::core::cache_manager::{MemoryCacheStore, PermissionCache};
pub use crate::core::traits::CacheStore;
pub use storage::{MemoryRoleStore, RoleStore};
pub use utils::error::{AuthzError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
