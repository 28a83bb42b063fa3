//! Authorization system
//!
//! Role resolution, permission checks and their administration.

pub mod rbac;

pub use rbac::{AuthorizationService, PermissionCheck, PermissionContext};
