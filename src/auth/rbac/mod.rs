//! Role-Based Access Control (RBAC) system
//!
//! Roles form a single-parent hierarchy; permissions are granted to roles,
//! optionally narrowed by a condition payload, and users hold roles through
//! assignments that may expire. [`AuthorizationService`] resolves and checks
//! them.

mod admin;
pub mod aggregator;
pub mod conditions;
pub mod context;
pub mod evaluator;
pub mod inheritance;
pub mod rate_limit;
mod service;
pub mod types;

pub use aggregator::{PermissionAggregator, Resolution, merge_grant};
pub use conditions::{
    Condition, ConditionSet, Grant, RateLimitRule, RatePeriod, TimeWindow, normalize_file_type,
};
pub use context::PermissionContext;
pub use evaluator::ConditionEvaluator;
pub use inheritance::{InheritanceResolver, descendants_of};
pub use rate_limit::{QuotaResult, RateLimitResult, RateLimiter, check_daily_quota};
pub use service::AuthorizationService;
pub use types::{
    AssignedRole, CategoryAction, CategoryFlags, CategoryId, CategoryPermission, NewPermission,
    NewRole, Permission, PermissionCheck, PermissionConflict, PermissionGrant, PermissionId,
    ResolvedPermission, ResolvedPermissionSet, Role, RoleId, RolePermissionRow,
    RolePermissionView, UserId, UserRole, UserRoleSet,
};
