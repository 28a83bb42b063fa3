//! Storage layer for the authorization engine
//!
//! The [`RoleStore`] port over roles, permissions and assignments, its
//! SeaORM and in-memory implementations, and the Redis cache backend.

/// Database storage module
pub mod database;
/// In-memory role store
pub mod memory;
/// Redis cache module
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::MemoryRoleStore;

use crate::auth::rbac::types::{
    AssignedRole, CategoryFlags, CategoryId, CategoryPermission, NewPermission, NewRole,
    Permission, PermissionId, Role, RoleId, RolePermissionRow, UserId, UserRole,
};
use crate::config::StorageConfig;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Persistent role, permission and assignment data.
///
/// Absence is never an error: lookups of unknown ids return `None` or an
/// empty list.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Roles of a user whose assignment is active at `now`
    async fn fetch_roles_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<AssignedRole>>;

    async fn fetch_role_by_id(&self, role_id: RoleId) -> Result<Option<Role>>;

    async fn fetch_role_by_slug(&self, slug: &str) -> Result<Option<Role>>;

    /// Every role-permission row of the given roles
    async fn fetch_role_permissions(&self, role_ids: &[RoleId]) -> Result<Vec<RolePermissionRow>>;

    async fn fetch_permissions_by_ids(
        &self,
        permission_ids: &[PermissionId],
    ) -> Result<Vec<Permission>>;

    async fn fetch_permission_by_slug(&self, slug: &str) -> Result<Option<Permission>>;

    /// Category flags of one role, `None` when the role has no row for the category
    async fn fetch_category_permissions(
        &self,
        role_id: RoleId,
        category_id: CategoryId,
    ) -> Result<Option<CategoryFlags>>;

    /// Every stored row for a category
    async fn fetch_category_matrix(&self, category_id: CategoryId)
    -> Result<Vec<CategoryPermission>>;

    async fn list_roles(&self) -> Result<Vec<Role>>;

    async fn list_permissions(&self) -> Result<Vec<Permission>>;

    /// Fails with `Conflict` when the slug is taken
    async fn insert_role(&self, role: NewRole) -> Result<Role>;

    /// Fails with `Conflict` when the slug is taken
    async fn insert_permission(&self, permission: NewPermission) -> Result<Permission>;

    /// Create or renew the assignment keyed by (user, role)
    async fn upsert_user_role(&self, assignment: UserRole) -> Result<()>;

    /// Returns whether an assignment was removed
    async fn delete_user_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool>;

    /// Replace every permission row of a role in one transaction
    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        rows: Vec<RolePermissionRow>,
    ) -> Result<()>;

    async fn update_role_parent(&self, role_id: RoleId, parent_id: Option<RoleId>) -> Result<()>;

    async fn upsert_category_permission(&self, row: CategoryPermission) -> Result<()>;

    /// Users holding any of the roles, expired assignments included
    async fn fetch_user_ids_for_roles(&self, role_ids: &[RoleId]) -> Result<Vec<UserId>>;
}

/// Backends opened from [`StorageConfig`]
#[derive(Clone)]
pub struct StorageLayer {
    /// Database connection pool
    pub database: Arc<database::Database>,
    /// Redis connection pool, when enabled and reachable
    #[cfg(feature = "redis")]
    pub redis: Option<Arc<redis::RedisPool>>,
}

impl StorageLayer {
    /// Create a new storage layer
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        info!("Initializing storage layer");

        debug!("Connecting to database");
        let database = Arc::new(database::Database::new(&config.database).await?);

        #[cfg(feature = "redis")]
        let redis = if config.redis.enabled {
            debug!("Connecting to Redis");
            match redis::RedisPool::new(&config.redis).await {
                Ok(pool) => Some(Arc::new(pool)),
                Err(e) => {
                    warn!("Redis connection failed, continuing without Redis: {}", e);
                    None
                }
            }
        } else {
            debug!("Redis disabled, skipping Redis connection");
            None
        };

        #[cfg(not(feature = "redis"))]
        {
            if config.redis.enabled {
                warn!("Redis is enabled in configuration but the `redis` feature is not compiled in");
            }
        }

        info!("Storage layer initialized successfully");

        Ok(Self {
            database,
            #[cfg(feature = "redis")]
            redis,
        })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        self.database.migrate().await
    }

    /// Health check for all storage backends
    pub async fn health_check(&self) -> StorageHealthStatus {
        let database = match self.database.health_check().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Database health check failed: {}", e);
                false
            }
        };
        let stats = if database {
            match self.database.stats().await {
                Ok(stats) => Some(stats),
                Err(e) => {
                    warn!("Failed to count RBAC rows: {}", e);
                    None
                }
            }
        } else {
            None
        };

        #[cfg(feature = "redis")]
        let redis = match &self.redis {
            Some(pool) => match pool.health_check().await {
                Ok(()) => Some(true),
                Err(e) => {
                    warn!("Redis health check failed: {}", e);
                    Some(false)
                }
            },
            None => None,
        };
        #[cfg(not(feature = "redis"))]
        let redis = None;

        StorageHealthStatus {
            database,
            redis,
            stats,
        }
    }
}

/// Storage health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageHealthStatus {
    pub database: bool,
    /// `None` when Redis is not in use
    pub redis: Option<bool>,
    /// Row counts, when the database answered
    pub stats: Option<database::DatabaseStats>,
}

impl StorageHealthStatus {
    /// Redis is optional and never makes the storage unhealthy
    pub fn is_healthy(&self) -> bool {
        self.database
    }
}
