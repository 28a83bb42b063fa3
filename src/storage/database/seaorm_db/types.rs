use crate::utils::error::{AuthzError, Result};
use sea_orm::DatabaseConnection;

/// SeaORM-based database implementation
#[derive(Debug, Clone)]
pub struct SeaOrmDatabase {
    pub(super) db: DatabaseConnection,
    /// Backend type indicator
    pub(super) backend_type: DatabaseBackendType,
}

/// Database backend type indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackendType {
    PostgreSQL,
    SQLite,
}

impl DatabaseBackendType {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("sqlite") {
            Self::SQLite
        } else {
            Self::PostgreSQL
        }
    }
}

/// Row counts of the RBAC tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    pub roles: u64,
    pub permissions: u64,
    pub grants: u64,
    pub assignments: u64,
}

/// Role and permission ids are stored as 32-bit serials
pub(super) fn db_id(id: i64, what: &str) -> Result<i32> {
    i32::try_from(id).map_err(|_| AuthzError::not_found(format!("{} {} not found", what, id)))
}

/// Ids that cannot exist in the table are dropped from lookups
pub(super) fn db_ids(ids: &[i64]) -> Vec<i32> {
    ids.iter().filter_map(|id| i32::try_from(*id).ok()).collect()
}
