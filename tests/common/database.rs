//! Test database utilities
//!
//! Provides in-memory SQLite databases for testing without external dependencies.
//! Each test gets an isolated, migrated database instance.

use forum_authz::config::{AuthzConfig, DatabaseConfig};
use forum_authz::storage::database::Database;
use forum_authz::{AuthorizationService, MemoryCacheStore, PermissionCache};
use std::sync::Arc;
use std::time::Duration;

/// Test database wrapper providing isolated in-memory SQLite instances
#[derive(Debug, Clone)]
pub struct TestDatabase {
    inner: Arc<Database>,
}

impl TestDatabase {
    /// Create a new migrated in-memory database
    pub async fn new() -> Self {
        let db = Database::new(&test_db_config())
            .await
            .expect("Failed to create in-memory test database");

        db.migrate()
            .await
            .expect("Failed to run database migrations");

        Self {
            inner: Arc::new(db),
        }
    }

    /// Get reference to the underlying database
    pub fn db(&self) -> &Database {
        &self.inner
    }

    /// Get Arc to the underlying database
    pub fn db_arc(&self) -> Arc<Database> {
        Arc::clone(&self.inner)
    }

    /// Authorization service over this database with a memory cache
    pub fn service(&self) -> AuthorizationService {
        self.service_with(PermissionCache::new(
            Arc::new(MemoryCacheStore::new(1_000)),
            Duration::from_secs(300),
        ))
    }

    /// Authorization service over this database with the given cache
    pub fn service_with(&self, cache: PermissionCache) -> AuthorizationService {
        AuthorizationService::new(self.db_arc(), cache, AuthzConfig::default())
    }
}

/// In-memory database config; SQLite memory databases allow one connection
pub fn test_db_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        connection_timeout: 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_creation() {
        let db = TestDatabase::new().await;
        assert!(db.db().health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_databases_are_isolated() {
        let first = TestDatabase::new().await;
        let second = TestDatabase::new().await;

        first
            .service()
            .create_role(forum_authz::NewRole::new("member", "Member", 1))
            .await
            .unwrap();

        assert_eq!(first.service().list_roles().await.unwrap().len(), 1);
        assert!(second.service().list_roles().await.unwrap().is_empty());
    }
}
