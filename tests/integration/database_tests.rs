//! Database integration tests
//!
//! Store operations against a real in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::common::TestDatabase;
    use crate::common::database::test_db_config;
    use chrono::{Duration, Utc};
    use forum_authz::config::{RedisConfig, StorageConfig};
    use forum_authz::storage::StorageLayer;
    use forum_authz::storage::database::{Database, DatabaseBackendType};
    use forum_authz::{
        AuthzError, CategoryFlags, NewPermission, NewRole, RoleStore,
    };
    use forum_authz::auth::rbac::{CategoryPermission, RolePermissionRow, UserRole};

    fn assignment(user_id: i64, role_id: i64, expires_at: Option<chrono::DateTime<Utc>>) -> UserRole {
        UserRole {
            user_id,
            role_id,
            expires_at,
            assigned_by: None,
            assigned_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_database_health_check_after_migration() {
        let db = Database::new(&test_db_config()).await;
        assert!(db.is_ok(), "Failed to create database: {:?}", db.err());
        let db = db.unwrap();

        let migrate_result = db.migrate().await;
        assert!(migrate_result.is_ok(), "Migration failed: {:?}", migrate_result.err());

        let health = db.health_check().await;
        assert!(health.is_ok(), "Health check failed: {:?}", health.err());
        assert_eq!(db.backend_type(), DatabaseBackendType::SQLite);
    }

    #[tokio::test]
    async fn test_migration_is_idempotent() {
        let db = Database::connect("sqlite::memory:").await.expect("connect");
        db.migrate().await.expect("first migration");
        db.migrate().await.expect("second migration");
        assert_eq!(db.stats().await.unwrap(), Default::default());
        db.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_role_round_trip() {
        let test_db = TestDatabase::new().await;
        let db = test_db.db();

        let parent = db.insert_role(NewRole::new("member", "Member", 1)).await.unwrap();
        let mut new_child = NewRole::new("moderator", "Moderator", 50).with_parent(parent.id);
        new_child.color = Some("#00aa00".to_string());
        let child = db.insert_role(new_child).await.unwrap();

        let fetched = db.fetch_role_by_id(child.id).await.unwrap().unwrap();
        assert_eq!(fetched, child);
        assert_eq!(fetched.parent_id, Some(parent.id));
        assert_eq!(fetched.color.as_deref(), Some("#00aa00"));
        assert_eq!(db.fetch_role_by_slug("moderator").await.unwrap(), Some(child.clone()));

        assert!(db.fetch_role_by_id(9_999).await.unwrap().is_none());
        // Ids outside the stored range are simply absent
        assert!(db.fetch_role_by_id(i64::MAX).await.unwrap().is_none());

        let err = db.insert_role(NewRole::new("member", "Again", 2)).await.unwrap_err();
        assert!(matches!(err, AuthzError::Conflict(_)));

        db.update_role_parent(child.id, None).await.unwrap();
        assert_eq!(db.fetch_role_by_id(child.id).await.unwrap().unwrap().parent_id, None);
        assert_eq!(db.list_roles().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_permission_rows_are_replaced() {
        let test_db = TestDatabase::new().await;
        let db = test_db.db();

        let role = db.insert_role(NewRole::new("member", "Member", 1)).await.unwrap();
        let read = db.insert_permission(NewPermission::from_slug("topic.read")).await.unwrap();
        let edit = db.insert_permission(NewPermission::from_slug("topic.edit")).await.unwrap();
        assert_eq!(read.module, "topic");
        assert_eq!(read.action, "read");

        let err = db
            .insert_permission(NewPermission::from_slug("topic.read"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Conflict(_)));

        db.replace_role_permissions(role.id, vec![
            RolePermissionRow {
                role_id: role.id,
                permission_id: read.id,
                conditions: None,
            },
            RolePermissionRow {
                role_id: role.id,
                permission_id: edit.id,
                conditions: Some(r#"{"own":true}"#.to_string()),
            },
        ])
        .await
        .unwrap();

        let mut rows = db.fetch_role_permissions(&[role.id]).await.unwrap();
        rows.sort_by_key(|row| row.permission_id);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].conditions.as_deref(), Some(r#"{"own":true}"#));

        db.replace_role_permissions(role.id, vec![RolePermissionRow {
            role_id: role.id,
            permission_id: edit.id,
            conditions: None,
        }])
        .await
        .unwrap();

        let rows = db.fetch_role_permissions(&[role.id]).await.unwrap();
        assert_eq!(rows, vec![RolePermissionRow {
            role_id: role.id,
            permission_id: edit.id,
            conditions: None,
        }]);

        let permissions = db.fetch_permissions_by_ids(&[read.id, edit.id]).await.unwrap();
        assert_eq!(permissions.len(), 2);
        assert_eq!(db.fetch_permission_by_slug("topic.edit").await.unwrap(), Some(edit));
        assert!(db.fetch_role_permissions(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_assignments_respect_expiry() {
        let test_db = TestDatabase::new().await;
        let db = test_db.db();
        let now = Utc::now();

        let member = db.insert_role(NewRole::new("member", "Member", 1)).await.unwrap();
        let trial = db.insert_role(NewRole::new("trial", "Trial", 1)).await.unwrap();

        db.upsert_user_role(assignment(7, member.id, None)).await.unwrap();
        db.upsert_user_role(assignment(7, trial.id, Some(now - Duration::hours(1))))
            .await
            .unwrap();

        let active = db.fetch_roles_for_user(7, now).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].role.slug, "member");

        // Renewal updates the single (user, role) row
        let until = now + Duration::days(3);
        db.upsert_user_role(assignment(7, trial.id, Some(until))).await.unwrap();
        let active = db.fetch_roles_for_user(7, now).await.unwrap();
        assert_eq!(active.len(), 2);
        let renewed = active.iter().find(|a| a.role.id == trial.id).unwrap();
        assert_eq!(
            renewed.expires_at.map(|at| at.timestamp()),
            Some(until.timestamp())
        );
        assert_eq!(db.stats().await.unwrap().assignments, 2);

        let mut users = db.fetch_user_ids_for_roles(&[member.id, trial.id]).await.unwrap();
        users.sort_unstable();
        assert_eq!(users, vec![7]);

        assert!(db.delete_user_role(7, trial.id).await.unwrap());
        assert!(!db.delete_user_role(7, trial.id).await.unwrap());
        assert_eq!(db.fetch_roles_for_user(7, now).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_category_matrix() {
        let test_db = TestDatabase::new().await;
        let db = test_db.db();
        let role = db.insert_role(NewRole::new("member", "Member", 1)).await.unwrap();

        assert!(db.fetch_category_permissions(role.id, 4).await.unwrap().is_none());

        let read_only = CategoryFlags {
            can_view: true,
            can_create: false,
            can_reply: false,
            can_moderate: false,
        };
        db.upsert_category_permission(CategoryPermission {
            role_id: role.id,
            category_id: 4,
            flags: read_only,
        })
        .await
        .unwrap();
        assert_eq!(db.fetch_category_permissions(role.id, 4).await.unwrap(), Some(read_only));

        // Upsert keeps one row per (role, category)
        db.upsert_category_permission(CategoryPermission {
            role_id: role.id,
            category_id: 4,
            flags: CategoryFlags::default(),
        })
        .await
        .unwrap();
        let matrix = db.fetch_category_matrix(4).await.unwrap();
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix[0].flags, CategoryFlags::default());
        assert!(db.fetch_category_matrix(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_health_reports_row_counts() {
        let config = StorageConfig {
            database: test_db_config(),
            redis: RedisConfig::default(),
        };
        let storage = StorageLayer::new(&config).await.unwrap();
        storage.migrate().await.unwrap();

        let role = storage
            .database
            .insert_role(NewRole::new("member", "Member", 1))
            .await
            .unwrap();
        storage
            .database
            .upsert_user_role(assignment(5, role.id, None))
            .await
            .unwrap();

        let status = storage.health_check().await;
        assert!(status.is_healthy());
        assert_eq!(status.redis, None);
        let stats = status.stats.unwrap();
        assert_eq!(stats.roles, 1);
        assert_eq!(stats.assignments, 1);
        assert_eq!(stats.grants, 0);
    }
}
