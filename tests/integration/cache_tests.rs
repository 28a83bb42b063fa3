//! Cache consistency tests
//!
//! The permission cache must never hand out grants older than the last
//! administrative change.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{ForumFixture, MEMBER_USER, MODERATOR_USER};
    use crate::common::TestDatabase;
    use forum_authz::{
        MemoryCacheStore, NewRole, PermissionCache, PermissionContext, PermissionGrant,
    };
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_new_assignment_visible_immediately() {
        let db = TestDatabase::new().await;
        let service = db.service();
        let forum = ForumFixture::seed(&service).await;

        let ctx = PermissionContext::new();
        assert!(!service.has_permission(MEMBER_USER, "topic.pin", &ctx).await.unwrap());

        service
            .assign_role_to_user(MEMBER_USER, forum.moderator, None, None)
            .await
            .unwrap();
        service.clear_user_permission_cache(MEMBER_USER).await;

        assert!(service.get_user_permissions(MEMBER_USER).await.unwrap().contains("topic.pin"));
    }

    #[tokio::test]
    async fn test_grant_change_reaches_inheriting_users() {
        let backend = Arc::new(MemoryCacheStore::new(1_000));
        let db = TestDatabase::new().await;
        let service = db.service_with(PermissionCache::new(backend.clone(), Duration::from_secs(300)));
        let forum = ForumFixture::seed(&service).await;

        // Warm both users' entries
        let ctx = PermissionContext::new();
        assert!(service.has_permission(MODERATOR_USER, "topic.read", &ctx).await.unwrap());
        assert!(service.has_permission(MEMBER_USER, "topic.read", &ctx).await.unwrap());
        assert!(service.cache().stats().misses > 0);

        service
            .set_role_permissions(forum.member, vec![PermissionGrant::unconditional(forum.topic_edit)])
            .await
            .unwrap();

        assert!(!service.has_permission(MEMBER_USER, "topic.read", &ctx).await.unwrap());
        assert!(!service.has_permission(MODERATOR_USER, "topic.read", &ctx).await.unwrap());
    }

    #[tokio::test]
    async fn test_shared_backend_between_services() {
        let backend = Arc::new(MemoryCacheStore::new(1_000));
        let db = TestDatabase::new().await;
        let first = db.service_with(PermissionCache::new(backend.clone(), Duration::from_secs(300)));
        let second = db.service_with(PermissionCache::new(backend, Duration::from_secs(300)));
        ForumFixture::seed(&first).await;

        let helper = first.create_role(NewRole::new("helper", "Helper", 5)).await.unwrap();
        assert!(!second.has_role(MEMBER_USER, "helper").await.unwrap());

        // Invalidation through one service clears the shared entry for the other
        first.assign_role_to_user(MEMBER_USER, helper.id, None, None).await.unwrap();
        assert!(second.has_role(MEMBER_USER, "helper").await.unwrap());
    }

    #[tokio::test]
    async fn test_disabled_cache_reads_through() {
        let db = TestDatabase::new().await;
        let service = db.service_with(PermissionCache::disabled());
        let forum = ForumFixture::seed(&service).await;

        assert!(service.has_role(MODERATOR_USER, "moderator").await.unwrap());
        service.remove_role_from_user(MODERATOR_USER, forum.moderator).await.unwrap();
        assert!(!service.has_role(MODERATOR_USER, "moderator").await.unwrap());
        assert_eq!(service.cache().stats(), Default::default());
    }
}
