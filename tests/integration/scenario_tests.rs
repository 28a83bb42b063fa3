//! Permission resolution scenarios
//!
//! End-to-end checks through `AuthorizationService` backed by SQLite.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{
        ADMIN_USER, ANNOUNCEMENTS, ForumFixture, MEMBER_USER, MODERATOR_USER,
    };
    use crate::common::TestDatabase;
    use chrono::{Duration, Utc};
    use forum_authz::{
        AuthzError, CategoryAction, ConditionSet, Grant, NewPermission, NewRole, PermissionContext,
        PermissionGrant,
    };

    #[tokio::test]
    async fn test_editor_and_trial_roles() {
        let db = TestDatabase::new().await;
        let service = db.service();

        let editor = service.create_role(NewRole::new("editor", "Editor", 10)).await.unwrap();
        let trial = service.create_role(NewRole::new("trial", "Trial", 1)).await.unwrap();
        let delete = service
            .create_permission(NewPermission::from_slug("post.delete"))
            .await
            .unwrap();

        service
            .set_role_permissions(editor.id, vec![PermissionGrant::unconditional(delete.id)])
            .await
            .unwrap();
        service
            .set_role_permissions(trial.id, vec![PermissionGrant::conditional(
                delete.id,
                ConditionSet::parse(r#"{"accountAge": 30}"#).unwrap(),
            )])
            .await
            .unwrap();

        let user = 500;
        let ctx = PermissionContext::new().with_account_created_at(Utc::now() - Duration::days(10));

        service.assign_role_to_user(user, trial.id, None, None).await.unwrap();
        assert!(!service.has_permission(user, "post.delete", &ctx).await.unwrap());

        service.assign_role_to_user(user, editor.id, None, None).await.unwrap();
        assert!(service.has_permission(user, "post.delete", &ctx).await.unwrap());

        let check = service.can(user, "post.delete", &ctx).await.unwrap();
        assert_eq!(check.source_role_id, Some(editor.id));
    }

    #[tokio::test]
    async fn test_forum_hierarchy() {
        let db = TestDatabase::new().await;
        let service = db.service();
        let forum = ForumFixture::seed(&service).await;

        let own_topic = PermissionContext::new().with_owner(MEMBER_USER);
        let other_topic = PermissionContext::new().with_owner(ADMIN_USER);

        assert!(service.has_permission(MEMBER_USER, "topic.edit", &own_topic).await.unwrap());
        assert!(!service.has_permission(MEMBER_USER, "topic.edit", &other_topic).await.unwrap());
        assert!(!service.has_permission(MEMBER_USER, "topic.pin", &own_topic).await.unwrap());

        // The moderator's unconditional edit overrides the inherited ownership rule
        assert!(service.has_permission(MODERATOR_USER, "topic.edit", &other_topic).await.unwrap());
        assert!(service.has_all_permissions(MODERATOR_USER, &["topic.read", "topic.pin"]).await.unwrap());

        let permissions = service.get_user_permissions(MODERATOR_USER).await.unwrap();
        let mut slugs = permissions.slugs();
        slugs.sort_unstable();
        assert_eq!(slugs, vec!["topic.edit", "topic.pin", "topic.read"]);
        assert_eq!(permissions.get("topic.read").unwrap().source_role_id, forum.member);

        // Admin bypass: no explicit grants needed
        assert!(service.is_admin(ADMIN_USER).await.unwrap());
        assert!(service.has_permission(ADMIN_USER, "forum.anything", &other_topic).await.unwrap());

        let mut affected = service.affected_users(forum.member).await.unwrap();
        affected.sort_unstable();
        assert_eq!(affected, vec![MEMBER_USER, MODERATOR_USER]);
    }

    #[tokio::test]
    async fn test_category_permissions_through_hierarchy() {
        let db = TestDatabase::new().await;
        let service = db.service();
        let forum = ForumFixture::seed(&service).await;

        assert!(service.check_category_permission(MEMBER_USER, ANNOUNCEMENTS, CategoryAction::View).await.unwrap());
        assert!(!service.check_category_permission(MEMBER_USER, ANNOUNCEMENTS, CategoryAction::Create).await.unwrap());
        assert!(service.check_category_permission(MEMBER_USER, ANNOUNCEMENTS + 1, CategoryAction::Create).await.unwrap());

        // The moderator role has no row and falls back to the defaults
        assert!(service.check_category_permission(MODERATOR_USER, ANNOUNCEMENTS, CategoryAction::Create).await.unwrap());
        assert!(!service.check_category_permission(MODERATOR_USER, ANNOUNCEMENTS, CategoryAction::Moderate).await.unwrap());
        assert!(service.check_category_permission(ADMIN_USER, ANNOUNCEMENTS, CategoryAction::Moderate).await.unwrap());

        let matrix = service.get_category_permissions(ANNOUNCEMENTS).await.unwrap();
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix[0].role_id, forum.member);
    }

    #[tokio::test]
    async fn test_stored_grants_round_trip() {
        let db = TestDatabase::new().await;
        let service = db.service();
        let forum = ForumFixture::seed(&service).await;

        let views = service.get_role_permissions(forum.member).await.unwrap();
        assert_eq!(views.len(), 2);
        let edit = views
            .iter()
            .find(|view| view.permission.id == forum.topic_edit)
            .unwrap();
        match &edit.grant {
            Grant::Conditional { conditions } => assert_eq!(conditions.len(), 1),
            other => panic!("expected a conditional grant, got {:?}", other),
        }

        let err = service
            .set_role_permissions(forum.member, vec![PermissionGrant::unconditional(9_999)])
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::NotFound(_)));
        // A rejected update leaves the stored grants untouched
        assert_eq!(service.get_role_permissions(forum.member).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_hierarchy_cycles_rejected() {
        let db = TestDatabase::new().await;
        let service = db.service();
        let forum = ForumFixture::seed(&service).await;

        let err = service
            .set_role_parent(forum.member, Some(forum.moderator))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::CircularInheritance { .. }));

        let err = service
            .set_role_parent(forum.member, Some(forum.member))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::CircularInheritance { .. }));

        service.set_role_parent(forum.moderator, None).await.unwrap();
        let own_topic = PermissionContext::new().with_owner(MODERATOR_USER);
        assert!(!service.has_permission(MODERATOR_USER, "topic.read", &own_topic).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_assignment_is_ignored() {
        let db = TestDatabase::new().await;
        let service = db.service();
        let forum = ForumFixture::seed(&service).await;

        let user = 600;
        service
            .assign_role_to_user(user, forum.moderator, Some(Utc::now() - Duration::minutes(5)), None)
            .await
            .unwrap();

        assert!(service.get_user_roles(user).await.unwrap().is_empty());
        assert!(!service.has_role(user, "moderator").await.unwrap());
        assert!(service.get_user_permissions(user).await.unwrap().is_empty());
    }
}
