//! Test fixtures
//!
//! A small forum hierarchy seeded through the administration surface:
//!
//! ```text
//! member (1)
//!   └── moderator (50)
//! admin (100)
//! ```

use forum_authz::{AuthorizationService, CategoryFlags, NewPermission, NewRole, PermissionGrant};

pub const MEMBER_USER: i64 = 1;
pub const MODERATOR_USER: i64 = 2;
pub const ADMIN_USER: i64 = 3;

/// Category where members may only read
pub const ANNOUNCEMENTS: i64 = 10;

/// Ids of the seeded roles and permissions
#[derive(Debug, Clone, Copy)]
pub struct ForumFixture {
    pub member: i64,
    pub moderator: i64,
    pub admin: i64,
    pub topic_read: i64,
    pub topic_edit: i64,
    pub topic_pin: i64,
}

impl ForumFixture {
    pub async fn seed(service: &AuthorizationService) -> Self {
        let member = service
            .create_role(NewRole::new("member", "Member", 1))
            .await
            .expect("create member");
        let moderator = service
            .create_role(NewRole::new("moderator", "Moderator", 50).with_parent(member.id))
            .await
            .expect("create moderator");
        let admin = service
            .create_role(NewRole::new("admin", "Administrator", 100))
            .await
            .expect("create admin");

        let topic_read = permission(service, "topic.read").await;
        let topic_edit = permission(service, "topic.edit").await;
        let topic_pin = permission(service, "topic.pin").await;

        service
            .set_role_permissions(member.id, vec![
                PermissionGrant::unconditional(topic_read),
                PermissionGrant::from_json(topic_edit, Some(&serde_json::json!({ "own": true })))
                    .expect("valid conditions"),
            ])
            .await
            .expect("member grants");
        service
            .set_role_permissions(moderator.id, vec![
                PermissionGrant::unconditional(topic_edit),
                PermissionGrant::unconditional(topic_pin),
            ])
            .await
            .expect("moderator grants");
        service
            .set_category_permissions(member.id, ANNOUNCEMENTS, CategoryFlags {
                can_view: true,
                can_create: false,
                can_reply: false,
                can_moderate: false,
            })
            .await
            .expect("announcement flags");

        service
            .assign_role_to_user(MEMBER_USER, member.id, None, None)
            .await
            .expect("assign member");
        service
            .assign_role_to_user(MODERATOR_USER, moderator.id, None, Some(ADMIN_USER))
            .await
            .expect("assign moderator");
        service
            .assign_role_to_user(ADMIN_USER, admin.id, None, None)
            .await
            .expect("assign admin");

        Self {
            member: member.id,
            moderator: moderator.id,
            admin: admin.id,
            topic_read,
            topic_edit,
            topic_pin,
        }
    }
}

async fn permission(service: &AuthorizationService, slug: &str) -> i64 {
    service
        .create_permission(NewPermission::from_slug(slug))
        .await
        .expect("create permission")
        .id
}
