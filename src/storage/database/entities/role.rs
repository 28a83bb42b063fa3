use crate::auth::rbac::types;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    /// Role ID
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Unique slug
    #[sea_orm(unique)]
    pub slug: String,

    /// Display name
    pub name: String,

    pub color: Option<String>,

    pub icon: Option<String>,

    /// Higher is more authoritative
    pub priority: i32,

    pub is_displayed: bool,

    /// Parent role, self-referential
    pub parent_id: Option<i32>,

    /// Creation timestamp
    pub created_at: DateTimeWithTimeZone,

    /// Last update timestamp
    pub updated_at: DateTimeWithTimeZone,
}

/// Role entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Has many permission grants
    #[sea_orm(has_many = "super::role_permission::Entity")]
    RolePermissions,
    /// Has many user assignments
    #[sea_orm(has_many = "super::user_role::Entity")]
    UserRoles,
}

impl Related<super::role_permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RolePermissions.def()
    }
}

impl Related<super::user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert database model to domain role
    pub fn to_domain(&self) -> types::Role {
        types::Role {
            id: self.id.into(),
            slug: self.slug.clone(),
            name: self.name.clone(),
            color: self.color.clone(),
            icon: self.icon.clone(),
            priority: self.priority,
            is_displayed: self.is_displayed,
            parent_id: self.parent_id.map(i64::from),
        }
    }
}
