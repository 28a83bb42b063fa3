use crate::auth::rbac::types::{self, CategoryFlags};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-category permission matrix row
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "category_permissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: i32,

    /// Category ID, owned by the content service
    #[sea_orm(primary_key, auto_increment = false)]
    pub category_id: i64,

    pub can_view: bool,

    pub can_create: bool,

    pub can_reply: bool,

    pub can_moderate: bool,
}

/// Category permission entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Belongs to role relation
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id"
    )]
    Role,
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn flags(&self) -> CategoryFlags {
        CategoryFlags {
            can_view: self.can_view,
            can_create: self.can_create,
            can_reply: self.can_reply,
            can_moderate: self.can_moderate,
        }
    }

    pub fn to_domain(&self) -> types::CategoryPermission {
        types::CategoryPermission {
            role_id: self.role_id.into(),
            category_id: self.category_id,
            flags: self.flags(),
        }
    }
}
