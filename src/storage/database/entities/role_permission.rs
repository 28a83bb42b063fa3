use crate::auth::rbac::types;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role permission grant database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "role_permissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub permission_id: i32,

    /// Condition payload as JSON text, NULL for an unconditional grant
    #[sea_orm(column_type = "Text", nullable)]
    pub conditions: Option<String>,
}

/// Role permission entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Belongs to role relation
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id"
    )]
    Role,
    /// Belongs to permission relation
    #[sea_orm(
        belongs_to = "super::permission::Entity",
        from = "Column::PermissionId",
        to = "super::permission::Column::Id"
    )]
    Permission,
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl Related<super::permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Permission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_domain(&self) -> types::RolePermissionRow {
        types::RolePermissionRow {
            role_id: self.role_id.into(),
            permission_id: self.permission_id.into(),
            conditions: self.conditions.clone(),
        }
    }
}
