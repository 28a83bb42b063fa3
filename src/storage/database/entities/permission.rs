use crate::auth::rbac::types;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Permission database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "permissions")]
pub struct Model {
    /// Permission ID
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Unique slug, `module.action`
    #[sea_orm(unique)]
    pub slug: String,

    pub name: String,

    pub module: String,

    pub action: String,

    /// Creation timestamp
    pub created_at: DateTimeWithTimeZone,
}

/// Permission entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Granted to roles
    #[sea_orm(has_many = "super::role_permission::Entity")]
    RolePermissions,
}

impl Related<super::role_permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RolePermissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert database model to domain permission
    pub fn to_domain(&self) -> types::Permission {
        types::Permission {
            id: self.id.into(),
            slug: self.slug.clone(),
            name: self.name.clone(),
            module: self.module.clone(),
            action: self.action.clone(),
        }
    }
}
