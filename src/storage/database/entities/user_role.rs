use crate::auth::rbac::types;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role assignment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "user_roles")]
pub struct Model {
    /// Forum user ID, owned by the user service
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,

    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: i32,

    /// Assignment expiration, NULL for permanent
    pub expires_at: Option<DateTimeWithTimeZone>,

    /// Administrator who granted the role
    pub assigned_by: Option<i64>,

    /// Grant or renewal timestamp
    pub assigned_at: DateTimeWithTimeZone,
}

/// User role entity relations
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
    pub fn to_domain(&self) -> types::UserRole {
        types::UserRole {
            user_id: self.user_id,
            role_id: self.role_id.into(),
            expires_at: self.expires_at.map(|at| at.to_utc()),
            assigned_by: self.assigned_by,
            assigned_at: self.assigned_at.to_utc(),
        }
    }
}
