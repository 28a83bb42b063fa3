use crate::auth::rbac::types::{CategoryFlags, CategoryId, CategoryPermission, RoleId};
use crate::utils::error::{AuthzError, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use super::super::entities::{self, category_permission};
use super::types::{SeaOrmDatabase, db_id};

impl SeaOrmDatabase {
    /// Flags of one role for one category
    pub async fn find_category_permissions(
        &self,
        role_id: RoleId,
        category_id: CategoryId,
    ) -> Result<Option<CategoryFlags>> {
        let Ok(role_id) = i32::try_from(role_id) else {
            return Ok(None);
        };

        let model = entities::CategoryPermission::find_by_id((role_id, category_id))
            .one(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(model.map(|model| model.flags()))
    }

    /// Every stored row of a category
    pub async fn find_category_matrix(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<CategoryPermission>> {
        let models = entities::CategoryPermission::find()
            .filter(category_permission::Column::CategoryId.eq(category_id))
            .order_by_asc(category_permission::Column::RoleId)
            .all(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(models
            .iter()
            .map(category_permission::Model::to_domain)
            .collect())
    }

    /// Create or overwrite the flags of one role for one category
    pub async fn upsert_category_permission(&self, row: CategoryPermission) -> Result<()> {
        let model = category_permission::ActiveModel {
            role_id: Set(db_id(row.role_id, "Role")?),
            category_id: Set(row.category_id),
            can_view: Set(row.flags.can_view),
            can_create: Set(row.flags.can_create),
            can_reply: Set(row.flags.can_reply),
            can_moderate: Set(row.flags.can_moderate),
        };

        entities::CategoryPermission::insert(model)
            .on_conflict(
                OnConflict::columns([
                    category_permission::Column::RoleId,
                    category_permission::Column::CategoryId,
                ])
                .update_columns([
                    category_permission::Column::CanView,
                    category_permission::Column::CanCreate,
                    category_permission::Column::CanReply,
                    category_permission::Column::CanModerate,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(())
    }
}
