use crate::auth::rbac::types::{NewPermission, Permission, PermissionId, RoleId, RolePermissionRow};
use crate::utils::error::{AuthzError, Result};
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, permission, role_permission};
use super::types::{SeaOrmDatabase, db_id, db_ids};

impl SeaOrmDatabase {
    /// Find permissions by IDs
    pub async fn find_permissions_by_ids(
        &self,
        permission_ids: &[PermissionId],
    ) -> Result<Vec<Permission>> {
        let ids = db_ids(permission_ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = entities::Permission::find()
            .filter(permission::Column::Id.is_in(ids))
            .order_by_asc(permission::Column::Id)
            .all(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(models.iter().map(permission::Model::to_domain).collect())
    }

    /// Find permission by slug
    pub async fn find_permission_by_slug(&self, slug: &str) -> Result<Option<Permission>> {
        let model = entities::Permission::find()
            .filter(permission::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(model.map(|model| model.to_domain()))
    }

    /// List all permissions, by ID
    pub async fn list_permissions(&self) -> Result<Vec<Permission>> {
        let models = entities::Permission::find()
            .order_by_asc(permission::Column::Id)
            .all(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(models.iter().map(permission::Model::to_domain).collect())
    }

    /// Create a new permission
    pub async fn create_permission(&self, new_permission: NewPermission) -> Result<Permission> {
        debug!("Creating permission: {}", new_permission.slug);

        if self
            .find_permission_by_slug(&new_permission.slug)
            .await?
            .is_some()
        {
            return Err(AuthzError::conflict(format!(
                "Permission slug '{}' already exists",
                new_permission.slug
            )));
        }

        let active_model = permission::ActiveModel {
            slug: Set(new_permission.slug),
            name: Set(new_permission.name),
            module: Set(new_permission.module),
            action: Set(new_permission.action),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(model.to_domain())
    }

    /// Grants of the given roles, ordered by role then permission
    pub async fn find_role_permissions(&self, role_ids: &[RoleId]) -> Result<Vec<RolePermissionRow>> {
        let ids = db_ids(role_ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = entities::RolePermission::find()
            .filter(role_permission::Column::RoleId.is_in(ids))
            .order_by_asc(role_permission::Column::RoleId)
            .order_by_asc(role_permission::Column::PermissionId)
            .all(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(models.iter().map(role_permission::Model::to_domain).collect())
    }

    /// Replace every grant of a role
    pub async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        rows: Vec<RolePermissionRow>,
    ) -> Result<()> {
        debug!("Replacing {} permission(s) of role {}", rows.len(), role_id);

        let role = db_id(role_id, "Role")?;
        let models = rows
            .into_iter()
            .map(|row| {
                Ok(role_permission::ActiveModel {
                    role_id: Set(role),
                    permission_id: Set(db_id(row.permission_id, "Permission")?),
                    conditions: Set(row.conditions),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let txn = self.db.begin().await.map_err(AuthzError::Database)?;

        entities::RolePermission::delete_many()
            .filter(role_permission::Column::RoleId.eq(role))
            .exec(&txn)
            .await
            .map_err(AuthzError::Database)?;

        if !models.is_empty() {
            entities::RolePermission::insert_many(models)
                .exec_without_returning(&txn)
                .await
                .map_err(AuthzError::Database)?;
        }

        txn.commit().await.map_err(AuthzError::Database)?;
        Ok(())
    }
}
