use crate::auth::rbac::types::{NewRole, Role, RoleId};
use crate::utils::error::{AuthzError, Result};
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, role};
use super::types::{SeaOrmDatabase, db_id};

impl SeaOrmDatabase {
    /// Find role by ID
    pub async fn find_role_by_id(&self, role_id: RoleId) -> Result<Option<Role>> {
        let Ok(id) = i32::try_from(role_id) else {
            return Ok(None);
        };

        let model = entities::Role::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(model.map(|model| model.to_domain()))
    }

    /// Find role by slug
    pub async fn find_role_by_slug(&self, slug: &str) -> Result<Option<Role>> {
        let model = entities::Role::find()
            .filter(role::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(model.map(|model| model.to_domain()))
    }

    /// List all roles, by ID
    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        let models = entities::Role::find()
            .order_by_asc(role::Column::Id)
            .all(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(models.iter().map(role::Model::to_domain).collect())
    }

    /// Create a new role
    pub async fn create_role(&self, new_role: NewRole) -> Result<Role> {
        debug!("Creating role: {}", new_role.slug);

        if self.find_role_by_slug(&new_role.slug).await?.is_some() {
            return Err(AuthzError::conflict(format!(
                "Role slug '{}' already exists",
                new_role.slug
            )));
        }

        let parent_id = new_role
            .parent_id
            .map(|id| db_id(id, "Parent role"))
            .transpose()?;
        let now = chrono::Utc::now();

        let active_model = role::ActiveModel {
            slug: Set(new_role.slug),
            name: Set(new_role.name),
            color: Set(new_role.color),
            icon: Set(new_role.icon),
            priority: Set(new_role.priority),
            is_displayed: Set(new_role.is_displayed),
            parent_id: Set(parent_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(model.to_domain())
    }

    /// Set or clear the parent of a role
    pub async fn set_role_parent(&self, role_id: RoleId, parent_id: Option<RoleId>) -> Result<()> {
        debug!("Setting parent of role {} to {:?}", role_id, parent_id);

        let mut role: role::ActiveModel = entities::Role::find_by_id(db_id(role_id, "Role")?)
            .one(&self.db)
            .await
            .map_err(AuthzError::Database)?
            .ok_or_else(|| AuthzError::NotFound(format!("Role {} not found", role_id)))?
            .into();

        role.parent_id = Set(parent_id.map(|id| db_id(id, "Parent role")).transpose()?);
        role.updated_at = Set(chrono::Utc::now().into());

        role.update(&self.db).await.map_err(AuthzError::Database)?;
        Ok(())
    }
}
