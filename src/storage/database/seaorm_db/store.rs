use crate::auth::rbac::types::{
    AssignedRole, CategoryFlags, CategoryId, CategoryPermission, NewPermission, NewRole,
    Permission, PermissionId, Role, RoleId, RolePermissionRow, UserId, UserRole,
};
use crate::storage::RoleStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::types::SeaOrmDatabase;

#[async_trait]
impl RoleStore for SeaOrmDatabase {
    async fn fetch_roles_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<AssignedRole>> {
        self.find_roles_for_user(user_id, now).await
    }

    async fn fetch_role_by_id(&self, role_id: RoleId) -> Result<Option<Role>> {
        self.find_role_by_id(role_id).await
    }

    async fn fetch_role_by_slug(&self, slug: &str) -> Result<Option<Role>> {
        self.find_role_by_slug(slug).await
    }

    async fn fetch_role_permissions(&self, role_ids: &[RoleId]) -> Result<Vec<RolePermissionRow>> {
        self.find_role_permissions(role_ids).await
    }

    async fn fetch_permissions_by_ids(
        &self,
        permission_ids: &[PermissionId],
    ) -> Result<Vec<Permission>> {
        self.find_permissions_by_ids(permission_ids).await
    }

    async fn fetch_permission_by_slug(&self, slug: &str) -> Result<Option<Permission>> {
        self.find_permission_by_slug(slug).await
    }

    async fn fetch_category_permissions(
        &self,
        role_id: RoleId,
        category_id: CategoryId,
    ) -> Result<Option<CategoryFlags>> {
        self.find_category_permissions(role_id, category_id).await
    }

    async fn fetch_category_matrix(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<CategoryPermission>> {
        self.find_category_matrix(category_id).await
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        SeaOrmDatabase::list_roles(self).await
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>> {
        SeaOrmDatabase::list_permissions(self).await
    }

    async fn insert_role(&self, role: NewRole) -> Result<Role> {
        self.create_role(role).await
    }

    async fn insert_permission(&self, permission: NewPermission) -> Result<Permission> {
        self.create_permission(permission).await
    }

    async fn upsert_user_role(&self, assignment: UserRole) -> Result<()> {
        SeaOrmDatabase::upsert_user_role(self, assignment).await
    }

    async fn delete_user_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool> {
        SeaOrmDatabase::delete_user_role(self, user_id, role_id).await
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        rows: Vec<RolePermissionRow>,
    ) -> Result<()> {
        SeaOrmDatabase::replace_role_permissions(self, role_id, rows).await
    }

    async fn update_role_parent(&self, role_id: RoleId, parent_id: Option<RoleId>) -> Result<()> {
        self.set_role_parent(role_id, parent_id).await
    }

    async fn upsert_category_permission(&self, row: CategoryPermission) -> Result<()> {
        SeaOrmDatabase::upsert_category_permission(self, row).await
    }

    async fn fetch_user_ids_for_roles(&self, role_ids: &[RoleId]) -> Result<Vec<UserId>> {
        self.find_user_ids_for_roles(role_ids).await
    }
}
