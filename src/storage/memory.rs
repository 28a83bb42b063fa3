//! In-memory role store
//!
//! Same semantics as the database store, kept behind one `parking_lot` lock.
//! Used for embedding the engine without a database and in tests.

use super::RoleStore;
use crate::auth::rbac::types::{
    AssignedRole, CategoryFlags, CategoryId, CategoryPermission, NewPermission, NewRole,
    Permission, PermissionId, Role, RoleId, RolePermissionRow, UserId, UserRole,
};
use crate::utils::error::{AuthzError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
struct Tables {
    roles: BTreeMap<RoleId, Role>,
    permissions: BTreeMap<PermissionId, Permission>,
    role_permissions: BTreeMap<(RoleId, PermissionId), Option<String>>,
    user_roles: BTreeMap<(UserId, RoleId), UserRole>,
    category_permissions: BTreeMap<(RoleId, CategoryId), CategoryFlags>,
    next_role_id: RoleId,
    next_permission_id: PermissionId,
}

/// [`RoleStore`] held in process memory
#[derive(Debug, Default)]
pub struct MemoryRoleStore {
    tables: RwLock<Tables>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a role with a fixed id, bypassing the parent check. Lets tests
    /// build hierarchies the administration surface would reject.
    pub fn insert_role_unchecked(&self, role: Role) {
        let mut tables = self.tables.write();
        tables.next_role_id = tables.next_role_id.max(role.id);
        tables.roles.insert(role.id, role);
    }

    /// Number of stored assignments, active or not
    pub fn assignment_count(&self) -> usize {
        self.tables.read().user_roles.len()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn fetch_roles_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<AssignedRole>> {
        let tables = self.tables.read();
        let roles = tables
            .user_roles
            .range((user_id, RoleId::MIN)..=(user_id, RoleId::MAX))
            .map(|(_, assignment)| assignment)
            .filter(|assignment| assignment.is_active(now))
            .filter_map(|assignment| {
                tables.roles.get(&assignment.role_id).map(|role| AssignedRole {
                    role: role.clone(),
                    expires_at: assignment.expires_at,
                })
            })
            .collect();
        Ok(roles)
    }

    async fn fetch_role_by_id(&self, role_id: RoleId) -> Result<Option<Role>> {
        Ok(self.tables.read().roles.get(&role_id).cloned())
    }

    async fn fetch_role_by_slug(&self, slug: &str) -> Result<Option<Role>> {
        Ok(self
            .tables
            .read()
            .roles
            .values()
            .find(|role| role.slug == slug)
            .cloned())
    }

    async fn fetch_role_permissions(&self, role_ids: &[RoleId]) -> Result<Vec<RolePermissionRow>> {
        let wanted: BTreeSet<RoleId> = role_ids.iter().copied().collect();
        let tables = self.tables.read();
        Ok(tables
            .role_permissions
            .iter()
            .filter(|((role_id, _), _)| wanted.contains(role_id))
            .map(|((role_id, permission_id), conditions)| RolePermissionRow {
                role_id: *role_id,
                permission_id: *permission_id,
                conditions: conditions.clone(),
            })
            .collect())
    }

    async fn fetch_permissions_by_ids(
        &self,
        permission_ids: &[PermissionId],
    ) -> Result<Vec<Permission>> {
        let tables = self.tables.read();
        let ids: BTreeSet<PermissionId> = permission_ids.iter().copied().collect();
        Ok(ids
            .into_iter()
            .filter_map(|id| tables.permissions.get(&id).cloned())
            .collect())
    }

    async fn fetch_permission_by_slug(&self, slug: &str) -> Result<Option<Permission>> {
        Ok(self
            .tables
            .read()
            .permissions
            .values()
            .find(|permission| permission.slug == slug)
            .cloned())
    }

    async fn fetch_category_permissions(
        &self,
        role_id: RoleId,
        category_id: CategoryId,
    ) -> Result<Option<CategoryFlags>> {
        Ok(self
            .tables
            .read()
            .category_permissions
            .get(&(role_id, category_id))
            .copied())
    }

    async fn fetch_category_matrix(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<CategoryPermission>> {
        Ok(self
            .tables
            .read()
            .category_permissions
            .iter()
            .filter(|((_, category), _)| *category == category_id)
            .map(|((role_id, category_id), flags)| CategoryPermission {
                role_id: *role_id,
                category_id: *category_id,
                flags: *flags,
            })
            .collect())
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        Ok(self.tables.read().roles.values().cloned().collect())
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>> {
        Ok(self.tables.read().permissions.values().cloned().collect())
    }

    async fn insert_role(&self, role: NewRole) -> Result<Role> {
        let mut tables = self.tables.write();
        if tables.roles.values().any(|existing| existing.slug == role.slug) {
            return Err(AuthzError::conflict(format!(
                "Role slug '{}' already exists",
                role.slug
            )));
        }

        tables.next_role_id += 1;
        let role = Role {
            id: tables.next_role_id,
            slug: role.slug,
            name: role.name,
            color: role.color,
            icon: role.icon,
            priority: role.priority,
            is_displayed: role.is_displayed,
            parent_id: role.parent_id,
        };
        tables.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn insert_permission(&self, permission: NewPermission) -> Result<Permission> {
        let mut tables = self.tables.write();
        if tables
            .permissions
            .values()
            .any(|existing| existing.slug == permission.slug)
        {
            return Err(AuthzError::conflict(format!(
                "Permission slug '{}' already exists",
                permission.slug
            )));
        }

        tables.next_permission_id += 1;
        let permission = Permission {
            id: tables.next_permission_id,
            slug: permission.slug,
            name: permission.name,
            module: permission.module,
            action: permission.action,
        };
        tables.permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn upsert_user_role(&self, assignment: UserRole) -> Result<()> {
        self.tables
            .write()
            .user_roles
            .insert((assignment.user_id, assignment.role_id), assignment);
        Ok(())
    }

    async fn delete_user_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool> {
        Ok(self
            .tables
            .write()
            .user_roles
            .remove(&(user_id, role_id))
            .is_some())
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        rows: Vec<RolePermissionRow>,
    ) -> Result<()> {
        let mut tables = self.tables.write();
        tables.role_permissions.retain(|(owner, _), _| *owner != role_id);
        for row in rows {
            tables
                .role_permissions
                .insert((role_id, row.permission_id), row.conditions);
        }
        Ok(())
    }

    async fn update_role_parent(&self, role_id: RoleId, parent_id: Option<RoleId>) -> Result<()> {
        let mut tables = self.tables.write();
        let role = tables
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| AuthzError::not_found(format!("Role {} not found", role_id)))?;
        role.parent_id = parent_id;
        Ok(())
    }

    async fn upsert_category_permission(&self, row: CategoryPermission) -> Result<()> {
        self.tables
            .write()
            .category_permissions
            .insert((row.role_id, row.category_id), row.flags);
        Ok(())
    }

    async fn fetch_user_ids_for_roles(&self, role_ids: &[RoleId]) -> Result<Vec<UserId>> {
        let wanted: BTreeSet<RoleId> = role_ids.iter().copied().collect();
        let users: BTreeSet<UserId> = self
            .tables
            .read()
            .user_roles
            .keys()
            .filter(|(_, role_id)| wanted.contains(role_id))
            .map(|(user_id, _)| *user_id)
            .collect();
        Ok(users.into_iter().collect())
    }
}
