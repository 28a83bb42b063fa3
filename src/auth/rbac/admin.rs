//! Role and permission administration
//!
//! Every mutation drops the cached roles and permissions of each user whose
//! resolution it can change.

use super::conditions::Grant;
use super::inheritance::descendants_of;
use super::service::AuthorizationService;
use super::types::{
    CategoryFlags, CategoryId, CategoryPermission, NewPermission, NewRole, Permission,
    PermissionConflict, PermissionGrant, Role, RoleId, RolePermissionRow, RolePermissionView,
    UserId, UserRole,
};
use crate::utils::error::{AuthzError, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

impl AuthorizationService {
    pub async fn create_role(&self, role: NewRole) -> Result<Role> {
        if role.slug.trim().is_empty() {
            return Err(AuthzError::validation("Role slug cannot be empty"));
        }
        if let Some(parent_id) = role.parent_id {
            self.require_role(parent_id).await?;
        }

        let role = self.store.insert_role(role).await?;
        info!("Created role {} ({})", role.slug, role.id);
        Ok(role)
    }

    pub async fn create_permission(&self, permission: NewPermission) -> Result<Permission> {
        if permission.slug.trim().is_empty() {
            return Err(AuthzError::validation("Permission slug cannot be empty"));
        }

        let permission = self.store.insert_permission(permission).await?;
        info!("Created permission {} ({})", permission.slug, permission.id);
        Ok(permission)
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        self.store.list_roles().await
    }

    pub async fn list_permissions(&self) -> Result<Vec<Permission>> {
        self.store.list_permissions().await
    }

    /// Permissions granted directly to a role, with their decoded conditions
    pub async fn get_role_permissions(&self, role_id: RoleId) -> Result<Vec<RolePermissionView>> {
        let rows = self.store.fetch_role_permissions(&[role_id]).await?;
        let ids: Vec<_> = rows.iter().map(|row| row.permission_id).collect();
        let mut permissions: HashMap<_, _> = self
            .store
            .fetch_permissions_by_ids(&ids)
            .await?
            .into_iter()
            .map(|permission| (permission.id, permission))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                permissions.remove(&row.permission_id).map(|permission| RolePermissionView {
                    permission,
                    grant: Grant::from_payload(row.conditions.as_deref()),
                })
            })
            .collect())
    }

    /// Replace the grants of a role
    pub async fn set_role_permissions(
        &self,
        role_id: RoleId,
        grants: Vec<PermissionGrant>,
    ) -> Result<()> {
        self.require_role(role_id).await?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = grants.iter().find(|g| !seen.insert(g.permission_id)) {
            return Err(AuthzError::validation(format!(
                "Permission {} listed twice",
                duplicate.permission_id
            )));
        }

        let ids: Vec<_> = seen.into_iter().collect();
        let known: HashSet<_> = self
            .store
            .fetch_permissions_by_ids(&ids)
            .await?
            .into_iter()
            .map(|permission| permission.id)
            .collect();
        if let Some(missing) = ids.iter().find(|id| !known.contains(id)) {
            return Err(AuthzError::not_found(format!(
                "Permission {} not found",
                missing
            )));
        }

        let rows = grants
            .into_iter()
            .map(|grant| {
                Ok(RolePermissionRow {
                    role_id,
                    permission_id: grant.permission_id,
                    conditions: match grant.conditions {
                        Some(conditions) if !conditions.is_empty() => {
                            Some(conditions.to_payload()?)
                        }
                        _ => None,
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let count = rows.len();
        self.store.replace_role_permissions(role_id, rows).await?;
        info!("Set {} permission(s) on role {}", count, role_id);

        self.invalidate_role(role_id).await
    }

    /// Set or clear the parent of a role, rejecting links that close a loop
    pub async fn set_role_parent(&self, role_id: RoleId, parent_id: Option<RoleId>) -> Result<()> {
        self.require_role(role_id).await?;
        if let Some(parent_id) = parent_id {
            self.require_role(parent_id).await?;
        }

        if self
            .aggregator
            .inheritance()
            .detect_circular_inheritance(role_id, parent_id)
            .await?
        {
            warn!(
                "Rejected parent {:?} for role {}: circular inheritance",
                parent_id, role_id
            );
            return Err(AuthzError::CircularInheritance {
                role_id,
                parent_id: parent_id.unwrap_or(role_id),
            });
        }

        self.store.update_role_parent(role_id, parent_id).await?;
        info!("Set parent of role {} to {:?}", role_id, parent_id);

        self.invalidate_role(role_id).await
    }

    /// Grant a role to a user, renewing an existing assignment
    pub async fn assign_role_to_user(
        &self,
        user_id: UserId,
        role_id: RoleId,
        expires_at: Option<DateTime<Utc>>,
        assigned_by: Option<UserId>,
    ) -> Result<()> {
        self.require_role(role_id).await?;

        let now = Utc::now();
        if expires_at.is_some_and(|at| at <= now) {
            warn!(
                "Assignment of role {} to user {} is already expired",
                role_id, user_id
            );
        }

        self.store
            .upsert_user_role(UserRole {
                user_id,
                role_id,
                expires_at,
                assigned_by,
                assigned_at: now,
            })
            .await?;
        info!(
            "Assigned role {} to user {} (expires {:?})",
            role_id, user_id, expires_at
        );

        self.clear_user_permission_cache(user_id).await;
        Ok(())
    }

    /// Returns whether the user held the role
    pub async fn remove_role_from_user(&self, user_id: UserId, role_id: RoleId) -> Result<bool> {
        let removed = self.store.delete_user_role(user_id, role_id).await?;
        if removed {
            info!("Removed role {} from user {}", role_id, user_id);
        }

        self.clear_user_permission_cache(user_id).await;
        Ok(removed)
    }

    /// Stored rows of a category; roles without a row use the defaults
    pub async fn get_category_permissions(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<CategoryPermission>> {
        self.store.fetch_category_matrix(category_id).await
    }

    /// Category checks read the store directly, nothing cached to drop
    pub async fn set_category_permissions(
        &self,
        role_id: RoleId,
        category_id: CategoryId,
        flags: CategoryFlags,
    ) -> Result<()> {
        self.require_role(role_id).await?;
        self.store
            .upsert_category_permission(CategoryPermission {
                role_id,
                category_id,
                flags,
            })
            .await?;
        info!(
            "Set category {} flags of role {}: {:?}",
            category_id, role_id, flags
        );
        Ok(())
    }

    /// Equal-priority grants with different conditions among the user's roles
    pub async fn permission_conflicts(&self, user_id: UserId) -> Result<Vec<PermissionConflict>> {
        let roles = self.get_user_roles(user_id).await?;
        Ok(self.aggregator.resolve(&roles).await?.conflicts)
    }

    /// Users holding the role or any role inheriting from it
    pub async fn affected_users(&self, role_id: RoleId) -> Result<Vec<UserId>> {
        let roles = self.store.list_roles().await?;
        let mut role_ids = vec![role_id];
        role_ids.extend(descendants_of(role_id, &roles));
        self.store.fetch_user_ids_for_roles(&role_ids).await
    }

    async fn invalidate_role(&self, role_id: RoleId) -> Result<()> {
        let users = self.affected_users(role_id).await?;
        self.cache.clear_users(&users).await;
        Ok(())
    }

    async fn require_role(&self, role_id: RoleId) -> Result<Role> {
        self.store
            .fetch_role_by_id(role_id)
            .await?
            .ok_or_else(|| AuthzError::not_found(format!("Role {} not found", role_id)))
    }
}
