use crate::auth::rbac::types::{AssignedRole, RoleId, UserId, UserRole};
use crate::utils::error::{AuthzError, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, user_role};
use super::types::{SeaOrmDatabase, db_id, db_ids};

impl SeaOrmDatabase {
    /// Roles of a user with an active assignment at `now`
    pub async fn find_roles_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<AssignedRole>> {
        let rows = entities::UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .order_by_asc(user_role::Column::RoleId)
            .find_also_related(entities::Role)
            .all(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        // Expired rows are left in place and skipped here
        Ok(rows
            .into_iter()
            .filter_map(|(assignment, role)| {
                let assignment = assignment.to_domain();
                match role {
                    Some(role) if assignment.is_active(now) => Some(AssignedRole {
                        role: role.to_domain(),
                        expires_at: assignment.expires_at,
                    }),
                    _ => None,
                }
            })
            .collect())
    }

    /// Create or renew an assignment
    pub async fn upsert_user_role(&self, assignment: UserRole) -> Result<()> {
        debug!(
            "Assigning role {} to user {} (expires {:?})",
            assignment.role_id, assignment.user_id, assignment.expires_at
        );

        let model = user_role::ActiveModel {
            user_id: Set(assignment.user_id),
            role_id: Set(db_id(assignment.role_id, "Role")?),
            expires_at: Set(assignment.expires_at.map(Into::into)),
            assigned_by: Set(assignment.assigned_by),
            assigned_at: Set(assignment.assigned_at.into()),
        };

        entities::UserRole::insert(model)
            .on_conflict(
                OnConflict::columns([user_role::Column::UserId, user_role::Column::RoleId])
                    .update_columns([
                        user_role::Column::ExpiresAt,
                        user_role::Column::AssignedBy,
                        user_role::Column::AssignedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(())
    }

    /// Remove an assignment
    pub async fn delete_user_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool> {
        let Ok(role_id) = i32::try_from(role_id) else {
            return Ok(false);
        };

        let result = entities::UserRole::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::RoleId.eq(role_id))
            .exec(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(result.rows_affected > 0)
    }

    /// Distinct users holding any of the roles
    pub async fn find_user_ids_for_roles(&self, role_ids: &[RoleId]) -> Result<Vec<UserId>> {
        let ids = db_ids(role_ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = entities::UserRole::find()
            .select_only()
            .column(user_role::Column::UserId)
            .distinct()
            .filter(user_role::Column::RoleId.is_in(ids))
            .order_by_asc(user_role::Column::UserId)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(users)
    }
}
