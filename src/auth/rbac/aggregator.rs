//! Permission aggregation across a user's roles

use super::conditions::Grant;
use super::inheritance::InheritanceResolver;
use super::types::{
    PermissionConflict, PermissionId, ResolvedPermission, ResolvedPermissionSet, RoleId,
    UserRoleSet,
};
use crate::config::TieBreakPolicy;
use crate::storage::RoleStore;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of merging the grants of a role set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub permissions: ResolvedPermissionSet,
    /// Equal-priority grants with different conditions, settled by the tie-break policy
    pub conflicts: Vec<PermissionConflict>,
}

/// Merges role grants into one resolved permission set per user
#[derive(Clone)]
pub struct PermissionAggregator {
    store: Arc<dyn RoleStore>,
    inheritance: InheritanceResolver,
    tie_break: TieBreakPolicy,
}

impl PermissionAggregator {
    pub fn new(store: Arc<dyn RoleStore>, tie_break: TieBreakPolicy) -> Self {
        Self {
            inheritance: InheritanceResolver::new(store.clone()),
            store,
            tie_break,
        }
    }

    pub fn inheritance(&self) -> &InheritanceResolver {
        &self.inheritance
    }

    /// Resolve the permissions reachable through `roles` and their ancestors
    pub async fn resolve(&self, roles: &UserRoleSet) -> Result<Resolution> {
        if roles.is_empty() {
            return Ok(Resolution::default());
        }

        let direct: Vec<_> = roles.roles().cloned().collect();
        let expanded = self.inheritance.expand(&direct).await?;
        let priorities: HashMap<RoleId, i32> =
            expanded.iter().map(|role| (role.id, role.priority)).collect();
        let role_ids: Vec<RoleId> = expanded.iter().map(|role| role.id).collect();

        let mut rows = self.store.fetch_role_permissions(&role_ids).await?;
        if self.tie_break == TieBreakPolicy::LowestRoleId {
            rows.sort_by_key(|row| (row.role_id, row.permission_id));
        }

        let mut permission_ids: Vec<PermissionId> =
            rows.iter().map(|row| row.permission_id).collect();
        permission_ids.sort_unstable();
        permission_ids.dedup();
        let slugs: HashMap<PermissionId, String> = self
            .store
            .fetch_permissions_by_ids(&permission_ids)
            .await?
            .into_iter()
            .map(|permission| (permission.id, permission.slug))
            .collect();

        let mut resolution = Resolution::default();
        for row in rows {
            let (Some(slug), Some(priority)) =
                (slugs.get(&row.permission_id), priorities.get(&row.role_id))
            else {
                continue;
            };

            let candidate = ResolvedPermission {
                slug: slug.clone(),
                grant: Grant::from_payload(row.conditions.as_deref()),
                source_role_id: row.role_id,
                source_priority: *priority,
            };
            merge_grant(
                &mut resolution.permissions.entries,
                candidate,
                self.tie_break,
                &mut resolution.conflicts,
            );
        }

        resolution.permissions.valid_until = roles.valid_until();
        debug!(
            "Resolved {} permission(s) from {} role(s)",
            resolution.permissions.len(),
            expanded.len()
        );
        Ok(resolution)
    }
}

/// Fold one grant into the resolved entries.
///
/// - An unconditional grant replaces a conditional one whatever the priorities.
/// - A conditional grant replaces a conditional one from a strictly lower priority role.
/// - Equal priority with different conditions is settled by `tie_break` and recorded.
/// - Anything else keeps the existing entry.
pub fn merge_grant(
    entries: &mut HashMap<String, ResolvedPermission>,
    candidate: ResolvedPermission,
    tie_break: TieBreakPolicy,
    conflicts: &mut Vec<PermissionConflict>,
) {
    let mut slot = match entries.entry(candidate.slug.clone()) {
        Entry::Vacant(vacant) => {
            vacant.insert(candidate);
            return;
        }
        Entry::Occupied(occupied) => occupied,
    };
    let existing = slot.get();

    if existing.grant.is_unconditional() {
        return;
    }

    if candidate.grant.is_unconditional() {
        debug!(
            "Unconditional grant of {} from role {} overrides role {}",
            candidate.slug, candidate.source_role_id, existing.source_role_id
        );
        slot.insert(candidate);
        return;
    }

    if candidate.source_priority > existing.source_priority {
        slot.insert(candidate);
        return;
    }

    if candidate.source_priority == existing.source_priority && candidate.grant != existing.grant
    {
        let candidate_wins = match tie_break {
            TieBreakPolicy::LowestRoleId => candidate.source_role_id < existing.source_role_id,
            TieBreakPolicy::FirstSeen => false,
        };
        let (kept, discarded) = if candidate_wins {
            (candidate.source_role_id, existing.source_role_id)
        } else {
            (existing.source_role_id, candidate.source_role_id)
        };

        warn!(
            "Roles {} and {} grant {} at equal priority {} with different conditions, keeping role {}",
            existing.source_role_id, candidate.source_role_id, candidate.slug, candidate.source_priority, kept
        );
        conflicts.push(PermissionConflict {
            slug: candidate.slug.clone(),
            priority: candidate.source_priority,
            kept_role_id: kept,
            discarded_role_id: discarded,
        });

        if candidate_wins {
            slot.insert(candidate);
        }
    }
}
