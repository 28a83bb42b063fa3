//! Role inheritance over `parent_id` links

use super::types::{Role, RoleId};
use crate::storage::RoleStore;
use crate::utils::error::Result;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::warn;

/// Walks the role hierarchy stored in a [`RoleStore`]
#[derive(Clone)]
pub struct InheritanceResolver {
    store: Arc<dyn RoleStore>,
}

impl InheritanceResolver {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    /// Ancestor ids of a role, nearest first. Unknown roles have no ancestors.
    pub async fn ancestors_of(&self, role_id: RoleId) -> Result<Vec<RoleId>> {
        let Some(role) = self.store.fetch_role_by_id(role_id).await? else {
            return Ok(Vec::new());
        };

        Ok(self
            .ancestor_roles(&role)
            .await?
            .into_iter()
            .map(|ancestor| ancestor.id)
            .collect())
    }

    /// Ancestors of an already loaded role, nearest first.
    ///
    /// A link back into the chain ends the walk: the chain built so far is
    /// returned as is. A link to a missing role ends it the same way.
    pub async fn ancestor_roles(&self, role: &Role) -> Result<Vec<Role>> {
        let mut visited = HashSet::from([role.id]);
        let mut chain = Vec::new();
        let mut next = role.parent_id;

        while let Some(parent_id) = next {
            if !visited.insert(parent_id) {
                warn!(
                    "Role hierarchy cycle at role {} reached from role {}, truncating",
                    parent_id, role.id
                );
                break;
            }

            let Some(parent) = self.store.fetch_role_by_id(parent_id).await? else {
                warn!("Role {} references missing parent {}", role.id, parent_id);
                break;
            };

            next = parent.parent_id;
            chain.push(parent);
        }

        Ok(chain)
    }

    /// The given roles followed by every ancestor not already listed
    pub async fn expand(&self, roles: &[Role]) -> Result<Vec<Role>> {
        let mut seen: HashSet<RoleId> = roles.iter().map(|role| role.id).collect();
        let mut expanded: Vec<Role> = Vec::with_capacity(roles.len());
        expanded.extend(roles.iter().cloned());

        for role in roles {
            for ancestor in self.ancestor_roles(role).await? {
                if seen.insert(ancestor.id) {
                    expanded.push(ancestor);
                }
            }
        }

        Ok(expanded)
    }

    /// Whether making `parent_id` the parent of `role_id` would close a loop.
    ///
    /// Walks up from the candidate parent; reaching `role_id` means the new
    /// edge would make the role its own ancestor.
    pub async fn detect_circular_inheritance(
        &self,
        role_id: RoleId,
        parent_id: Option<RoleId>,
    ) -> Result<bool> {
        let Some(parent_id) = parent_id else {
            return Ok(false);
        };

        let mut visited = HashSet::new();
        let mut current = Some(parent_id);

        while let Some(id) = current {
            if id == role_id {
                return Ok(true);
            }
            // An existing loop above the parent that does not pass through `role_id`
            if !visited.insert(id) {
                return Ok(false);
            }
            current = self
                .store
                .fetch_role_by_id(id)
                .await?
                .and_then(|role| role.parent_id);
        }

        Ok(false)
    }
}

/// Ids of every role inheriting from `role_id`, directly or not
pub fn descendants_of(role_id: RoleId, roles: &[Role]) -> Vec<RoleId> {
    let mut children: HashMap<RoleId, Vec<RoleId>> = HashMap::new();
    for role in roles {
        if let Some(parent_id) = role.parent_id {
            children.entry(parent_id).or_default().push(role.id);
        }
    }

    let mut visited = HashSet::from([role_id]);
    let mut queue = VecDeque::from([role_id]);
    let mut descendants = Vec::new();

    while let Some(id) = queue.pop_front() {
        for child in children.get(&id).into_iter().flatten() {
            if visited.insert(*child) {
                descendants.push(*child);
                queue.push_back(*child);
            }
        }
    }

    descendants
}
