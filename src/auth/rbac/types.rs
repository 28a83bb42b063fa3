//! RBAC type definitions

use super::conditions::{ConditionSet, Grant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub type UserId = i64;
pub type RoleId = i64;
pub type PermissionId = i64;
pub type CategoryId = i64;

/// Role definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    /// Unique role slug, e.g. `moderator`
    pub slug: String,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    /// Higher is more authoritative
    pub priority: i32,
    pub is_displayed: bool,
    /// Parent role (inheritance)
    pub parent_id: Option<RoleId>,
}

/// Fields of a role about to be created
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRole {
    pub slug: String,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub priority: i32,
    pub is_displayed: bool,
    pub parent_id: Option<RoleId>,
}

impl NewRole {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, priority: i32) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            priority,
            is_displayed: true,
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent_id: RoleId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Permission definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    /// Unique permission slug, e.g. `topic.pin`
    pub slug: String,
    pub name: String,
    /// Module this permission applies to
    pub module: String,
    /// Action this permission allows
    pub action: String,
}

/// Fields of a permission about to be created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPermission {
    pub slug: String,
    pub name: String,
    pub module: String,
    pub action: String,
}

impl NewPermission {
    /// Build from a `module.action` slug
    pub fn from_slug(slug: impl Into<String>) -> Self {
        let slug = slug.into();
        let (module, action) = slug
            .split_once('.')
            .map(|(m, a)| (m.to_string(), a.to_string()))
            .unwrap_or_else(|| (slug.clone(), String::new()));

        Self {
            name: slug.clone(),
            slug,
            module,
            action,
        }
    }
}

/// A role-permission row as stored, with the raw condition payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissionRow {
    pub role_id: RoleId,
    pub permission_id: PermissionId,
    /// JSON text, `None` for an unconditional grant
    pub conditions: Option<String>,
}

/// A permission granted to a role, as handed to the administration surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub permission_id: PermissionId,
    pub conditions: Option<ConditionSet>,
}

impl PermissionGrant {
    pub fn unconditional(permission_id: PermissionId) -> Self {
        Self {
            permission_id,
            conditions: None,
        }
    }

    pub fn conditional(permission_id: PermissionId, conditions: ConditionSet) -> Self {
        Self {
            permission_id,
            conditions: if conditions.is_empty() {
                None
            } else {
                Some(conditions)
            },
        }
    }

    /// Decode a grant received as JSON, validating the payload
    pub fn from_json(
        permission_id: PermissionId,
        conditions: Option<&serde_json::Value>,
    ) -> crate::utils::error::Result<Self> {
        match conditions {
            None | Some(serde_json::Value::Null) => Ok(Self::unconditional(permission_id)),
            Some(value) => Ok(Self::conditional(
                permission_id,
                ConditionSet::from_value(value.clone())?,
            )),
        }
    }
}

/// Permission of a role together with its decoded grant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePermissionView {
    pub permission: Permission,
    pub grant: Grant,
}

/// User-role assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_by: Option<UserId>,
    pub assigned_at: DateTime<Utc>,
}

impl UserRole {
    /// Active iff it never expires or expires in the future
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// An active role of a user together with the expiry of the assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedRole {
    pub role: Role,
    pub expires_at: Option<DateTime<Utc>>,
}

/// The active roles of one user, as cached
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleSet {
    pub roles: Vec<AssignedRole>,
}

impl UserRoleSet {
    pub fn new(roles: Vec<AssignedRole>) -> Self {
        Self { roles }
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn contains_slug(&self, slug: &str) -> bool {
        self.roles.iter().any(|assigned| assigned.role.slug == slug)
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter().map(|assigned| &assigned.role)
    }

    /// Earliest instant at which one of the assignments lapses
    pub fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.roles.iter().filter_map(|assigned| assigned.expires_at).min()
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.valid_until().is_none_or(|until| until > now)
    }
}

/// Per-category permission flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFlags {
    pub can_view: bool,
    pub can_create: bool,
    pub can_reply: bool,
    pub can_moderate: bool,
}

impl Default for CategoryFlags {
    /// Applies when a role has no row for the category
    fn default() -> Self {
        Self {
            can_view: true,
            can_create: true,
            can_reply: true,
            can_moderate: false,
        }
    }
}

impl CategoryFlags {
    pub fn allows(&self, action: CategoryAction) -> bool {
        match action {
            CategoryAction::View => self.can_view,
            CategoryAction::Create => self.can_create,
            CategoryAction::Reply => self.can_reply,
            CategoryAction::Moderate => self.can_moderate,
        }
    }
}

/// Category permission row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPermission {
    pub role_id: RoleId,
    pub category_id: CategoryId,
    #[serde(flatten)]
    pub flags: CategoryFlags,
}

/// Action checked against the category matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryAction {
    View,
    Create,
    Reply,
    Moderate,
}

impl CategoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Reply => "reply",
            Self::Moderate => "moderate",
        }
    }
}

impl fmt::Display for CategoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(Self::View),
            "create" => Ok(Self::Create),
            "reply" => Ok(Self::Reply),
            "moderate" => Ok(Self::Moderate),
            other => Err(format!("unknown category action '{}'", other)),
        }
    }
}

/// The effective grant of one permission slug for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPermission {
    pub slug: String,
    pub grant: Grant,
    pub source_role_id: RoleId,
    pub source_priority: i32,
}

/// Resolved permission set of a user, keyed by slug
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPermissionSet {
    pub entries: HashMap<String, ResolvedPermission>,
    /// Earliest expiry among the assignments the set was built from
    pub valid_until: Option<DateTime<Utc>>,
}

impl ResolvedPermissionSet {
    pub fn get(&self, slug: &str) -> Option<&ResolvedPermission> {
        self.entries.get(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.entries.contains_key(slug)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted slugs
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        slugs.sort_unstable();
        slugs
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_none_or(|until| until > now)
    }
}

/// Two roles of equal priority grant the same permission with different conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionConflict {
    pub slug: String,
    pub priority: i32,
    pub kept_role_id: RoleId,
    pub discarded_role_id: RoleId,
}

/// Permission check result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCheck {
    /// Whether permission is granted
    pub granted: bool,
    /// Role whose grant decided the check
    pub source_role_id: Option<RoleId>,
    /// Reason for denial (if not granted)
    pub denial_reason: Option<String>,
}

impl PermissionCheck {
    pub fn granted(source_role_id: Option<RoleId>) -> Self {
        Self {
            granted: true,
            source_role_id,
            denial_reason: None,
        }
    }

    pub fn denied(source_role_id: Option<RoleId>, reason: impl Into<String>) -> Self {
        Self {
            granted: false,
            source_role_id,
            denial_reason: Some(reason.into()),
        }
    }
}
