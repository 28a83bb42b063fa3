//! Runtime context supplied with a permission check

use super::types::{CategoryId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Facts about the resource and the acting user that conditions are checked against.
/// Every field is optional; what a condition does without its field is governed by
/// [`MissingContextPolicy`](crate::config::MissingContextPolicy).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionContext {
    /// Owner of the resource being acted on
    pub owner_id: Option<UserId>,
    pub category_id: Option<CategoryId>,
    pub user_post_count: Option<u64>,
    pub user_created_at: Option<DateTime<Utc>>,
    /// Upload size in bytes
    pub file_size: Option<u64>,
    /// Extension or file name of the upload
    pub file_type: Option<String>,
}

impl PermissionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owner(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_post_count(mut self, count: u64) -> Self {
        self.user_post_count = Some(count);
        self
    }

    pub fn with_account_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.user_created_at = Some(created_at);
        self
    }

    pub fn with_file(mut self, size_bytes: u64, file_type: impl Into<String>) -> Self {
        self.file_size = Some(size_bytes);
        self.file_type = Some(file_type.into());
        self
    }
}
