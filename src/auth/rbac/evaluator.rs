//! Condition evaluation against a runtime context

use super::conditions::{Condition, ConditionSet, normalize_file_type};
use super::context::PermissionContext;
use super::types::UserId;
use crate::config::MissingContextPolicy;
use chrono::{DateTime, FixedOffset, Local, Utc};

/// Decides whether a conditional grant applies to a request
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionEvaluator {
    missing_context: MissingContextPolicy,
}

impl ConditionEvaluator {
    pub fn new(missing_context: MissingContextPolicy) -> Self {
        Self { missing_context }
    }

    /// All conditions hold at the current local time
    pub fn satisfies(
        &self,
        conditions: &ConditionSet,
        user_id: UserId,
        ctx: &PermissionContext,
    ) -> bool {
        self.satisfies_at(conditions, user_id, ctx, Local::now().fixed_offset())
    }

    pub fn satisfies_at(
        &self,
        conditions: &ConditionSet,
        user_id: UserId,
        ctx: &PermissionContext,
        now: DateTime<FixedOffset>,
    ) -> bool {
        self.first_failure_at(conditions, user_id, ctx, now).is_none()
    }

    /// The first condition that does not hold, if any
    pub fn first_failure_at<'a>(
        &self,
        conditions: &'a ConditionSet,
        user_id: UserId,
        ctx: &PermissionContext,
        now: DateTime<FixedOffset>,
    ) -> Option<&'a Condition> {
        conditions
            .iter()
            .find(|condition| !self.check(condition, user_id, ctx, now))
    }

    fn check(
        &self,
        condition: &Condition,
        user_id: UserId,
        ctx: &PermissionContext,
        now: DateTime<FixedOffset>,
    ) -> bool {
        match condition {
            Condition::Own => self.with(ctx.owner_id, |owner| owner == user_id),
            Condition::Categories(ids) => self.with(ctx.category_id, |id| ids.contains(&id)),
            Condition::MinPosts(min) => self.with(ctx.user_post_count, |count| count >= *min),
            Condition::AccountAge(days) => self.with(ctx.user_created_at, |created| {
                (now.with_timezone(&Utc) - created).num_days() >= *days
            }),
            Condition::TimeRange(window) => window.contains(&now.format("%H:%M").to_string()),
            Condition::MaxFileSize(max_kb) => self.with(ctx.file_size, |bytes| {
                bytes as f64 / 1024.0 <= *max_kb as f64
            }),
            Condition::AllowedFileTypes(allowed) => {
                self.with(ctx.file_type.as_deref(), |file_type| {
                    let file_type = normalize_file_type(file_type);
                    allowed
                        .iter()
                        .any(|entry| normalize_file_type(entry) == file_type)
                })
            }
            // Counter based, enforced by the rate limiter and the daily quota
            Condition::RateLimit(_) | Condition::MaxFilesPerDay(_) => true,
        }
    }

    fn with<T>(&self, value: Option<T>, predicate: impl FnOnce(T) -> bool) -> bool {
        match value {
            Some(value) => predicate(value),
            None => self.missing_context == MissingContextPolicy::Pass,
        }
    }
}
