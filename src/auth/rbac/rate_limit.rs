//! Counter-based conditions: per-action rate limits and daily upload quotas

use super::conditions::RateLimitRule;
use super::types::UserId;
use crate::config::CacheUnavailablePolicy;
use crate::core::cache_manager::{PermissionCache, keys};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitResult {
    /// Whether the action is allowed
    pub allowed: bool,
    /// Calls left in the current window, when a limit applies
    pub remaining: Option<u32>,
    /// Upper bound of when the window ends (only set when not allowed)
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitResult {
    pub fn unlimited() -> Self {
        Self {
            allowed: true,
            remaining: None,
            reset_at: None,
        }
    }

    pub fn denied(reset_at: Option<DateTime<Utc>>) -> Self {
        Self {
            allowed: false,
            remaining: Some(0),
            reset_at,
        }
    }
}

/// Result of a daily quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaResult {
    pub allowed: bool,
    /// Configured maximum, `None` when no quota applies
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
}

/// Fixed-window counter over the cache backend's atomic increment
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cache: PermissionCache,
    fallback: CacheUnavailablePolicy,
}

impl RateLimiter {
    pub fn new(cache: PermissionCache, fallback: CacheUnavailablePolicy) -> Self {
        Self { cache, fallback }
    }

    /// Count one call of `action_key` by `user_id` against `rule`.
    ///
    /// The window starts at the first counted call and lasts one period. A
    /// denied result reports `now + period` as `reset_at`.
    pub async fn check(
        &self,
        user_id: UserId,
        action_key: &str,
        rule: RateLimitRule,
    ) -> RateLimitResult {
        let key = keys::rate_limit(user_id, action_key);
        let period = rule.period.as_secs();
        let now = Utc::now();

        match self.cache.increment(&key, Duration::from_secs(period)).await {
            Ok(Some(count)) if count <= u64::from(rule.count) => {
                let remaining = rule.count - count as u32;
                debug!("Rate limit {} at {}/{}", key, count, rule.count);
                RateLimitResult {
                    allowed: true,
                    remaining: Some(remaining),
                    reset_at: None,
                }
            }
            Ok(Some(count)) => {
                debug!("Rate limit {} exceeded ({}/{})", key, count, rule.count);
                RateLimitResult::denied(Some(window_end(now, period)))
            }
            Ok(None) => self.degraded(&key, now, period, "no cache backend"),
            Err(e) => self.degraded(&key, now, period, &e.to_string()),
        }
    }

    fn degraded(
        &self,
        key: &str,
        now: DateTime<Utc>,
        period: u64,
        reason: &str,
    ) -> RateLimitResult {
        match self.fallback {
            CacheUnavailablePolicy::FailOpen => {
                warn!("Rate limit {} not enforced: {}", key, reason);
                RateLimitResult::unlimited()
            }
            CacheUnavailablePolicy::FailClosed => {
                warn!("Rate limit {} denied without a counter: {}", key, reason);
                RateLimitResult::denied(Some(window_end(now, period)))
            }
        }
    }
}

fn window_end(now: DateTime<Utc>, period_secs: u64) -> DateTime<Utc> {
    now + ChronoDuration::seconds(period_secs as i64)
}

/// Compare an already computed count of today's uploads with the quota
pub fn check_daily_quota(max_files_per_day: Option<u32>, current_day_count: u32) -> QuotaResult {
    match max_files_per_day {
        Some(max) => QuotaResult {
            allowed: current_day_count < max,
            limit: Some(max),
            remaining: Some(max.saturating_sub(current_day_count)),
        },
        None => QuotaResult {
            allowed: true,
            limit: None,
            remaining: None,
        },
    }
}
