//! Typed condition payloads attached to role permissions
//!
//! Payloads are stored as JSON objects with camelCase keys, e.g.
//! `{"own": true, "minPosts": 10}`. They are decoded once into a
//! [`ConditionSet`] and every key present becomes one [`Condition`];
//! a set is satisfied only when all of its conditions hold.

use super::types::CategoryId;
use crate::utils::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Counting window of a rate limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatePeriod {
    Minute,
    Hour,
    Day,
}

impl RatePeriod {
    pub fn as_secs(&self) -> u64 {
        match self {
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
        }
    }
}

/// `rateLimit` payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRule {
    pub count: u32,
    pub period: RatePeriod,
}

/// `timeRange` payload, inclusive `HH:MM` bounds within one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// `hh_mm` must already be formatted as `HH:MM`
    pub fn contains(&self, hh_mm: &str) -> bool {
        self.start.as_str() <= hh_mm && hh_mm <= self.end.as_str()
    }

    fn validate(&self) -> Result<()> {
        for bound in [&self.start, &self.end] {
            if !is_clock_time(bound) {
                return Err(AuthzError::invalid_conditions(format!(
                    "timeRange bound '{}' is not a HH:MM time",
                    bound
                )));
            }
        }
        if self.start > self.end {
            return Err(AuthzError::invalid_conditions(format!(
                "timeRange {}-{} crosses midnight",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

fn is_clock_time(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = |s: &str| {
        s.bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| s.parse::<u8>().ok())
            .flatten()
    };
    match (digits(&value[..2]), digits(&value[3..])) {
        (Some(hour), Some(minute)) => hour < 24 && minute < 60,
        _ => false,
    }
}

/// One predicate narrowing when a granted permission applies
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The acting user must own the resource
    Own,
    /// The resource must live in one of these categories
    Categories(Vec<CategoryId>),
    /// Minimum number of posts written by the user
    MinPosts(u64),
    /// Minimum account age in whole days
    AccountAge(i64),
    /// Local wall-clock window
    TimeRange(TimeWindow),
    /// Maximum upload size in KB
    MaxFileSize(u64),
    /// Allowed upload extensions
    AllowedFileTypes(Vec<String>),
    /// Checked by the rate limiter, not by the evaluator
    RateLimit(RateLimitRule),
    /// Checked by the daily quota, not by the evaluator
    MaxFilesPerDay(u32),
}

impl Condition {
    /// Payload key the condition is stored under
    pub fn key(&self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::Categories(_) => "categories",
            Self::MinPosts(_) => "minPosts",
            Self::AccountAge(_) => "accountAge",
            Self::TimeRange(_) => "timeRange",
            Self::MaxFileSize(_) => "maxFileSize",
            Self::AllowedFileTypes(_) => "allowedFileTypes",
            Self::RateLimit(_) => "rateLimit",
            Self::MaxFilesPerDay(_) => "maxFilesPerDay",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Wire shape of a condition payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    own: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    categories: Option<Vec<CategoryId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_posts: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account_age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_range: Option<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allowed_file_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rate_limit: Option<RateLimitRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_files_per_day: Option<u32>,
}

/// Validated conditions of one grant, in payload key order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConditions", into = "RawConditions")]
pub struct ConditionSet {
    conditions: Vec<Condition>,
}

impl TryFrom<RawConditions> for ConditionSet {
    type Error = AuthzError;

    fn try_from(raw: RawConditions) -> Result<Self> {
        let mut conditions = Vec::new();

        if raw.own == Some(true) {
            conditions.push(Condition::Own);
        }
        if let Some(categories) = raw.categories {
            conditions.push(Condition::Categories(categories));
        }
        if let Some(min_posts) = raw.min_posts {
            conditions.push(Condition::MinPosts(min_posts));
        }
        if let Some(days) = raw.account_age {
            if days < 0 {
                return Err(AuthzError::invalid_conditions(
                    "accountAge must not be negative",
                ));
            }
            conditions.push(Condition::AccountAge(days));
        }
        if let Some(window) = raw.time_range {
            window.validate()?;
            conditions.push(Condition::TimeRange(window));
        }
        if let Some(max_kb) = raw.max_file_size {
            conditions.push(Condition::MaxFileSize(max_kb));
        }
        if let Some(types) = raw.allowed_file_types {
            if types.iter().any(|t| normalize_file_type(t).is_empty()) {
                return Err(AuthzError::invalid_conditions(
                    "allowedFileTypes contains an empty entry",
                ));
            }
            conditions.push(Condition::AllowedFileTypes(types));
        }
        if let Some(rule) = raw.rate_limit {
            if rule.count == 0 {
                return Err(AuthzError::invalid_conditions(
                    "rateLimit.count must be at least 1",
                ));
            }
            conditions.push(Condition::RateLimit(rule));
        }
        if let Some(max_files) = raw.max_files_per_day {
            conditions.push(Condition::MaxFilesPerDay(max_files));
        }

        Ok(Self { conditions })
    }
}

impl From<ConditionSet> for RawConditions {
    fn from(set: ConditionSet) -> Self {
        let mut raw = RawConditions::default();
        for condition in set.conditions {
            match condition {
                Condition::Own => raw.own = Some(true),
                Condition::Categories(ids) => raw.categories = Some(ids),
                Condition::MinPosts(n) => raw.min_posts = Some(n),
                Condition::AccountAge(days) => raw.account_age = Some(days),
                Condition::TimeRange(window) => raw.time_range = Some(window),
                Condition::MaxFileSize(kb) => raw.max_file_size = Some(kb),
                Condition::AllowedFileTypes(types) => raw.allowed_file_types = Some(types),
                Condition::RateLimit(rule) => raw.rate_limit = Some(rule),
                Condition::MaxFilesPerDay(n) => raw.max_files_per_day = Some(n),
            }
        }
        raw
    }
}

impl ConditionSet {
    /// Build a set from individual conditions, validating them like a stored payload
    pub fn from_conditions(conditions: impl IntoIterator<Item = Condition>) -> Result<Self> {
        let mut raw = RawConditions::default();
        for condition in conditions {
            let key = condition.key();
            let duplicate = match condition {
                Condition::Own => raw.own.replace(true).is_some(),
                Condition::Categories(ids) => raw.categories.replace(ids).is_some(),
                Condition::MinPosts(n) => raw.min_posts.replace(n).is_some(),
                Condition::AccountAge(days) => raw.account_age.replace(days).is_some(),
                Condition::TimeRange(window) => raw.time_range.replace(window).is_some(),
                Condition::MaxFileSize(kb) => raw.max_file_size.replace(kb).is_some(),
                Condition::AllowedFileTypes(types) => raw.allowed_file_types.replace(types).is_some(),
                Condition::RateLimit(rule) => raw.rate_limit.replace(rule).is_some(),
                Condition::MaxFilesPerDay(n) => raw.max_files_per_day.replace(n).is_some(),
            };
            if duplicate {
                return Err(AuthzError::invalid_conditions(format!(
                    "condition '{}' given twice",
                    key
                )));
            }
        }
        Self::try_from(raw)
    }

    /// Decode and validate a JSON payload
    pub fn parse(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).map_err(|e| AuthzError::invalid_conditions(e.to_string()))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| AuthzError::invalid_conditions(e.to_string()))
    }

    /// JSON text as persisted in the role store
    pub fn to_payload(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.conditions.iter()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn rate_limit(&self) -> Option<RateLimitRule> {
        self.iter().find_map(|c| match c {
            Condition::RateLimit(rule) => Some(*rule),
            _ => None,
        })
    }

    pub fn max_files_per_day(&self) -> Option<u32> {
        self.iter().find_map(|c| match c {
            Condition::MaxFilesPerDay(n) => Some(*n),
            _ => None,
        })
    }
}

impl<'a> IntoIterator for &'a ConditionSet {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Effective form of a granted permission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Grant {
    Unconditional,
    Conditional { conditions: ConditionSet },
    /// The stored payload could not be decoded; never satisfied
    Unverifiable { reason: String },
}

impl Grant {
    /// A present payload stays conditional even when it decodes to no
    /// restriction, so it never outranks a conditional grant in the merge.
    pub fn conditional(conditions: ConditionSet) -> Self {
        Self::Conditional { conditions }
    }

    /// Decode a stored payload. Never fails: a payload that cannot be
    /// decoded yields [`Grant::Unverifiable`]. Only an absent payload is
    /// unconditional.
    pub fn from_payload(payload: Option<&str>) -> Self {
        let Some(text) = payload.map(str::trim).filter(|t| !t.is_empty() && *t != "null") else {
            return Self::Unconditional;
        };

        match ConditionSet::parse(text) {
            Ok(set) => Self::conditional(set),
            Err(e) => {
                warn!("Unverifiable permission conditions {:?}: {}", text, e);
                Self::Unverifiable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_unconditional(&self) -> bool {
        matches!(self, Self::Unconditional)
    }

    pub fn conditions(&self) -> Option<&ConditionSet> {
        match self {
            Self::Conditional { conditions } => Some(conditions),
            _ => None,
        }
    }
}

/// Lower-case extension of a file type given as `png`, `.PNG` or `photo.png`
pub fn normalize_file_type(value: &str) -> String {
    let value = value.trim();
    let ext = value.rsplit_once('.').map_or(value, |(_, ext)| ext);
    ext.to_ascii_lowercase()
}
