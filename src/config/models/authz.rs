//! Authorization policy configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a condition does when the caller did not supply the context field it needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingContextPolicy {
    /// The condition is only enforced when the context is supplied
    #[default]
    Pass,
    /// Missing context fails the condition
    Deny,
}

/// What rate limiting does when no counter backend can be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheUnavailablePolicy {
    #[default]
    FailOpen,
    FailClosed,
}

/// How two conditional grants of equal role priority are settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakPolicy {
    /// The grant from the role with the lowest id wins
    #[default]
    LowestRoleId,
    /// The grant seen first is kept
    FirstSeen,
}

macro_rules! impl_policy_from_str {
    ($ty:ty, $($text:literal => $variant:expr),+ $(,)?) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
                    $($text => Ok($variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($ty), other)),
                }
            }
        }
    };
}

impl_policy_from_str!(
    MissingContextPolicy,
    "pass" => MissingContextPolicy::Pass,
    "deny" => MissingContextPolicy::Deny,
);
impl_policy_from_str!(
    CacheUnavailablePolicy,
    "fail_open" => CacheUnavailablePolicy::FailOpen,
    "fail_closed" => CacheUnavailablePolicy::FailClosed,
);
impl_policy_from_str!(
    TieBreakPolicy,
    "lowest_role_id" => TieBreakPolicy::LowestRoleId,
    "first_seen" => TieBreakPolicy::FirstSeen,
);

/// Authorization engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthzConfig {
    /// Role slug that bypasses every permission check
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
    /// Role slug accepted by moderator guards
    #[serde(default = "default_moderator_role")]
    pub moderator_role: String,
    #[serde(default)]
    pub missing_context: MissingContextPolicy,
    #[serde(default)]
    pub rate_limit_backend_unavailable: CacheUnavailablePolicy,
    #[serde(default)]
    pub tie_break: TieBreakPolicy,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            admin_role: default_admin_role(),
            moderator_role: default_moderator_role(),
            missing_context: MissingContextPolicy::default(),
            rate_limit_backend_unavailable: CacheUnavailablePolicy::default(),
            tie_break: TieBreakPolicy::default(),
        }
    }
}
