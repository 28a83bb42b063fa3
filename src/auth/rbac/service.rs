//! Authorization service, the entry point of request handling code

use super::aggregator::PermissionAggregator;
use super::conditions::Grant;
use super::context::PermissionContext;
use super::evaluator::ConditionEvaluator;
use super::rate_limit::{QuotaResult, RateLimitResult, RateLimiter, check_daily_quota};
use super::types::{
    CategoryAction, CategoryFlags, CategoryId, PermissionCheck, ResolvedPermission,
    ResolvedPermissionSet, UserId, UserRoleSet,
};
use crate::config::{AuthzConfig, CacheBackend, Config};
use crate::core::cache_manager::{MemoryCacheStore, PermissionCache, keys};
use crate::storage::{RoleStore, StorageLayer};
use crate::utils::error::Result;
use chrono::{DateTime, FixedOffset, Local, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decides whether a user may perform an action.
///
/// Built explicitly and shared by handle; clones share the store and the cache.
#[derive(Clone)]
pub struct AuthorizationService {
    pub(super) store: Arc<dyn RoleStore>,
    pub(super) cache: PermissionCache,
    pub(super) aggregator: PermissionAggregator,
    evaluator: ConditionEvaluator,
    rate_limiter: RateLimiter,
    pub(super) config: Arc<AuthzConfig>,
}

impl std::fmt::Debug for AuthorizationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationService")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}

impl AuthorizationService {
    pub fn new(store: Arc<dyn RoleStore>, cache: PermissionCache, config: AuthzConfig) -> Self {
        Self {
            aggregator: PermissionAggregator::new(store.clone(), config.tie_break),
            evaluator: ConditionEvaluator::new(config.missing_context),
            rate_limiter: RateLimiter::new(cache.clone(), config.rate_limit_backend_unavailable),
            store,
            cache,
            config: Arc::new(config),
        }
    }

    /// Open storage, run migrations and select the cache backend
    pub async fn from_config(config: &Config) -> Result<Self> {
        info!("Initializing authorization service");

        let storage = StorageLayer::new(&config.storage).await?;
        storage.migrate().await?;

        let cache = Self::cache_from_config(config, &storage);
        let store: Arc<dyn RoleStore> = storage.database.clone();

        info!(
            "Authorization service ready (cache: {})",
            cache.backend_name().unwrap_or("disabled")
        );
        Ok(Self::new(store, cache, config.authz.clone()))
    }

    fn cache_from_config(config: &Config, storage: &StorageLayer) -> PermissionCache {
        if !config.cache.enabled {
            return PermissionCache::disabled();
        }

        let ttl = config.cache.ttl_duration();
        if config.cache.backend == CacheBackend::Redis {
            #[cfg(feature = "redis")]
            {
                if let Some(pool) = &storage.redis {
                    return PermissionCache::new(pool.clone(), ttl);
                }
            }
            warn!("Redis cache backend unavailable, falling back to the memory backend");
        }

        let _ = storage;
        PermissionCache::new(Arc::new(MemoryCacheStore::new(config.cache.max_entries)), ttl)
    }

    pub fn store(&self) -> &Arc<dyn RoleStore> {
        &self.store
    }

    pub fn cache(&self) -> &PermissionCache {
        &self.cache
    }

    pub fn config(&self) -> &AuthzConfig {
        &self.config
    }

    /// Active roles of a user, read through the cache
    pub async fn get_user_roles(&self, user_id: UserId) -> Result<UserRoleSet> {
        self.cache
            .remember_while(
                &keys::user_roles(user_id),
                |roles: &UserRoleSet| roles.is_fresh(Utc::now()),
                || async {
                    let roles = self.store.fetch_roles_for_user(user_id, Utc::now()).await?;
                    Ok(UserRoleSet::new(roles))
                },
            )
            .await
    }

    /// Resolved permission set of a user, read through the cache
    pub async fn get_user_permissions(&self, user_id: UserId) -> Result<ResolvedPermissionSet> {
        self.cache
            .remember_while(
                &keys::user_permissions(user_id),
                |permissions: &ResolvedPermissionSet| permissions.is_fresh(Utc::now()),
                || async {
                    let roles = self.get_user_roles(user_id).await?;
                    Ok(self.aggregator.resolve(&roles).await?.permissions)
                },
            )
            .await
    }

    /// Drop the cached roles and permissions of a user
    pub async fn clear_user_permission_cache(&self, user_id: UserId) {
        self.cache.clear_user(user_id).await;
    }

    pub async fn has_role(&self, user_id: UserId, slug: &str) -> Result<bool> {
        Ok(self.get_user_roles(user_id).await?.contains_slug(slug))
    }

    pub async fn has_any_role(&self, user_id: UserId, slugs: &[&str]) -> Result<bool> {
        let roles = self.get_user_roles(user_id).await?;
        Ok(slugs.iter().any(|slug| roles.contains_slug(slug)))
    }

    pub async fn is_admin(&self, user_id: UserId) -> Result<bool> {
        self.has_role(user_id, &self.config.admin_role).await
    }

    pub async fn has_permission(
        &self,
        user_id: UserId,
        slug: &str,
        ctx: &PermissionContext,
    ) -> Result<bool> {
        Ok(self.can(user_id, slug, ctx).await?.granted)
    }

    /// Permission check with the deciding role and the denial reason
    pub async fn can(
        &self,
        user_id: UserId,
        slug: &str,
        ctx: &PermissionContext,
    ) -> Result<PermissionCheck> {
        self.can_at(user_id, slug, ctx, Local::now().fixed_offset())
            .await
    }

    /// [`can`](Self::can) with an explicit local wall-clock time
    pub async fn can_at(
        &self,
        user_id: UserId,
        slug: &str,
        ctx: &PermissionContext,
        now: DateTime<FixedOffset>,
    ) -> Result<PermissionCheck> {
        if self.is_admin(user_id).await? {
            debug!("Admin bypass for user {} on {}", user_id, slug);
            return Ok(PermissionCheck::granted(None));
        }

        let permissions = self.get_user_permissions(user_id).await?;
        let check = self.check_entry(user_id, permissions.get(slug), ctx, now);
        debug!(
            "Permission {} for user {}: granted={}",
            slug, user_id, check.granted
        );
        Ok(check)
    }

    /// Any of the permissions, checked without context
    pub async fn has_any_permission(&self, user_id: UserId, slugs: &[&str]) -> Result<bool> {
        if self.is_admin(user_id).await? {
            return Ok(true);
        }

        let permissions = self.get_user_permissions(user_id).await?;
        let ctx = PermissionContext::default();
        let now = Local::now().fixed_offset();
        Ok(slugs.iter().any(|slug| {
            self.check_entry(user_id, permissions.get(slug), &ctx, now)
                .granted
        }))
    }

    /// All of the permissions, checked without context
    pub async fn has_all_permissions(&self, user_id: UserId, slugs: &[&str]) -> Result<bool> {
        if self.is_admin(user_id).await? {
            return Ok(true);
        }

        let permissions = self.get_user_permissions(user_id).await?;
        let ctx = PermissionContext::default();
        let now = Local::now().fixed_offset();
        Ok(slugs.iter().all(|slug| {
            self.check_entry(user_id, permissions.get(slug), &ctx, now)
                .granted
        }))
    }

    fn check_entry(
        &self,
        user_id: UserId,
        entry: Option<&ResolvedPermission>,
        ctx: &PermissionContext,
        now: DateTime<FixedOffset>,
    ) -> PermissionCheck {
        let Some(entry) = entry else {
            return PermissionCheck::denied(None, "permission not granted");
        };
        let source = Some(entry.source_role_id);

        match &entry.grant {
            Grant::Unconditional => PermissionCheck::granted(source),
            Grant::Conditional { conditions } => {
                match self
                    .evaluator
                    .first_failure_at(conditions, user_id, ctx, now)
                {
                    None => PermissionCheck::granted(source),
                    Some(condition) => PermissionCheck::denied(
                        source,
                        format!("condition '{}' not satisfied", condition),
                    ),
                }
            }
            Grant::Unverifiable { reason } => PermissionCheck::denied(
                source,
                format!("conditions cannot be verified: {}", reason),
            ),
        }
    }

    /// Count one `action_key` call against the `rateLimit` of the permission
    pub async fn check_rate_limit(
        &self,
        user_id: UserId,
        slug: &str,
        action_key: &str,
    ) -> Result<RateLimitResult> {
        if self.is_admin(user_id).await? {
            return Ok(RateLimitResult::unlimited());
        }

        let permissions = self.get_user_permissions(user_id).await?;
        let Some(entry) = permissions.get(slug) else {
            return Ok(RateLimitResult::unlimited());
        };

        match &entry.grant {
            Grant::Unverifiable { .. } => Ok(RateLimitResult::denied(None)),
            grant => match grant.conditions().and_then(|c| c.rate_limit()) {
                Some(rule) => Ok(self.rate_limiter.check(user_id, action_key, rule).await),
                None => Ok(RateLimitResult::unlimited()),
            },
        }
    }

    /// Compare today's upload count with the `maxFilesPerDay` of the permission
    pub async fn check_daily_upload_limit(
        &self,
        user_id: UserId,
        slug: &str,
        current_day_count: u32,
    ) -> Result<QuotaResult> {
        if self.is_admin(user_id).await? {
            return Ok(check_daily_quota(None, current_day_count));
        }

        let permissions = self.get_user_permissions(user_id).await?;
        match permissions.get(slug).map(|entry| &entry.grant) {
            Some(Grant::Unverifiable { .. }) => Ok(QuotaResult {
                allowed: false,
                limit: None,
                remaining: Some(0),
            }),
            Some(grant) => Ok(check_daily_quota(
                grant.conditions().and_then(|c| c.max_files_per_day()),
                current_day_count,
            )),
            None => Ok(check_daily_quota(None, current_day_count)),
        }
    }

    /// Whether any role of the user, inherited ones included, allows the
    /// action in the category. Roles without a row use the default flags.
    pub async fn check_category_permission(
        &self,
        user_id: UserId,
        category_id: CategoryId,
        action: CategoryAction,
    ) -> Result<bool> {
        let roles = self.get_user_roles(user_id).await?;
        if roles.contains_slug(&self.config.admin_role) {
            return Ok(true);
        }
        if roles.is_empty() {
            return Ok(CategoryFlags::default().allows(action));
        }

        let direct: Vec<_> = roles.roles().cloned().collect();
        for role in self.aggregator.inheritance().expand(&direct).await? {
            let flags = self
                .store
                .fetch_category_permissions(role.id, category_id)
                .await?
                .unwrap_or_default();
            if flags.allows(action) {
                return Ok(true);
            }
        }

        debug!(
            "Category {} denies {} to user {}",
            category_id, action, user_id
        );
        Ok(false)
    }
}
