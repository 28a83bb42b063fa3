//! Read-through permission cache
//!
//! Wraps an optional [`CacheStore`]. The cache is an optimization, never a
//! dependency: a missing or failing backend degrades every read to a direct
//! computation and every invalidation to a logged no-op.

use super::types::{AtomicCacheStats, CacheStats, keys};
use crate::auth::rbac::types::UserId;
use crate::core::traits::CacheStore;
use crate::utils::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache of per-user role and permission sets
#[derive(Clone)]
pub struct PermissionCache {
    backend: Option<Arc<dyn CacheStore>>,
    ttl: Duration,
    stats: Arc<AtomicCacheStats>,
}

impl std::fmt::Debug for PermissionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionCache")
            .field("backend", &self.backend_name())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl PermissionCache {
    pub fn new(backend: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            backend: Some(backend),
            ttl,
            stats: Arc::new(AtomicCacheStats::default()),
        }
    }

    /// No backend: every lookup computes directly and rate limiting applies its fallback policy
    pub fn disabled() -> Self {
        Self {
            backend: None,
            ttl: Duration::ZERO,
            stats: Arc::new(AtomicCacheStats::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_name(&self) -> Option<&'static str> {
        self.backend.as_ref().map(|backend| backend.backend_name())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get cache statistics (lock-free snapshot)
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Return the cached value under `key`, or compute and store it
    pub async fn remember<T, F, Fut>(&self, key: &str, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.remember_while(key, |_| true, compute).await
    }

    /// Like [`remember`](Self::remember), but a cached value failing
    /// `is_fresh` counts as a miss and only fresh values are stored.
    pub async fn remember_while<T, P, F, Fut>(&self, key: &str, is_fresh: P, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        P: Fn(&T) -> bool,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let Some(backend) = &self.backend else {
            return compute().await;
        };

        match backend.get(key).await {
            Ok(Some(text)) => match serde_json::from_str::<T>(&text) {
                Ok(value) if is_fresh(&value) => {
                    AtomicCacheStats::record(&self.stats.hits);
                    debug!("Cache hit for key: {}", key);
                    return Ok(value);
                }
                Ok(_) => {
                    AtomicCacheStats::record(&self.stats.stale);
                    debug!("Cached value for key {} has lapsed", key);
                }
                Err(e) => {
                    AtomicCacheStats::record(&self.stats.misses);
                    warn!("Discarding undecodable cache entry {}: {}", key, e);
                }
            },
            Ok(None) => {
                AtomicCacheStats::record(&self.stats.misses);
                debug!("Cache miss for key: {}", key);
            }
            Err(e) => {
                AtomicCacheStats::record(&self.stats.errors);
                warn!(
                    "Cache backend {} unavailable, computing {} directly: {}",
                    backend.backend_name(),
                    key,
                    e
                );
                return compute().await;
            }
        }

        let value = compute().await?;

        if is_fresh(&value) {
            match serde_json::to_string(&value) {
                Ok(text) => {
                    if let Err(e) = backend.set(key, text, self.ttl).await {
                        AtomicCacheStats::record(&self.stats.errors);
                        warn!("Failed to store cache entry {}: {}", key, e);
                    }
                }
                Err(e) => warn!("Failed to encode cache entry {}: {}", key, e),
            }
        }

        Ok(value)
    }

    /// Drop the cached roles and permissions of a user
    pub async fn clear_user(&self, user_id: UserId) {
        self.clear_users(&[user_id]).await;
    }

    pub async fn clear_users(&self, user_ids: &[UserId]) {
        let Some(backend) = &self.backend else {
            return;
        };
        if user_ids.is_empty() {
            return;
        }

        let keys: Vec<String> = user_ids.iter().flat_map(|id| keys::for_user(*id)).collect();
        match backend.invalidate(&keys).await {
            Ok(()) => {
                self.stats
                    .invalidations
                    .fetch_add(user_ids.len() as u64, Ordering::Relaxed);
                debug!("Invalidated permission cache of {} user(s)", user_ids.len());
            }
            Err(e) => {
                AtomicCacheStats::record(&self.stats.errors);
                warn!(
                    "Failed to invalidate permission cache of users {:?}: {}",
                    user_ids, e
                );
            }
        }
    }

    /// Atomic counter increment. `Ok(None)` when there is no backend.
    pub async fn increment(&self, key: &str, ttl: Duration) -> Result<Option<u64>> {
        match &self.backend {
            Some(backend) => backend.increment(key, ttl).await.map(Some),
            None => Ok(None),
        }
    }
}
