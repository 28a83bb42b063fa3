//! In-process cache backend

use super::types::CacheEntry;
use crate::core::traits::CacheStore;
use crate::utils::error::{AuthzError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// `dashmap` backed [`CacheStore`] with per-entry expiry and a size bound.
///
/// Counters live apart from cached values and only leave when their window
/// lapses; the size bound applies to cached values alone.
#[derive(Debug, Clone)]
pub struct MemoryCacheStore {
    entries: Arc<DashMap<String, CacheEntry<String>>>,
    counters: Arc<DashMap<String, CacheEntry<u64>>>,
    max_entries: usize,
    evictions: Arc<AtomicU64>,
}

impl MemoryCacheStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            counters: Arc::new(DashMap::new()),
            max_entries: max_entries.max(1),
            evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Cached values and counters
    pub fn len(&self) -> usize {
        self.entries.len() + self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.counters.is_empty()
    }

    /// Drop every expired value and counter, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let before = self.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        self.counters.retain(|_, entry| !entry.is_expired());
        before.saturating_sub(self.len())
    }

    /// Number of live entries evicted to respect the size bound
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    fn make_room(&self, key: &str) {
        if self.entries.len() < self.max_entries || self.entries.contains_key(key) {
            return;
        }

        let purged = self.purge_expired();
        if purged > 0 {
            debug!("Purged {} expired cache entries", purged);
        }

        while self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().expires_at)
                .map(|entry| entry.key().clone());

            match oldest {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                }
                None => break,
            }
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(crate::config::default_cache_max_entries())
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(mut entry) = self.entries.get_mut(key) else {
            return Ok(self
                .counters
                .get(key)
                .filter(|counter| !counter.is_expired())
                .map(|counter| counter.value.to_string()));
        };

        if entry.is_expired() {
            drop(entry);
            self.entries.remove_if(key, |_, entry| entry.is_expired());
            return Ok(None);
        }

        entry.mark_accessed();
        Ok(Some(entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.make_room(key);
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }

    async fn invalidate(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.entries.remove(key);
            self.counters.remove(key);
        }
        Ok(())
    }

    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64> {
        if self
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
        {
            return Err(AuthzError::cache(format!(
                "Key '{}' does not hold a counter",
                key
            )));
        }

        // The shard stays locked for the read-modify-write
        let mut counter = self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry::new(0, ttl));

        if counter.is_expired() {
            *counter = CacheEntry::new(0, ttl);
        }
        counter.value += 1;

        Ok(counter.value)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
