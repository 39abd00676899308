//! Two-tier cache store

use super::types::{CacheConfig, CacheEntry, CacheStatistics};
use crate::clock::{Clock, SystemClock};
use crate::identity::IdentityProvider;
use crate::storage::KeyValueStore;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// `<logical-key>_<userId>`
pub fn namespaced_key(key: &str, user_id: &str) -> String {
    format!("{}_{}", key, user_id)
}

type Partition = HashMap<String, CacheEntry>;

/// Cache partitioned by the current identity
#[derive(Debug)]
pub struct CacheStore {
    identity: Arc<IdentityProvider>,
    persisted: Arc<dyn KeyValueStore>,
    /// user id -> namespaced key -> entry; partitions are created lazily
    memory: Mutex<HashMap<String, Partition>>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    stats: Mutex<CacheStatistics>,
}

impl CacheStore {
    /// Create a cache over the given persisted store
    pub fn new(
        identity: Arc<IdentityProvider>,
        persisted: Arc<dyn KeyValueStore>,
        config: CacheConfig,
    ) -> Self {
        Self::with_clock(identity, persisted, config, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit clock
    pub fn with_clock(
        identity: Arc<IdentityProvider>,
        persisted: Arc<dyn KeyValueStore>,
        config: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity,
            persisted,
            memory: Mutex::new(HashMap::new()),
            clock,
            config,
            stats: Mutex::new(CacheStatistics::default()),
        }
    }

    /// Get the cache configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a fresh value for `key` owned by the current identity
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let identity = self.identity.current().await;
        let full_key = namespaced_key(key, &identity.id);
        let now = self.clock.now();

        if self.config.enable_persisted_tier {
            if let Some(entry) = self.read_persisted(&full_key).await {
                if entry.user_id == identity.id
                    && entry.is_fresh(now, self.config.persisted_ttl)
                {
                    if let Some(value) = decode::<T>(&full_key, entry.data) {
                        self.stats.lock().persisted_hits += 1;
                        debug!(key = %full_key, tier = "persisted", "Cache hit");
                        return Some(value);
                    }
                } else if entry.user_id == identity.id {
                    self.remove_persisted(&full_key).await;
                }
            }
        }

        if self.config.enable_memory_tier {
            let fresh = {
                let mut memory = self.memory.lock();
                let partition = memory.entry(identity.id.clone()).or_default();
                match partition.get(&full_key) {
                    Some(entry) if entry.is_fresh(now, self.config.memory_ttl) => {
                        Some(entry.data.clone())
                    }
                    Some(_) => {
                        partition.remove(&full_key);
                        None
                    }
                    None => None,
                }
            };

            if let Some(value) = fresh.and_then(|data| decode::<T>(&full_key, data)) {
                self.stats.lock().memory_hits += 1;
                debug!(key = %full_key, tier = "memory", "Cache hit");
                return Some(value);
            }
        }

        self.stats.lock().misses += 1;
        debug!(key = %full_key, "Cache miss");
        None
    }

    /// Store `value` under `key` for the current identity in every enabled tier
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let identity = self.identity.current().await;
        let full_key = namespaced_key(key, &identity.id);

        let data = match serde_json::to_value(value) {
            Ok(data) => data,
            Err(e) => {
                warn!(key = %full_key, error = %e, "Failed to serialize cache value");
                return;
            }
        };
        let entry = CacheEntry::new(data, identity.id.clone(), self.clock.now());

        if self.config.enable_persisted_tier {
            self.write_persisted(&full_key, &entry).await;
        }

        if self.config.enable_memory_tier {
            self.memory
                .lock()
                .entry(identity.id.clone())
                .or_default()
                .insert(full_key, entry);
        }

        self.stats.lock().writes += 1;
    }

    /// Drop cached entries of the current identity.
    ///
    /// With a pattern, only namespaced keys containing it are removed;
    /// without one, the identity's whole partition goes. Returns the number
    /// of entries removed across both tiers.
    pub async fn invalidate(&self, pattern: Option<&str>) -> u64 {
        let identity = self.identity.current().await;
        let removed = self.invalidate_for(&identity.id, pattern).await;
        debug!(user_id = %identity.id, pattern = ?pattern, removed, "Cache invalidated");
        removed
    }

    /// Drop every entry belonging to `user_id`, e.g. after an identity reset
    pub async fn drop_partition(&self, user_id: &str) -> u64 {
        self.invalidate_for(user_id, None).await
    }

    /// Reset the identity and drop its in-memory namespace.
    ///
    /// Persisted entries of the old identity stay for recovery unless
    /// `purge` is set. Returns the previous id and the number of entries
    /// removed.
    pub async fn reset_identity(&self, purge: bool) -> (Option<String>, u64) {
        let previous = self.identity.reset().await;
        let Some(old) = previous.as_deref() else {
            return (None, 0);
        };

        let removed = if purge {
            self.drop_partition(old).await
        } else {
            let dropped = self
                .memory
                .lock()
                .remove(old)
                .map_or(0, |partition| partition.len() as u64);
            self.stats.lock().invalidated += dropped;
            dropped
        };
        debug!(previous = %old, purge, removed, "Dropped namespace of previous identity");
        (previous, removed)
    }

    /// Snapshot of the cache counters
    pub fn statistics(&self) -> CacheStatistics {
        let memory_entries = self.memory.lock().values().map(HashMap::len).sum();
        let mut stats = self.stats.lock().clone();
        stats.memory_entries = memory_entries;
        stats
    }

    async fn invalidate_for(&self, user_id: &str, pattern: Option<&str>) -> u64 {
        let mut removed = {
            let mut memory = self.memory.lock();
            match pattern {
                Some(pattern) => memory.get_mut(user_id).map_or(0, |partition| {
                    let before = partition.len();
                    partition.retain(|key, _| !key.contains(pattern));
                    (before - partition.len()) as u64
                }),
                None => memory.remove(user_id).map_or(0, |p| p.len() as u64),
            }
        };

        let suffix = format!("_{}", user_id);
        match self.persisted.keys().await {
            Ok(keys) => {
                for key in keys
                    .into_iter()
                    .filter(|k| k.ends_with(&suffix))
                    .filter(|k| pattern.is_none_or(|p| k.contains(p)))
                {
                    if self.remove_persisted(&key).await {
                        removed += 1;
                    }
                }
            }
            Err(e) => {
                self.stats.lock().storage_errors += 1;
                warn!(error = %e, "Failed to list persisted cache keys");
            }
        }

        self.stats.lock().invalidated += removed;
        removed
    }

    async fn read_persisted(&self, key: &str) -> Option<CacheEntry> {
        match self.persisted.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(key, error = %e, "Ignoring unreadable persisted cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                self.stats.lock().storage_errors += 1;
                warn!(key, error = %e, "Persisted cache read failed");
                None
            }
        }
    }

    async fn write_persisted(&self, key: &str, entry: &CacheEntry) {
        let raw = match serde_json::to_string(entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = self.persisted.set(key, &raw).await {
            self.stats.lock().storage_errors += 1;
            warn!(key, error = %e, "Persisted cache write failed");
        }
    }

    async fn remove_persisted(&self, key: &str) -> bool {
        match self.persisted.remove(key).await {
            Ok(()) => true,
            Err(e) => {
                self.stats.lock().storage_errors += 1;
                warn!(key, error = %e, "Persisted cache remove failed");
                false
            }
        }
    }
}

fn decode<T: DeserializeOwned>(key: &str, data: serde_json::Value) -> Option<T> {
    match serde_json::from_value(data) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Cached value has unexpected shape");
            None
        }
    }
}
