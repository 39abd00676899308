//! Cache types and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Serialized form of a cached value: `{ data, userId, timestamp }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cached data
    pub data: serde_json::Value,
    /// Identity that owns the entry
    #[serde(rename = "userId")]
    pub user_id: String,
    /// When the entry was written
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(data: serde_json::Value, user_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            data,
            user_id: user_id.into(),
            timestamp,
        }
    }

    /// Whether the entry is still fresh at `now` for the given TTL
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        crate::clock::age_since(now, self.timestamp) < ttl
    }
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the persisted tier
    pub enable_persisted_tier: bool,
    /// Enable the in-memory tier
    pub enable_memory_tier: bool,
    /// TTL for persisted entries
    #[serde(with = "humantime_serde")]
    pub persisted_ttl: Duration,
    /// TTL for in-memory entries
    #[serde(with = "humantime_serde")]
    pub memory_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enable_persisted_tier: true,
            enable_memory_tier: true,
            persisted_ttl: Duration::from_secs(15),
            memory_ttl: Duration::from_secs(30),
        }
    }
}

impl CacheConfig {
    /// Only the process-local tier
    pub fn memory_only() -> Self {
        Self {
            enable_persisted_tier: false,
            ..Default::default()
        }
    }

    /// Set both TTLs at once
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.persisted_ttl = ttl;
        self.memory_ttl = ttl;
        self
    }

    /// Longest time any enabled tier may serve an entry
    pub fn max_ttl(&self) -> Duration {
        let persisted = if self.enable_persisted_tier {
            self.persisted_ttl
        } else {
            Duration::ZERO
        };
        let memory = if self.enable_memory_tier {
            self.memory_ttl
        } else {
            Duration::ZERO
        };
        persisted.max(memory)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatistics {
    /// Hits served by the persisted tier
    pub persisted_hits: u64,
    /// Hits served by the memory tier
    pub memory_hits: u64,
    /// Reads that found nothing fresh
    pub misses: u64,
    /// Successful `set` calls
    pub writes: u64,
    /// Entries removed by invalidation
    pub invalidated: u64,
    /// Swallowed persisted-storage failures
    pub storage_errors: u64,
    /// Entries currently held in memory for all identities
    pub memory_entries: usize,
}

impl CacheStatistics {
    /// Total hits across tiers
    pub fn total_hits(&self) -> u64 {
        self.persisted_hits + self.memory_hits
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total_requests = self.total_hits() + self.misses;
        if total_requests == 0 {
            0.0
        } else {
            self.total_hits() as f64 / total_requests as f64
        }
    }
}
