//! Identity-partitioned response cache
//!
//! A staleness bound, not a correctness cache: the backend is the source of
//! truth and entries live for seconds.
//!
//! ## Tiers
//!
//! - **Tier 1, persisted**: entries in the durable [`KeyValueStore`], visible
//!   to every process sharing it and surviving restarts
//! - **Tier 2, memory**: a process-local map with its own TTL
//!
//! Reads check tier 1 first, then tier 2. Writes go to both. Keys are always
//! `<logical-key>_<userId>`, so one identity can never read another's entries.
//! Expiry is evaluated lazily on read; nothing sweeps in the background.
//!
//! [`KeyValueStore`]: crate::storage::KeyValueStore

mod store;
mod types;

#[cfg(test)]
mod tests;

pub use store::{CacheStore, namespaced_key};
pub use types::{CacheConfig, CacheEntry, CacheStatistics};

/// Logical key for the rule-set list
pub const RULES_KEY: &str = "rules";
/// Logical key prefix for evaluation logs (suffixed with the limit)
pub const LOGS_KEY: &str = "logs";
/// Logical key for rule templates
pub const TEMPLATES_KEY: &str = "templates";
/// Logical key for exploit scenarios
pub const SCENARIOS_KEY: &str = "scenarios";
