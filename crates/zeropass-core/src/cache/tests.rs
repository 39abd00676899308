//! Cache store tests

use super::*;
use crate::clock::{Clock, ManualClock};
use crate::identity::IdentityProvider;
use crate::storage::{KeyValueStore, MemoryStore, UnavailableStore};
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    cache: CacheStore,
    identities: Arc<IdentityProvider>,
    durable: Arc<MemoryStore>,
    clock: ManualClock,
}

fn fixture(config: CacheConfig) -> Fixture {
    let durable = Arc::new(MemoryStore::new());
    let clock = ManualClock::starting_now();
    let identities = Arc::new(IdentityProvider::with_clock(
        durable.clone(),
        Arc::new(MemoryStore::new()),
        Arc::new(clock.clone()),
    ));
    let cache = CacheStore::with_clock(
        identities.clone(),
        durable.clone(),
        config,
        Arc::new(clock.clone()),
    );
    Fixture {
        cache,
        identities,
        durable,
        clock,
    }
}

#[tokio::test]
async fn test_set_then_get_returns_value() {
    let f = fixture(CacheConfig::default());
    f.cache.set(RULES_KEY, &vec!["a", "b"]).await;

    let cached: Option<Vec<String>> = f.cache.get(RULES_KEY).await;
    assert_eq!(cached, Some(vec!["a".to_string(), "b".to_string()]));
    assert_eq!(f.cache.statistics().persisted_hits, 1);
}

#[tokio::test]
async fn test_entry_is_stored_under_namespaced_key_with_envelope() {
    let f = fixture(CacheConfig::default());
    let identity = f.identities.current().await;
    f.cache.set(RULES_KEY, &serde_json::json!([1, 2])).await;

    let raw = f
        .durable
        .get(&namespaced_key(RULES_KEY, &identity.id))
        .await
        .unwrap()
        .unwrap();
    let entry: CacheEntry = serde_json::from_str(&raw).unwrap();
    assert_eq!(entry.user_id, identity.id);
    assert_eq!(entry.data, serde_json::json!([1, 2]));
    assert!(raw.contains("\"userId\""));
}

#[tokio::test]
async fn test_nothing_is_served_past_the_longest_ttl() {
    let f = fixture(CacheConfig::default());
    f.cache.set(RULES_KEY, &42u32).await;

    // Persisted tier expired, memory tier still fresh
    f.clock.advance(Duration::from_secs(16));
    assert_eq!(f.cache.get::<u32>(RULES_KEY).await, Some(42));
    assert_eq!(f.cache.statistics().memory_hits, 1);

    f.clock.advance(Duration::from_secs(15));
    assert_eq!(f.cache.get::<u32>(RULES_KEY).await, None);
    assert_eq!(f.cache.statistics().misses, 1);
}

#[tokio::test]
async fn test_expired_persisted_entry_is_removed_on_read() {
    let f = fixture(CacheConfig::default().with_ttl(Duration::from_secs(5)));
    let identity = f.identities.current().await;
    f.cache.set(RULES_KEY, &1u8).await;

    f.clock.advance(Duration::from_secs(6));
    assert_eq!(f.cache.get::<u8>(RULES_KEY).await, None);
    assert!(
        f.durable
            .get(&namespaced_key(RULES_KEY, &identity.id))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_persisted_entry_with_foreign_owner_is_ignored() {
    let f = fixture(CacheConfig::default());
    let identity = f.identities.current().await;

    // Entry stored under our key but stamped with someone else's id
    let forged = CacheEntry::new(serde_json::json!("theirs"), "user_other", f.clock.now());
    f.durable
        .set(
            &namespaced_key(RULES_KEY, &identity.id),
            &serde_json::to_string(&forged).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(f.cache.get::<String>(RULES_KEY).await, None);
}

#[tokio::test]
async fn test_identities_do_not_share_entries() {
    let f = fixture(CacheConfig::default());
    f.cache.set(RULES_KEY, &"mine").await;

    f.identities.reset().await;
    assert_eq!(f.cache.get::<String>(RULES_KEY).await, None);
}

#[tokio::test]
async fn test_invalidate_with_pattern_only_touches_matching_keys() {
    let f = fixture(CacheConfig::default());
    f.cache.set(RULES_KEY, &1u8).await;
    f.cache.set("logs_50", &2u8).await;
    f.cache.set("logs_100", &3u8).await;

    let removed = f.cache.invalidate(Some(LOGS_KEY)).await;
    assert_eq!(removed, 4); // two keys, two tiers

    assert_eq!(f.cache.get::<u8>(RULES_KEY).await, Some(1));
    assert_eq!(f.cache.get::<u8>("logs_50").await, None);
    assert_eq!(f.cache.get::<u8>("logs_100").await, None);
}

#[tokio::test]
async fn test_invalidate_leaves_other_identities_alone() {
    let f = fixture(CacheConfig::default());
    let foreign_key = namespaced_key(RULES_KEY, "user_other");
    let foreign = CacheEntry::new(serde_json::json!([]), "user_other", f.clock.now());
    f.durable
        .set(&foreign_key, &serde_json::to_string(&foreign).unwrap())
        .await
        .unwrap();

    f.cache.set(RULES_KEY, &1u8).await;
    f.cache.invalidate(None).await;

    assert!(f.durable.get(&foreign_key).await.unwrap().is_some());
    assert_eq!(f.cache.get::<u8>(RULES_KEY).await, None);
}

#[tokio::test]
async fn test_drop_partition_clears_named_identity() {
    let f = fixture(CacheConfig::default());
    let identity = f.identities.current().await;
    f.cache.set(RULES_KEY, &1u8).await;
    f.cache.set(TEMPLATES_KEY, &2u8).await;

    assert_eq!(f.cache.drop_partition(&identity.id).await, 4);
    assert_eq!(f.cache.statistics().memory_entries, 0);
    // Only the identity record itself remains
    assert_eq!(f.durable.len(), 1);
}

#[tokio::test]
async fn test_reset_identity_drops_memory_namespace_and_keeps_persisted() {
    let f = fixture(CacheConfig::default());
    let old = f.identities.current().await;
    f.cache.set(RULES_KEY, &1u8).await;

    let (previous, removed) = f.cache.reset_identity(false).await;
    assert_eq!(previous.as_deref(), Some(old.id.as_str()));
    assert_eq!(removed, 1);
    assert_eq!(f.cache.statistics().memory_entries, 0);
    assert!(
        f.durable
            .get(&namespaced_key(RULES_KEY, &old.id))
            .await
            .unwrap()
            .is_some()
    );

    let new = f.identities.current().await;
    assert_ne!(new.id, old.id);
    assert_eq!(f.cache.get::<u8>(RULES_KEY).await, None);
}

#[tokio::test]
async fn test_reset_identity_with_purge_drops_persisted_entries() {
    let f = fixture(CacheConfig::default());
    let old = f.identities.current().await;
    f.cache.set(RULES_KEY, &1u8).await;

    let (_, removed) = f.cache.reset_identity(true).await;
    assert_eq!(removed, 2);
    assert!(
        f.durable
            .get(&namespaced_key(RULES_KEY, &old.id))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_memory_only_cache_never_touches_durable_store() {
    let f = fixture(CacheConfig::memory_only());
    f.identities.current().await;
    let before = f.durable.len();

    f.cache.set(SCENARIOS_KEY, &"x").await;
    assert_eq!(f.cache.get::<String>(SCENARIOS_KEY).await.as_deref(), Some("x"));
    assert_eq!(f.durable.len(), before);
}

#[tokio::test]
async fn test_unavailable_storage_degrades_to_memory_tier() {
    let identities = Arc::new(IdentityProvider::new(
        Arc::new(UnavailableStore::new("read-only")),
        Arc::new(MemoryStore::new()),
    ));
    let cache = CacheStore::new(
        identities,
        Arc::new(UnavailableStore::new("read-only")),
        CacheConfig::default(),
    );

    cache.set(RULES_KEY, &7u8).await;
    assert_eq!(cache.get::<u8>(RULES_KEY).await, Some(7));
    assert_eq!(cache.invalidate(None).await, 1);

    let stats = cache.statistics();
    assert!(stats.storage_errors >= 2);
    assert_eq!(stats.memory_hits, 1);
}

#[tokio::test]
async fn test_unexpected_shape_is_a_miss() {
    let f = fixture(CacheConfig::default());
    f.cache.set(RULES_KEY, &"not a number").await;
    assert_eq!(f.cache.get::<u32>(RULES_KEY).await, None);
}

#[test]
fn test_hit_rate() {
    let stats = CacheStatistics {
        persisted_hits: 2,
        memory_hits: 1,
        misses: 1,
        ..Default::default()
    };
    assert_eq!(stats.total_hits(), 3);
    assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    assert_eq!(CacheStatistics::default().hit_rate(), 0.0);
}

#[test]
fn test_config_durations_parse_from_humantime() {
    let config: CacheConfig =
        serde_json::from_str(r#"{"persisted_ttl": "10s", "memory_ttl": "1m"}"#).unwrap();
    assert_eq!(config.persisted_ttl, Duration::from_secs(10));
    assert_eq!(config.memory_ttl, Duration::from_secs(60));
    assert!(config.enable_persisted_tier);
    assert_eq!(config.max_ttl(), Duration::from_secs(60));
}
