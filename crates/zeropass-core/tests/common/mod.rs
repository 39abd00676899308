//! Shared fixtures for gateway-level tests

#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use zeropass_core::{
    ApiGateway, CacheConfig, CacheStore, IdentityProvider, KeyValueStore, MemoryStore,
    ZeroPassConfig,
};

pub struct Harness {
    pub gateway: Arc<ApiGateway>,
    pub durable: Arc<MemoryStore>,
}

impl Harness {
    pub fn new(base_url: &str) -> Self {
        Self::with_durable(base_url, Arc::new(MemoryStore::new()))
    }

    pub fn with_durable(base_url: &str, durable: Arc<MemoryStore>) -> Self {
        let mut config = ZeroPassConfig::default();
        config.set_api_base_url(base_url);
        config.request_timeout = Duration::from_secs(5);
        config.probe_timeout = Duration::from_millis(200);
        config.stale_retry_delay = Duration::from_millis(10);

        let store: Arc<dyn KeyValueStore> = durable.clone();
        let identity = Arc::new(IdentityProvider::new(
            store.clone(),
            Arc::new(MemoryStore::new()),
        ));
        let cache = Arc::new(CacheStore::new(
            identity.clone(),
            store,
            CacheConfig::default(),
        ));
        let gateway = ApiGateway::new(&config, identity, cache).expect("gateway");

        Self {
            gateway: Arc::new(gateway),
            durable,
        }
    }

    pub async fn user_id(&self) -> String {
        self.gateway.identity().current().await.id
    }
}

pub fn rule_set_json(id: &str, owner: Option<&str>) -> Value {
    let mut value = json!({
        "id": id,
        "name": format!("Rule set {}", id),
        "default_action": "allow",
    });
    if let Some(owner) = owner {
        value["userId"] = json!(owner);
    }
    value
}

pub fn not_found() -> Value {
    json!({ "detail": "Rule set not found" })
}
