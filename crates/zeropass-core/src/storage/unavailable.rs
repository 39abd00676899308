//! Store used when no persistence medium exists

use super::KeyValueStore;
use crate::error::{ZeroPassError, ZeroPassResult};
use async_trait::async_trait;

/// Every operation fails with a storage error.
///
/// Stands in when no data directory can be resolved; identity and cache
/// layers degrade to placeholder identity and cache misses on top of it.
#[derive(Debug, Clone, Default)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> ZeroPassError {
        if self.reason.is_empty() {
            ZeroPassError::storage("Storage is not available")
        } else {
            ZeroPassError::storage(format!("Storage is not available: {}", self.reason))
        }
    }
}

#[async_trait]
impl KeyValueStore for UnavailableStore {
    async fn get(&self, _key: &str) -> ZeroPassResult<Option<String>> {
        Err(self.error())
    }

    async fn set(&self, _key: &str, _value: &str) -> ZeroPassResult<()> {
        Err(self.error())
    }

    async fn remove(&self, _key: &str) -> ZeroPassResult<()> {
        Err(self.error())
    }

    async fn keys(&self) -> ZeroPassResult<Vec<String>> {
        Err(self.error())
    }
}
