//! Key-value persistence capability
//!
//! The cache and identity layers never touch a concrete storage medium. They
//! talk to a [`KeyValueStore`], which has three implementations:
//!
//! - [`MemoryStore`]: process-local map, used for the session scope and tests
//! - [`FileStore`]: a single JSON document on disk, shared by every process
//!   pointed at the same data directory
//! - [`UnavailableStore`]: always fails, for environments without storage

mod file;
mod memory;
mod unavailable;

pub use file::{FileStore, STORE_FILE_NAME};
pub use memory::MemoryStore;
pub use unavailable::UnavailableStore;

use crate::error::ZeroPassResult;
use async_trait::async_trait;

/// String-to-string store with the shape of browser storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Get the value stored under `key`
    async fn get(&self, key: &str) -> ZeroPassResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> ZeroPassResult<()>;

    /// Remove `key`; removing a missing key is not an error
    async fn remove(&self, key: &str) -> ZeroPassResult<()>;

    /// List every key currently stored
    async fn keys(&self) -> ZeroPassResult<Vec<String>>;
}
