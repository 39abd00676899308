//! File-backed key-value store
//!
//! The whole store is one JSON object. Every read goes back to disk so that
//! separate processes sharing the file observe each other's writes; every
//! write rewrites the document through a temp file and an atomic rename.
//! A document that no longer parses is moved aside and the store starts over
//! empty; everything in it can be rebuilt.

use super::KeyValueStore;
use crate::error::{ZeroPassError, ZeroPassResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

/// Default file name inside the data directory
pub const STORE_FILE_NAME: &str = "storage.json";

/// Durable store persisted as a JSON document
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (or lazily create) a store at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Open the store file inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(STORE_FILE_NAME))
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> ZeroPassResult<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(ZeroPassError::storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                self.quarantine(&e).await;
                Ok(BTreeMap::new())
            }
        }
    }

    /// Where an unreadable document is moved
    pub fn corrupt_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }

    async fn quarantine(&self, error: &serde_json::Error) {
        let target = self.corrupt_path();
        warn!(
            path = %self.path.display(),
            moved_to = %target.display(),
            error = %error,
            "Store document is corrupted, starting empty"
        );
        match fs::rename(&self.path, &target).await {
            Ok(()) => {}
            // Another handle got there first
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to move corrupted store aside"),
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> ZeroPassResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    ZeroPassError::storage(format!(
                        "Failed to create storage directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| ZeroPassError::storage(format!("Failed to serialize store: {}", e)))?;

        // Unique per write so concurrent writers never share a temp file
        let tmp_path = self
            .path
            .with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| ZeroPassError::storage(format!("Failed to write store: {}", e)))?;
        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(ZeroPassError::storage(format!("Failed to replace store: {}", e)));
        }

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> ZeroPassResult<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> ZeroPassResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> ZeroPassResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }

    async fn keys(&self) -> ZeroPassResult<Vec<String>> {
        Ok(self.load().await?.into_keys().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(temp_dir.path());
        assert!(store.keys().await.unwrap().is_empty());
        assert!(store.get("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(temp_dir.path().join("nested"));
        store.set("zeropass_user_identity", "{\"id\":\"user_1\"}").await.unwrap();
        drop(store);

        let reopened = FileStore::in_dir(temp_dir.path().join("nested"));
        assert_eq!(
            reopened.get("zeropass_user_identity").await.unwrap().as_deref(),
            Some("{\"id\":\"user_1\"}")
        );
    }

    #[tokio::test]
    async fn test_two_handles_observe_each_other() {
        let temp_dir = TempDir::new().unwrap();
        let first = FileStore::in_dir(temp_dir.path());
        let second = FileStore::in_dir(temp_dir.path());

        first.set("rules_user_a", "[1]").await.unwrap();
        assert_eq!(second.get("rules_user_a").await.unwrap().as_deref(), Some("[1]"));

        second.remove("rules_user_a").await.unwrap();
        assert!(first.get("rules_user_a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupted_document_is_moved_aside() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(temp_dir.path());
        std::fs::write(store.path(), "{ definitely not json").unwrap();

        assert!(store.get("k").await.unwrap().is_none());
        assert_eq!(
            std::fs::read_to_string(store.corrupt_path()).unwrap(),
            "{ definitely not json"
        );

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_remove_recovers_from_corrupted_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(temp_dir.path());
        std::fs::write(store.path(), "[1, 2").unwrap();

        store.remove("zeropass_user_identity").await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_writers_leave_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let first = FileStore::in_dir(temp_dir.path());
        let second = FileStore::in_dir(temp_dir.path());

        for round in 0..20 {
            let key = format!("k{}", round);
            let (a, b) = tokio::join!(first.set(&key, "a"), second.set(&key, "b"));
            a.unwrap();
            b.unwrap();
        }

        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
