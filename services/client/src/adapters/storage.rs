//! services/client/src/adapters/storage.rs
//!
//! File-backed implementation of the `SessionStorage` port: a small JSON
//! object of string keys in a single file, standing in for the browser's
//! localStorage. A missing or corrupt file reads as empty state so that
//! session restoration at startup can never fail hard.

use async_trait::async_trait;
use postwall_core::ports::{PortError, PortResult, SessionStorage};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A storage adapter that implements the `SessionStorage` port.
#[derive(Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Creates a new `FileStorage` backed by the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn load_map(&self) -> HashMap<String, String> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    async fn store_map(&self, map: &HashMap<String, String>) -> PortResult<()> {
        let bytes = serde_json::to_vec_pretty(map)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        fs::write(&self.path, bytes)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

//=========================================================================================
// `SessionStorage` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionStorage for FileStorage {
    async fn read(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.load_map().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> PortResult<()> {
        let mut map = self.load_map().await;
        map.insert(key.to_string(), value.to_string());
        self.store_map(&map).await
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        let mut map = self.load_map().await;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.store_map(&map).await
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));

        storage.write("token", "abc123").await.unwrap();
        storage.write("userId", "42").await.unwrap();

        assert_eq!(storage.read("token").await.unwrap().as_deref(), Some("abc123"));
        assert_eq!(storage.read("userId").await.unwrap().as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("never-written.json"));
        assert_eq!(storage.read("token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json at all").unwrap();

        let storage = FileStorage::new(path);
        assert_eq!(storage.read("token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));

        storage.write("token", "abc").await.unwrap();
        storage.remove("token").await.unwrap();
        storage.remove("token").await.unwrap();

        assert_eq!(storage.read("token").await.unwrap(), None);
    }
}
