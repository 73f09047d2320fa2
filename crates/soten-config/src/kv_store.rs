//! Persistent key-value store
//!
//! Durable storage for the few values that must survive a restart: the
//! session and the selected repository. Values are JSON records wrapped in a
//! small envelope carrying save metadata.
//!
//! # Semantics
//!
//! - A key that was never written reads back as `None`
//! - A record that fails to parse also reads back as `None` (logged)
//! - Saving `None` removes the key

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key under which the session is persisted
pub const SESSION_KEY: &str = "user";

/// Key under which the selected repository is persisted
pub const SELECTED_REPO_KEY: &str = "selectedRepo";

const RECORD_VERSION: u32 = 1;

/// Raw string storage keyed by name
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Record metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMeta {
    pub saved_at: DateTime<Utc>,
    pub version: u32,
}

/// Envelope around a persisted value
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Record<T> {
    meta: RecordMeta,
    value: T,
}

/// Load a typed record, treating absent and unreadable records alike
pub fn load_record<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Failed to load '{}': {}", key, e);
            return None;
        }
    };

    match serde_json::from_str::<Record<T>>(&raw) {
        Ok(record) => Some(record.value),
        Err(e) => {
            log::warn!("Ignoring unreadable record '{}': {}", key, e);
            None
        }
    }
}

/// Save a typed record; `None` removes the key
pub fn save_record<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: Option<&T>,
) -> Result<()> {
    let Some(value) = value else {
        return store.remove(key);
    };

    let record = Record {
        meta: RecordMeta {
            saved_at: Utc::now(),
            version: RECORD_VERSION,
        },
        value,
    };
    let raw = serde_json::to_string(&record)
        .with_context(|| format!("Failed to serialize record '{}'", key))?;
    store.save(key, &raw)
}

/// Stores one `<key>.json` file per key below a directory
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform state directory
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::paths::state_dir()?))
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            anyhow::bail!("Invalid store key '{}'", key);
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read store file: {:?}", path))?;
        Ok(Some(content))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, value)
            .with_context(|| format!("Failed to write store file: {:?}", path))?;
        log::debug!("Saved '{}' to {:?}", key, path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove store file: {:?}", path))
            }
        }
    }
}

/// In-memory store, used in tests and for throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RepoRef, Session};

    #[test]
    fn test_missing_keys_read_as_none() {
        let store = MemoryKeyValueStore::new();
        assert!(load_record::<Session>(&store, SESSION_KEY).is_none());
        assert!(load_record::<RepoRef>(&store, SELECTED_REPO_KEY).is_none());
    }

    #[test]
    fn test_record_round_trip_and_removal() {
        let store = MemoryKeyValueStore::new();
        let repo = RepoRef::new("acme", "notes");

        save_record(&store, SELECTED_REPO_KEY, Some(&repo)).unwrap();
        assert_eq!(load_record(&store, SELECTED_REPO_KEY), Some(repo));

        save_record::<RepoRef>(&store, SELECTED_REPO_KEY, None).unwrap();
        assert!(store.load(SELECTED_REPO_KEY).unwrap().is_none());
    }

    #[test]
    fn test_garbage_reads_as_none() {
        let store = MemoryKeyValueStore::new();
        store.save(SESSION_KEY, "not json").unwrap();
        assert!(load_record::<Session>(&store, SESSION_KEY).is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp = tempfile::tempdir().expect("temp dir");
        let session = Session::new("testuser", "tok_123", "inst_456", "test@example.com");

        let first = FileKeyValueStore::new(temp.path());
        save_record(&first, SESSION_KEY, Some(&session)).unwrap();

        let second = FileKeyValueStore::new(temp.path());
        assert_eq!(load_record(&second, SESSION_KEY), Some(session));
        assert!(temp.path().join("user.json").exists());
    }

    #[test]
    fn test_file_store_remove_missing_is_ok() {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = FileKeyValueStore::new(temp.path());
        store.remove(SELECTED_REPO_KEY).unwrap();
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = FileKeyValueStore::new(temp.path());
        assert!(store.save("../escape", "{}").is_err());
        assert!(store.load("").is_err());
    }
}
