//! Key-value storage backends.
//!
//! Mirrors the browser's origin storage: string keys, string values, every
//! write independently durable. Receivers are `&self` so one backend can be
//! shared by several banners on the same origin.

use consentkit_core::{Error, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub trait KeyValueStorage: Send + Sync {
    /// Short backend name for log lines and errors.
    fn backend(&self) -> &str;

    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;

    /// All keys currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStorage {
    items: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn backend(&self) -> &str {
        "memory"
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).map(|v| v.value().clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items.iter().map(|e| e.key().clone()).collect())
    }
}

// ---------------------------------------------------------------------------
// File-backed
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
struct StorageDocument {
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    items: BTreeMap<String, String>,
}

/// A JSON document on disk, rewritten atomically on every mutation.
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the document at `path`. A missing file is an
    /// empty store; a corrupt one is treated as empty and replaced on the
    /// next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = Self::read_document(&path).map(|d| d.items).unwrap_or_default();
        debug!("Opened file storage {} ({} items)", path.display(), items.len());
        Self {
            path,
            items: Mutex::new(items),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(path: &Path) -> Option<StorageDocument> {
        if !path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("Ignoring unreadable storage file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write_document(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let doc = StorageDocument {
            updated_at: Some(chrono::Utc::now().to_rfc3339()),
            items: items.clone(),
        };
        let json = serde_json::to_string_pretty(&doc)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| Error::storage("file", "storage lock poisoned"))
    }
}

impl KeyValueStorage for FileStorage {
    fn backend(&self) -> &str {
        "file"
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.lock()?;
        let mut next = items.clone();
        next.insert(key.to_string(), value.to_string());
        self.write_document(&next)?;
        *items = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.lock()?;
        if !items.contains_key(key) {
            return Ok(());
        }
        let mut next = items.clone();
        next.remove(key);
        self.write_document(&next)?;
        *items = next;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Disabled
// ---------------------------------------------------------------------------

/// Storage that refuses every call, like a browser with storage disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStorage;

impl KeyValueStorage for UnavailableStorage {
    fn backend(&self) -> &str {
        "unavailable"
    }

    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::StorageUnavailable("storage is disabled".into()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Err(Error::StorageUnavailable("storage is disabled".into()))
    }

    fn remove_item(&self, _key: &str) -> Result<()> {
        Err(Error::StorageUnavailable("storage is disabled".into()))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Err(Error::StorageUnavailable("storage is disabled".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_set_get_remove() {
        let s = MemoryStorage::new();
        assert!(s.is_empty());
        s.set_item("k", "v").unwrap();
        assert_eq!(s.get_item("k").unwrap().as_deref(), Some("v"));
        s.set_item("k", "w").unwrap();
        assert_eq!(s.len(), 1);
        s.remove_item("k").unwrap();
        assert!(s.get_item("k").unwrap().is_none());
    }

    #[test]
    fn unavailable_always_errors() {
        let s = UnavailableStorage;
        assert!(s.get_item("k").is_err());
        assert!(s.set_item("k", "v").is_err());
        assert!(s.keys().is_err());
    }
}
