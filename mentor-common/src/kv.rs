//! Keyed storage for saved sessions and learning progress.
//!
//! The browser original kept this state in per-tab storage with no
//! transactional guarantees; the same contract holds here: last write
//! wins, no locking, single process. Panels receive a store handle by
//! injection so the core stays testable without a real filesystem.

use crate::{MentorError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Minimal last-write-wins key-value store.
///
/// Values are opaque strings; callers serialize their own records
/// (typically JSON). `keys` returns every key with the given prefix in
/// lexicographic order.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// In-memory store for tests and keyless demo runs.
///
/// ```
/// use mentor_common::kv::{KvStore, MemoryKv};
///
/// let store = MemoryKv::default();
/// store.set("session:1", "{}").unwrap();
/// assert_eq!(store.get("session:1").unwrap().as_deref(), Some("{}"));
/// assert_eq!(store.keys("session:").unwrap(), vec!["session:1"]);
/// store.remove("session:1").unwrap();
/// assert!(store.get("session:1").unwrap().is_none());
/// ```
#[derive(Default)]
pub struct MemoryKv {
    map: Mutex<BTreeMap<String, String>>,
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

impl MemoryKv {
    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // Mutex poisoning only happens if a holder panicked; the map is
        // still structurally sound, so keep serving.
        self.map.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// File-backed store: one JSON object per file, rewritten on every set.
///
/// Loads eagerly on open; concurrent processes racing the same file get
/// last-write-wins semantics, matching the single-user contract.
pub struct JsonFileKv {
    path: PathBuf,
    map: Mutex<BTreeMap<String, String>>,
}

impl JsonFileKv {
    /// Open (or create) the store at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let map = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| {
                    MentorError::Storage(format!(
                        "corrupt store file {}: {e}",
                        path.display()
                    ))
                })?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            map: Mutex::new(map),
        })
    }

    fn flush(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string_pretty(map)
            .map_err(|e| MentorError::Storage(format!("serialize store: {e}")))?;
        // Write via a temp file + rename so a crash mid-write cannot
        // truncate the previous snapshot.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.map.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KvStore for JsonFileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.lock();
        map.insert(key.to_string(), value.to_string());
        self.flush(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.lock();
        if map.remove(key).is_some() {
            self.flush(&map)?;
        }
        Ok(())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trips_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store").join("sessions.json");

        {
            let store = JsonFileKv::open(&path).unwrap();
            store.set("session:a", r#"{"panel":"concepts"}"#).unwrap();
            store.set("progress", "3").unwrap();
        }

        let reopened = JsonFileKv::open(&path).unwrap();
        assert_eq!(
            reopened.get("session:a").unwrap().as_deref(),
            Some(r#"{"panel":"concepts"}"#)
        );
        assert_eq!(reopened.keys("session:").unwrap(), vec!["session:a"]);
    }

    #[test]
    fn last_write_wins() {
        let store = MemoryKv::default();
        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn remove_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileKv::open(tmp.path().join("s.json")).unwrap();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }
}
