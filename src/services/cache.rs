// src/services/cache.rs
use chrono::{DateTime, Duration, Utc};
use log::{error, warn};
use serde::{Serialize, Deserialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Abstract get/set-with-ttl capability. The projection engine depends on
/// this trait only, so the file-backed store can be swapped for a
/// networked cache without touching the orchestrator.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key is absent or its
    /// entry has expired.
    fn get(&self, key: &str) -> Option<Value>;

    /// Inserts or overwrites the entry with a fresh expiry.
    fn set(&self, key: &str, value: Value, ttl_seconds: i64);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: Value,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(value: Value, ttl_seconds: i64) -> Self {
        Self {
            value,
            expires_at: Utc::now() + Duration::seconds(ttl_seconds),
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// TTL cache persisted to a single JSON file. The whole mapping is
/// rewritten on every mutation; a corrupt or missing file degrades to an
/// empty cache at load.
pub struct FileCache {
    path: PathBuf,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path);
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    fn load(path: &Path) -> HashMap<String, CacheEntry> {
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        "Cache file {} is unreadable ({}), starting cold",
                        path.display(),
                        e
                    );
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        }
    }

    /// Write the whole mapping out. Failures are logged and swallowed;
    /// the in-memory state stays authoritative for the process lifetime.
    fn persist(&self, entries: &HashMap<String, CacheEntry>) {
        let payload = match serde_json::to_string(entries) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to serialize cache store: {}", e);
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, payload) {
            error!("Failed to persist cache to {}: {}", self.path.display(), e);
        }
    }
}

impl KeyValueStore for FileCache {
    fn get(&self, key: &str) -> Option<Value> {
        {
            let entries = self.entries.read().unwrap();
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        // Expired: re-check under the write lock so the evict-and-persist
        // sequence runs at most once per entry across racing readers.
        let mut entries = self.entries.write().unwrap();
        if let Some(entry) = entries.get(key) {
            if !entry.is_expired() {
                return Some(entry.value.clone());
            }
            entries.remove(key);
            self.persist(&entries);
        }
        None
    }

    fn set(&self, key: &str, value: Value, ttl_seconds: i64) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_string(), CacheEntry::new(value, ttl_seconds));
        self.persist(&entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir) -> FileCache {
        FileCache::new(dir.path().join("cache_store.json"))
    }

    #[test]
    fn set_and_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        cache.set("key1", json!({"mu": 0.08, "sigma": 0.15}), 60);
        assert_eq!(cache.get("key1"), Some(json!({"mu": 0.08, "sigma": 0.15})));
    }

    #[test]
    fn get_missing_key_is_absent() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        cache.set("key1", json!(1), 60);
        cache.set("key1", json!(2), 60);
        assert_eq!(cache.get("key1"), Some(json!(2)));
    }

    #[test]
    fn entries_expire_after_ttl() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        cache.set("key1", json!("v"), 1);
        assert!(cache.get("key1").is_some());

        sleep(Duration::from_millis(1100));
        assert_eq!(cache.get("key1"), None);
    }

    #[test]
    fn store_survives_reload_from_disk() {
        let dir = TempDir::new().unwrap();
        {
            let cache = cache_in(&dir);
            cache.set("key1", json!([1, 2, 3]), 60);
        }

        let reloaded = cache_in(&dir);
        assert_eq!(reloaded.get("key1"), Some(json!([1, 2, 3])));
    }

    #[test]
    fn expired_entries_are_evicted_from_disk_too() {
        let dir = TempDir::new().unwrap();
        {
            let cache = cache_in(&dir);
            cache.set("key1", json!("v"), 1);
            sleep(Duration::from_millis(1100));
            assert_eq!(cache.get("key1"), None);
        }

        let reloaded = cache_in(&dir);
        assert_eq!(reloaded.get("key1"), None);
    }

    #[test]
    fn corrupt_file_degrades_to_cold_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache_store.json");
        fs::write(&path, "definitely not json").unwrap();

        let cache = FileCache::new(&path);
        assert_eq!(cache.get("anything"), None);

        // And the store is usable afterwards.
        cache.set("key1", json!(true), 60);
        assert_eq!(cache.get("key1"), Some(json!(true)));
    }

    #[test]
    fn persistence_failure_keeps_memory_authoritative() {
        let dir = TempDir::new().unwrap();
        // Parent directory does not exist, so every write fails.
        let cache = FileCache::new(dir.path().join("missing").join("cache_store.json"));

        cache.set("key1", json!("v"), 60);
        assert_eq!(cache.get("key1"), Some(json!("v")));
    }
}
