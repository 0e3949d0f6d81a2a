//! Key-value cache scoped to one backend instance.
//!
//! The host expects backends to persist small scalar values (model version,
//! training markers, the label schema) between invocations. Keys are plain
//! strings; concurrency discipline across processes is the host's concern.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{BackendError, BackendResult};

/// String key-value store.
pub trait KvCache: Send + Sync {
    /// Read a value, `None` when the key has never been set.
    fn get(&self, key: &str) -> BackendResult<Option<String>>;

    /// Write a value, overwriting any previous one.
    fn set(&self, key: &str, value: &str) -> BackendResult<()>;
}

/// SQLite-backed cache, one file per backend instance.
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Open (or create) the cache database at the given path.
    pub fn open(path: impl AsRef<Path>) -> BackendResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;
        debug!(path = %path.display(), "Opened cache database");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KvCache for SqliteCache {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| BackendError::internal("Cache lock poisoned"))?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| BackendError::internal("Cache lock poisoned"))?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }
}

/// In-memory cache for tests.
#[derive(Default)]
pub struct MemoryCache {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvCache for MemoryCache {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let map = self
            .map
            .lock()
            .map_err(|_| BackendError::internal("Cache lock poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| BackendError::internal("Cache lock poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SqliteCache::open(dir.path().join("cache.db")).unwrap();

        assert_eq!(cache.get("model_version").unwrap(), None);
        cache.set("model_version", "0.0.1").unwrap();
        assert_eq!(
            cache.get("model_version").unwrap(),
            Some("0.0.1".to_string())
        );
    }

    #[test]
    fn test_sqlite_cache_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SqliteCache::open(dir.path().join("cache.db")).unwrap();

        cache.set("train_data", "first").unwrap();
        cache.set("train_data", "second").unwrap();
        assert_eq!(cache.get("train_data").unwrap(), Some("second".to_string()));
    }

    #[test]
    fn test_sqlite_cache_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        {
            let cache = SqliteCache::open(&path).unwrap();
            cache.set("model_version", "0.0.1").unwrap();
        }
        let cache = SqliteCache::open(&path).unwrap();
        assert_eq!(
            cache.get("model_version").unwrap(),
            Some("0.0.1".to_string())
        );
    }

    #[test]
    fn test_memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("k").unwrap(), None);
        cache.set("k", "v").unwrap();
        cache.set("k", "v2").unwrap();
        assert_eq!(cache.get("k").unwrap(), Some("v2".to_string()));
    }
}
