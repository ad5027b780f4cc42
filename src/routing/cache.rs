//! On-disk cache of resolved routing numbers.
//!
//! The file is a JSON object keyed by lower-cased bank name:
//! `{"chase": {"routing_number": "021000021", "timestamp": 1700000000}}`.
//! It is read whole and rewritten whole; there is no locking, so a single
//! writer process is assumed.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

/// Default cache file name, relative to the working directory.
pub const DEFAULT_PATH: &str = "routing_number_cache.json";

/// Entries older than this are treated as absent.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] io::Error),

    #[error("cache encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub routing_number: String,
    /// Unix epoch seconds at which the entry was stored.
    pub timestamp: i64,
}

impl CacheEntry {
    /// Entry stamped with the current time.
    pub fn now(routing_number: impl Into<String>) -> Self {
        Self {
            routing_number: routing_number.into(),
            timestamp: Utc::now().timestamp(),
        }
    }
}

pub type CacheEntries = BTreeMap<String, CacheEntry>;

#[derive(Debug, Clone)]
pub struct RoutingCache {
    path: PathBuf,
    ttl: Duration,
}

impl RoutingCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cache, dropping stale entries.
    ///
    /// A missing file is an empty cache. An unreadable or unparseable file is
    /// logged and also treated as empty.
    pub async fn load(&self) -> CacheEntries {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return CacheEntries::new(),
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "failed to read routing cache");
                return CacheEntries::new();
            }
        };

        let mut entries: CacheEntries = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "failed to parse routing cache");
                return CacheEntries::new();
            }
        };

        let now = Utc::now().timestamp();
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        if entries.len() < before {
            debug!(purged = before - entries.len(), "dropped expired routing cache entries");
        }
        entries
    }

    /// Rewrite the whole cache file.
    pub async fn save(&self, entries: &CacheEntries) -> Result<(), CacheError> {
        let raw = serde_json::to_string(entries)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }

    fn is_fresh(&self, entry: &CacheEntry, now: i64) -> bool {
        let age = now.saturating_sub(entry.timestamp);
        // timestamps from the future count as fresh
        age < 0 || (age as u64) < self.ttl.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir) -> RoutingCache {
        RoutingCache::new(dir.path().join("cache.json"), DEFAULT_TTL)
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(cache_in(&dir).load().await.is_empty());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        let mut entries = CacheEntries::new();
        entries.insert("chase".to_string(), CacheEntry::now("021000021"));
        cache.save(&entries).await.unwrap();

        assert_eq!(cache.load().await, entries);
    }

    #[tokio::test]
    async fn stale_entries_are_dropped() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let now = Utc::now().timestamp();

        let mut entries = CacheEntries::new();
        entries.insert(
            "fresh".to_string(),
            CacheEntry {
                routing_number: "021000021".to_string(),
                timestamp: now - 60,
            },
        );
        entries.insert(
            "stale".to_string(),
            CacheEntry {
                routing_number: "011000015".to_string(),
                timestamp: now - 25 * 60 * 60,
            },
        );
        cache.save(&entries).await.unwrap();

        let loaded = cache.load().await;
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("fresh"));
    }

    #[tokio::test]
    async fn corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        tokio::fs::write(cache.path(), "{not json").await.unwrap();

        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn wrong_shape_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        tokio::fs::write(cache.path(), r#"{"chase": "021000021"}"#)
            .await
            .unwrap();

        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let cache = RoutingCache::new(dir.path().join("nope").join("cache.json"), DEFAULT_TTL);

        let result = cache.save(&CacheEntries::new()).await;
        assert!(matches!(result, Err(CacheError::Io(_))));
    }

    #[test]
    fn file_format() {
        let mut entries = CacheEntries::new();
        entries.insert(
            "chase".to_string(),
            CacheEntry {
                routing_number: "021000021".to_string(),
                timestamp: 1_700_000_000,
            },
        );
        assert_eq!(
            serde_json::to_string(&entries).unwrap(),
            r#"{"chase":{"routing_number":"021000021","timestamp":1700000000}}"#
        );
    }
}
