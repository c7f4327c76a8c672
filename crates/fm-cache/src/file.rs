//! JSON file cache implementation.
//!
//! [`JsonFileCache`] keeps all entries of a build in memory and stores them in
//! a single JSON document on [`flush`](crate::Cache::flush):
//!
//! ```text
//! {"version": "0.3.0", "entries": {"en/post.html": "3f2a...", ...}}
//! ```
//!
//! On open, the stored `version` is compared with the expected one. A
//! mismatch, a missing file or an unreadable file all start an empty cache,
//! so stale data from other tool versions is never used.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Cache, CacheError};

/// On-disk layout of the cache file.
#[derive(Default, Serialize, Deserialize)]
struct CacheFile {
    version: String,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// File-backed [`Cache`] stored as one JSON document.
pub struct JsonFileCache {
    path: PathBuf,
    version: String,
    entries: BTreeMap<String, String>,
    alive: BTreeSet<String>,
}

impl JsonFileCache {
    /// Open the cache stored at `path`, validating its version.
    ///
    /// Errors while reading are logged but never fatal: the cache just starts
    /// empty.
    #[must_use]
    pub fn open(path: PathBuf, version: &str) -> Self {
        let entries = load_entries(&path, version);
        Self {
            path,
            version: version.to_owned(),
            entries,
            alive: BTreeSet::new(),
        }
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Cache for JsonFileCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.alive.insert(key.to_owned());
        self.entries.insert(key.to_owned(), value);
    }

    fn flush(&mut self) -> Result<(), CacheError> {
        let alive = &self.alive;
        self.entries.retain(|key, _| alive.contains(key));

        let file = CacheFile {
            version: self.version.clone(),
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string(&file)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)?;

        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "cache flushed");
        Ok(())
    }
}

/// Read stored entries, returning an empty map on any mismatch.
fn load_entries(path: &Path, version: &str) -> BTreeMap<String, String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => {
            tracing::info!("no cache file found, initializing cache");
            return BTreeMap::new();
        }
    };

    match serde_json::from_str::<CacheFile>(&content) {
        Ok(file) if file.version == version => {
            tracing::debug!("cache version matches: {version}");
            file.entries
        }
        Ok(file) => {
            tracing::info!(
                "cache version mismatch (stored={}, current={version}), wiping cache",
                file.version
            );
            BTreeMap::new()
        }
        Err(e) => {
            tracing::warn!("failed to parse cache file {}: {e}", path.display());
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get() {
        let tmp = TempDir::new().unwrap();
        let mut cache = JsonFileCache::open(tmp.path().join("pages.json"), "v1");

        cache.set("en/post.html", "hash1".to_owned());
        assert_eq!(cache.get("en/post.html"), Some("hash1".to_owned()));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_overwrite() {
        let tmp = TempDir::new().unwrap();
        let mut cache = JsonFileCache::open(tmp.path().join("pages.json"), "v1");

        cache.set("key", "first".to_owned());
        cache.set("key", "second".to_owned());

        assert_eq!(cache.get("key"), Some("second".to_owned()));
    }

    #[test]
    fn test_flush_persists_entries() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pages.json");

        let mut cache = JsonFileCache::open(path.clone(), "v1");
        cache.set("key", "value".to_owned());
        cache.flush().unwrap();

        let reopened = JsonFileCache::open(path, "v1");
        assert_eq!(reopened.get("key"), Some("value".to_owned()));
    }

    #[test]
    fn test_flush_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deeply/nested/pages.json");

        let mut cache = JsonFileCache::open(path.clone(), "v1");
        cache.set("key", "value".to_owned());
        cache.flush().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_flush_prunes_entries_not_set_in_this_build() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pages.json");

        let mut first = JsonFileCache::open(path.clone(), "v1");
        first.set("kept", "1".to_owned());
        first.set("deleted", "2".to_owned());
        first.flush().unwrap();

        // Second build only touches one of the pages
        let mut second = JsonFileCache::open(path.clone(), "v1");
        assert_eq!(second.get("deleted"), Some("2".to_owned()));
        second.set("kept", "1".to_owned());
        second.flush().unwrap();

        let third = JsonFileCache::open(path, "v1");
        assert_eq!(third.get("kept"), Some("1".to_owned()));
        assert_eq!(third.get("deleted"), None);
        assert_eq!(third.len(), 1);
    }

    #[test]
    fn test_version_mismatch_wipes_cache() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pages.json");

        let mut cache = JsonFileCache::open(path.clone(), "v1");
        cache.set("key", "will-be-wiped".to_owned());
        cache.flush().unwrap();

        let cache2 = JsonFileCache::open(path, "v2");
        assert_eq!(cache2.get("key"), None);
        assert!(cache2.is_empty());
    }

    #[test]
    fn test_corrupted_file_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pages.json");
        fs::write(&path, "{not json").unwrap();

        let cache = JsonFileCache::open(path, "v1");
        assert!(cache.is_empty());
    }
}
