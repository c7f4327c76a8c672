//! Build cache abstraction for fledermaus.
//!
//! A [`Cache`] is a flat string key-value store whose lifetime is exactly one
//! build invocation:
//!
//! 1. Open the cache (e.g. [`JsonFileCache::open`]).
//! 2. Read entries with [`Cache::get`], record fresh values with [`Cache::set`].
//! 3. Call [`Cache::flush`] once at the end of the build.
//!
//! Entries that were not `set` during the build are considered dead (their
//! source was deleted) and are dropped on flush.
//!
//! # Implementations
//!
//! - [`NullCache`]: No-op implementation (always misses, flush does nothing)
//! - [`JsonFileCache`]: Single JSON file with version validation
//!
//! # Example
//!
//! ```
//! use fm_cache::{Cache, NullCache};
//!
//! let mut cache = NullCache;
//! cache.set("en/post.html", "3f2a".to_owned());
//! assert_eq!(cache.get("en/post.html"), None); // NullCache always misses
//! cache.flush().unwrap();
//! ```

mod file;
pub use file::JsonFileCache;

/// Error returned when a cache cannot be persisted.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// I/O error while writing the cache file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Cache contents could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key-value store scoped to one build.
pub trait Cache {
    /// Retrieve the value stored for `key` by a previous build or earlier in
    /// this build.
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value, marking `key` as alive for this build.
    ///
    /// Overwrites any existing entry for the same key.
    fn set(&mut self, key: &str, value: String);

    /// Persist the cache, dropping entries not set during this build.
    fn flush(&mut self) -> Result<(), CacheError>;
}

/// No-op [`Cache`] that never stores or retrieves data.
///
/// Use when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, _key: &str, _value: String) {}

    fn flush(&mut self) -> Result<(), CacheError> {
        Ok(())
    }
}
