//! In-memory cache for loaded content collections.
//!
//! The cache is the shared store that the content loader writes into and
//! every other component reads from. It is not the source of truth: the
//! dataset files are. Dropping an entry only means the next load has to
//! fetch and parse that source again.
//!
//! # Scaling
//! There is no eviction policy. Entries live until they are explicitly
//! invalidated or the cache is dropped. That is fine for a few thousand
//! records per content type; a size bound would be needed if datasets grow
//! by orders of magnitude.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A string-keyed store holding at most one value per key.
///
/// All methods take `&self`, so a single instance can be wrapped in an
/// [`Arc`](std::sync::Arc) and handed to every consumer. Values are cloned
/// out on [`get()`](Self::get), so store cheap handles (e.g. `Arc<[T]>`)
/// rather than large owned data.
///
/// # Examples
///
/// ```
/// use wiki_cache::Cache;
///
/// let cache = Cache::new();
/// cache.set("content:events", 12);
/// cache.set("content:events", 14);
/// assert_eq!(cache.get("content:events"), Some(14));
///
/// assert!(cache.invalidate("content:events"));
/// assert!(!cache.has("content:events"));
/// ```
#[derive(Debug)]
pub struct Cache<V> {
    entries: RwLock<HashMap<String, V>>,
}
impl<V> Default for Cache<V> {
    fn default() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }
}
impl<V: Clone> Cache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock can't leave a half-written entry behind
    // (inserts and removals are single HashMap calls), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, V>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, V>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a clone of the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<V> {
        self.read().get(key).cloned()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let replaced = self.write().insert(key.clone(), value).is_some();
        tracing::debug!(key, replaced, "cache entry set");
    }

    pub fn has(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Removes the entry for `key`. Returns `true` if there was one.
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.write().remove(key).is_some();
        if removed {
            tracing::debug!(key, "cache entry invalidated");
        }
        removed
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let mut entries = self.write();
        let count = entries.len();
        entries.clear();
        tracing::debug!(count, "cache cleared");
    }

    /// All keys currently stored, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
