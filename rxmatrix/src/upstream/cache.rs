use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Thread-safe LRU cache for upstream lookup results.
///
/// Shared by all gateway handlers through `Arc<Mutex<>>`. Keys are the
/// normalized query or the pair key of the lookup.
#[derive(Clone)]
pub struct UpstreamCache<V: Clone> {
    cache: Arc<Mutex<LruCache<String, V>>>,
}

impl<V: Clone> UpstreamCache<V> {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.lock().get(key).cloned()
    }

    /// Least recently used entry is evicted when full.
    pub fn put(&self, key: String, value: V) {
        self.lock().put(key, value);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, V>> {
        // A panic mid-insert leaves the LRU structurally valid.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Cache key for a free-text query: trimmed and lowercased.
pub fn query_key(query: &str) -> String {
    query.trim().to_lowercase()
}
