use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::models::{InteractionRecord, PairKey};

/// Settled result of one pair lookup. A key missing from the cache means the
/// pair has not been checked yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    /// The service answered and knows of no interaction.
    NoInteraction,
    Found(Arc<InteractionRecord>),
    /// The check itself failed (transport, malformed payload or timeout).
    LookupFailed(String),
}

impl CacheEntry {
    pub fn record(&self) -> Option<&InteractionRecord> {
        match self {
            CacheEntry::Found(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CacheEntry::LookupFailed(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionCache {
    entries: HashMap<PairKey, CacheEntry>,
}

impl InteractionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PairKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &PairKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: PairKey, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.insert(key, entry)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops every entry whose key is not in `keep`. Returns how many went.
    pub fn retain_keys(&mut self, keep: &HashSet<PairKey>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| keep.contains(key));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &CacheEntry)> {
        self.entries.iter()
    }
}
