// src/index_cache.rs
//
// First-seen token index caches for index-mode encoding.
//
// Each adapter kind owns one process-wide cache: the first time a token is
// seen it is assigned the next contiguous id, and that assignment is never
// changed or removed for the lifetime of the process. Multiple adapter
// instances of the same kind share one cache, so the cache is held behind
// Arc<Mutex<_>> and its lifecycle (reset between runs, cross-worker
// sharing) stays caller-controlled.
//
// Ids are not persisted: a restart produces a fresh cache, so any learned
// mapping over indices is only consistent within one run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::AdapterKind;

/// Stable token -> id mapping, assigned in first-seen order.
#[derive(Debug, Default)]
pub struct IndexCache {
    ids: HashMap<String, u32>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `token`, assigning the next contiguous id on a miss.
    ///
    /// Idempotent: repeated lookups of the same token return the same id.
    pub fn get_or_assign(&mut self, token: &str) -> u32 {
        if let Some(id) = self.ids.get(token) {
            return *id;
        }
        let id = self.ids.len() as u32;
        self.ids.insert(token.to_string(), id);
        id
    }

    /// Number of distinct tokens seen so far.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Shared handle to one adapter kind's cache.
///
/// Single-writer by assumption (one environment driver at a time); the lock
/// makes concurrent drivers safe if a caller chooses to share caches.
pub type SharedIndexCache = Arc<Mutex<IndexCache>>;

/// Registry of per-adapter-kind caches for one run.
#[derive(Debug, Default)]
pub struct IndexCacheSet {
    caches: HashMap<AdapterKind, SharedIndexCache>,
}

impl IndexCacheSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the cache for `kind`, created empty on first request.
    pub fn cache_for(&mut self, kind: AdapterKind) -> SharedIndexCache {
        self.caches
            .entry(kind)
            .or_insert_with(|| Arc::new(Mutex::new(IndexCache::new())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_contiguous_first_seen() {
        let mut cache = IndexCache::new();
        assert_eq!(cache.get_or_assign("a"), 0);
        assert_eq!(cache.get_or_assign("b"), 1);
        assert_eq!(cache.get_or_assign("c"), 2);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_get_or_assign_idempotent() {
        let mut cache = IndexCache::new();
        let first = cache.get_or_assign("token");
        for _ in 0..10 {
            assert_eq!(cache.get_or_assign("token"), first);
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_set_shares_per_kind() {
        let mut set = IndexCacheSet::new();
        let a = set.cache_for(AdapterKind::BoardLanguage);
        let b = set.cache_for(AdapterKind::BoardLanguage);
        a.lock().unwrap().get_or_assign("shared");
        assert_eq!(b.lock().unwrap().get_or_assign("shared"), 0);

        // A different kind gets an independent cache.
        let c = set.cache_for(AdapterKind::PriorActions);
        assert_eq!(c.lock().unwrap().get_or_assign("shared"), 0);
        assert_eq!(a.lock().unwrap().len(), 1);
    }
}
