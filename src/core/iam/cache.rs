//! LRU cache for access decisions
//!
//! One cache belongs to one index snapshot. It is dropped together with the
//! snapshot on a swap, so it never serves a decision from an older graph.

use super::decision::Decision;
use super::request::AccessRequest;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache key for a decision
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    principal: String,
    resource: String,
    action: String,
}

impl CacheKey {
    fn from_request(request: &AccessRequest<'_>) -> Self {
        CacheKey {
            principal: request.principal_id.to_string(),
            resource: request.resource.to_string(),
            action: request.action.to_string(),
        }
    }
}

/// Hit/miss counters and occupancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

/// LRU cache of decisions; a capacity of 0 disables it
pub struct DecisionCache {
    cache: Option<LruCache<CacheKey, Decision>>,
    hits: u64,
    misses: u64,
}

impl DecisionCache {
    pub fn new(capacity: usize) -> Self {
        DecisionCache {
            cache: NonZeroUsize::new(capacity).map(LruCache::new),
            hits: 0,
            misses: 0,
        }
    }

    /// Get cached decision
    pub fn get(&mut self, request: &AccessRequest<'_>) -> Option<Decision> {
        let cache = self.cache.as_mut()?;
        match cache.get(&CacheKey::from_request(request)).copied() {
            Some(decision) => {
                self.hits += 1;
                Some(decision)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Put decision in cache
    pub fn put(&mut self, request: &AccessRequest<'_>, decision: Decision) {
        if let Some(cache) = self.cache.as_mut() {
            cache.put(CacheKey::from_request(request), decision);
        }
    }

    pub fn clear(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.len(),
            capacity: self.cache.as_ref().map_or(0, |c| c.cap().get()),
        }
    }
}
