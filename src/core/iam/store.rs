//! Copy-on-write holder of the current policy index
//!
//! Readers clone the current `Arc` under a short read lock and evaluate
//! without holding any lock. A rebuild constructs the new index outside the
//! read/write lock and swaps it in; checks already running finish against the
//! snapshot they started with. Rebuilds are serialized with each other, so
//! they publish in the order they started.
//!
//! Each snapshot carries its own decision cache and generation number.

use super::cache::{CacheStats, DecisionCache};
use super::decision::{Decision, Explanation};
use super::evaluator::Evaluator;
use super::index::PolicyIndex;
use super::model::{Group, Policy, Principal};
use super::request::AccessRequest;
use super::snapshot::Snapshot;
use crate::config::EngineConfig;
use crate::error::Result;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{info, trace};

/// One published index with its cache
struct Loaded {
    index: Arc<PolicyIndex>,
    generation: u64,
    cache: Mutex<DecisionCache>,
}

impl Loaded {
    fn new(index: Arc<PolicyIndex>, generation: u64, cache_capacity: usize) -> Self {
        Loaded {
            index,
            generation,
            cache: Mutex::new(DecisionCache::new(cache_capacity)),
        }
    }
}

/// Thread-safe, swappable policy index
///
/// # Examples
///
/// ```
/// use accessgraph::{Group, Policy, PolicyStore, Principal, Statement};
///
/// let store = PolicyStore::default();
/// assert!(!store.has_permission("u1", "doc:1", "read"));
///
/// store.rebuild(
///     vec![Principal::new("u1", ["g1"])],
///     vec![Group::new("g1", ["p1"])],
///     vec![Policy::new("p1", [Statement::allow(["read"], ["doc:1"])])],
/// )?;
///
/// assert!(store.has_permission("u1", "doc:1", "read"));
/// assert_eq!(store.generation(), 1);
/// # Ok::<(), accessgraph::AccessError>(())
/// ```
pub struct PolicyStore {
    config: EngineConfig,
    current: RwLock<Arc<Loaded>>,
    /// Held for the whole build-and-publish of a rebuild
    rebuild_lock: Mutex<()>,
}

impl PolicyStore {
    /// Create a store holding an empty index (every check is a Deny)
    pub fn new(config: EngineConfig) -> Self {
        let loaded = Loaded::new(
            Arc::new(PolicyIndex::empty()),
            0,
            config.decision_cache_capacity,
        );
        PolicyStore {
            config,
            current: RwLock::new(Arc::new(loaded)),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Create a store publishing `index` as generation 0
    pub fn with_index(config: EngineConfig, index: impl Into<Arc<PolicyIndex>>) -> Self {
        let loaded = Loaded::new(index.into(), 0, config.decision_cache_capacity);
        PolicyStore {
            config,
            current: RwLock::new(Arc::new(loaded)),
            rebuild_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn loaded(&self) -> Arc<Loaded> {
        Arc::clone(&self.current.read())
    }

    /// The index checks currently run against
    pub fn current(&self) -> Arc<PolicyIndex> {
        Arc::clone(&self.loaded().index)
    }

    /// Number of swaps since the store was created
    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }

    /// Publish a caller-built index, returning its generation
    ///
    /// Indexes are published in call order. Callers that build indexes on
    /// several threads and need the newest to win should go through
    /// [`PolicyStore::rebuild`] instead.
    pub fn replace(&self, index: impl Into<Arc<PolicyIndex>>) -> u64 {
        let index = index.into();
        let stats = index.stats();

        let mut current = self.current.write();
        let generation = current.generation + 1;
        *current = Arc::new(Loaded::new(
            index,
            generation,
            self.config.decision_cache_capacity,
        ));
        drop(current);

        info!(
            "Published policy index generation {} ({} principals, {} policies)",
            generation, stats.principals, stats.policies
        );
        generation
    }

    /// Build a new index from the collections and publish it
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` when `reject_duplicate_ids` is set and a
    /// collection repeats an id. The current index stays published.
    pub fn rebuild<P, G, Q>(&self, principals: P, groups: G, policies: Q) -> Result<u64>
    where
        P: IntoIterator,
        P::Item: Into<Arc<Principal>>,
        G: IntoIterator,
        G::Item: Into<Arc<Group>>,
        Q: IntoIterator,
        Q::Item: Into<Arc<Policy>>,
    {
        // A slow build of an older snapshot must not overwrite a newer one
        let _serial = self.rebuild_lock.lock();

        let index = if self.config.reject_duplicate_ids {
            PolicyIndex::try_build(principals, groups, policies)?
        } else {
            PolicyIndex::build(principals, groups, policies)
        };
        Ok(self.replace(index))
    }

    /// Build and publish an index from a snapshot document
    pub fn load(&self, snapshot: Snapshot) -> Result<u64> {
        self.rebuild(snapshot.principals, snapshot.groups, snapshot.policies)
    }

    /// Evaluate a request against the current index
    pub fn check(&self, request: &AccessRequest<'_>) -> Result<Decision> {
        request.validate()?;

        let loaded = self.loaded();
        if let Some(decision) = loaded.cache.lock().get(request) {
            trace!(
                "Decision cache hit for '{}' on '{}' ({})",
                request.principal_id,
                request.resource,
                request.action
            );
            return Ok(decision);
        }

        let decision = Evaluator::decide(&loaded.index, request);
        loaded.cache.lock().put(request, decision);
        Ok(decision)
    }

    /// Boolean check; malformed requests are `false`
    pub fn has_permission(&self, principal_id: &str, resource: &str, action: &str) -> bool {
        self.check(&AccessRequest::new(principal_id, resource, action))
            .map(Decision::is_allowed)
            .unwrap_or(false)
    }

    /// Check and convert a deny into a generic `AccessDenied` error
    pub fn authorize(&self, request: &AccessRequest<'_>) -> Result<()> {
        self.check(request)?.into_result()
    }

    /// Explain a decision against the current index (bypasses the cache)
    pub fn explain(&self, request: &AccessRequest<'_>) -> Result<Explanation> {
        Evaluator::explain(&self.current(), request)
    }

    /// Cache counters for the current generation
    pub fn cache_stats(&self) -> CacheStats {
        self.loaded().cache.lock().stats()
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
