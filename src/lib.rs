//! # accessgraph - Indexed IAM-style authorization
//!
//! `accessgraph` answers one question: may this principal perform this action
//! on this resource? Permissions flow through a graph:
//!
//! ```text
//! Principal ──groupIds──► Group ──policyIds──► Policy ──► [Statement]
//!                                                          effect: Allow | Deny
//!                                                          actions: {..}
//!                                                          resources: {..}
//! ```
//!
//! - **Indexed**: the graph is turned into id-keyed maps once per snapshot;
//!   a check only walks edges reachable from the requesting principal
//! - **Fail closed**: unknown principals, resources, actions and dangling
//!   references are ordinary denies, never errors
//! - **Explicit deny wins** over any allow, regardless of statement order
//! - **Exact matching**: actions and resources are compared as whole strings
//! - **Copy-on-write store** for publishing new snapshots under concurrent reads
//!
//! ## Quick Start
//!
//! ```rust
//! use accessgraph::{has_permission, Group, Policy, PolicyIndex, Principal, Statement};
//!
//! let index = PolicyIndex::build(
//!     vec![Principal::new("u3", ["g1", "g2"])],
//!     vec![Group::new("g1", ["p1"]), Group::new("g2", ["p2"])],
//!     vec![
//!         Policy::new("p1", [Statement::allow(["read"], ["doc:1"])]),
//!         Policy::new("p2", [Statement::allow(["write"], ["doc:2"])]),
//!     ],
//! );
//!
//! assert!(has_permission(&index, "u3", "doc:1", "read"));
//! assert!(has_permission(&index, "u3", "doc:2", "write"));
//! assert!(!has_permission(&index, "ghost", "doc:1", "read"));
//! ```
//!
//! ## Shared Store
//!
//! ```rust
//! use accessgraph::{AccessRequest, EngineConfig, PolicyStore, Snapshot};
//!
//! # fn main() -> accessgraph::Result<()> {
//! let store = PolicyStore::new(EngineConfig::from_toml_str("decision_cache_capacity = 256")?);
//!
//! store.load(Snapshot::from_json(r#"{
//!     "principals": [{ "id": "u1", "groupIds": ["g1"] }],
//!     "groups": [{ "id": "g1", "policyIds": ["p1"] }],
//!     "policies": [{ "id": "p1", "statements": [
//!         { "effect": "Allow", "actions": ["read"], "resources": ["doc:1"] }
//!     ] }]
//! }"#)?)?;
//!
//! store.authorize(&AccessRequest::new("u1", "doc:1", "read"))?;
//! assert!(store.authorize(&AccessRequest::new("u1", "doc:1", "write")).is_err());
//! # Ok(())
//! # }
//! ```

pub mod core;

// Re-export core modules internally so crate:: paths in core still work
#[allow(unused_imports)]
pub(crate) use crate::core::{config, error, iam};

pub use crate::core::{
    config::EngineConfig,
    error::{AccessError, Result},
    iam::{
        has_permission, AccessRequest, CacheStats, Decision, DecisionCache, Effect, Evaluator,
        Explanation, Group, IdSet, Identified, IndexStats, Policy, PolicyIndex, PolicyStore,
        Principal, Snapshot, Statement, StatementRef,
    },
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
