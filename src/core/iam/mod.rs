//! Identity and Access Management (IAM) evaluation
//!
//! Decides whether a principal may perform an action on a resource, given a
//! principal → group → policy → statement graph:
//! - Immutable entity model with validated construction
//! - Precomputed id index, built once per snapshot
//! - Allow/Deny statements with explicit deny precedence
//! - Exact action/resource matching (no wildcards)
//! - Copy-on-write store with a per-snapshot LRU decision cache

mod cache;
mod decision;
mod evaluator;
mod index;
mod model;
mod request;
mod snapshot;
mod store;

pub use cache::{CacheStats, DecisionCache};
pub use decision::{Decision, Explanation, StatementRef};
pub use evaluator::{has_permission, Evaluator};
pub use index::{IndexStats, PolicyIndex};
pub use model::{Effect, Group, IdSet, Identified, Policy, Principal, Statement};
pub use request::AccessRequest;
pub use snapshot::Snapshot;
pub use store::PolicyStore;

#[cfg(test)]
mod tests;
