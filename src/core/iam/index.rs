//! Precomputed adjacency index over one policy-graph snapshot
//!
//! Turns the flat principal/group/policy collections into id-keyed maps so a
//! check only touches the edges reachable from the requesting principal:
//!
//! ```text
//! principal id ──► group ids ──► policy ids ──► statements
//! ```
//!
//! Entities are held behind `Arc`, so an index built from `Arc`-shared
//! collections shares them instead of copying. Dangling references are kept
//! as-is and simply resolve to nothing.

use super::model::{Effect, Group, IdSet, Identified, Policy, Principal, Statement};
use crate::error::{AccessError, Result};
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Counters collected while building an index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub principals: usize,
    pub groups: usize,
    pub policies: usize,
    pub statements: usize,
    pub deny_statements: usize,
    /// Principal → group edges whose group is absent
    pub dangling_group_refs: usize,
    /// Group → policy edges whose policy is absent
    pub dangling_policy_refs: usize,
}

/// Id-keyed lookup structure for one snapshot
#[derive(Debug, Clone, Default)]
pub struct PolicyIndex {
    principals: AHashMap<String, Arc<Principal>>,
    groups: AHashMap<String, Arc<Group>>,
    policies: AHashMap<String, Arc<Policy>>,
    stats: IndexStats,
}

/// Key entities by id, merging every later occurrence of an id into the
/// first. Returns the map and the ids that were seen more than once.
fn index_by_id<T, I>(items: I) -> (AHashMap<String, Arc<T>>, Vec<String>)
where
    T: Identified + Clone,
    I: IntoIterator,
    I::Item: Into<Arc<T>>,
{
    let items = items.into_iter();
    let mut map: AHashMap<String, Arc<T>> = AHashMap::with_capacity(items.size_hint().0);
    let mut duplicates = Vec::new();

    for item in items {
        let item: Arc<T> = item.into();
        match map.get_mut(item.id()) {
            Some(existing) => {
                duplicates.push(item.id().to_string());
                Arc::make_mut(existing).absorb(&item);
            }
            None => {
                map.insert(item.id().to_string(), item);
            }
        }
    }

    (map, duplicates)
}

impl PolicyIndex {
    /// An index with no entities; every check against it is a Deny
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an index from the three collections
    ///
    /// Never fails. When an id occurs more than once in a collection the
    /// entities are merged: group and policy references are unioned and
    /// policy statements concatenated, so a repeated record can only add
    /// edges and Deny statements, never hide them.
    ///
    /// # Examples
    ///
    /// ```
    /// use accessgraph::{has_permission, Group, Policy, PolicyIndex, Principal, Statement};
    ///
    /// let index = PolicyIndex::build(
    ///     vec![Principal::new("u1", ["g1"])],
    ///     vec![Group::new("g1", ["p1"])],
    ///     vec![Policy::new("p1", [Statement::allow(["read"], ["doc:1"])])],
    /// );
    ///
    /// assert!(has_permission(&index, "u1", "doc:1", "read"));
    /// assert!(!has_permission(&index, "u1", "doc:1", "write"));
    /// ```
    pub fn build<P, G, Q>(principals: P, groups: G, policies: Q) -> Self
    where
        P: IntoIterator,
        P::Item: Into<Arc<Principal>>,
        G: IntoIterator,
        G::Item: Into<Arc<Group>>,
        Q: IntoIterator,
        Q::Item: Into<Arc<Policy>>,
    {
        let (principals, dup_principals) = index_by_id(principals);
        let (groups, dup_groups) = index_by_id(groups);
        let (policies, dup_policies) = index_by_id(policies);

        for (kind, ids) in [
            (Principal::KIND, &dup_principals),
            (Group::KIND, &dup_groups),
            (Policy::KIND, &dup_policies),
        ] {
            for id in ids {
                warn!("Merging duplicate {} id '{}'", kind, id);
            }
        }

        Self::assemble(principals, groups, policies)
    }

    /// Strict variant of [`PolicyIndex::build`]: a repeated id is an error
    pub fn try_build<P, G, Q>(principals: P, groups: G, policies: Q) -> Result<Self>
    where
        P: IntoIterator,
        P::Item: Into<Arc<Principal>>,
        G: IntoIterator,
        G::Item: Into<Arc<Group>>,
        Q: IntoIterator,
        Q::Item: Into<Arc<Policy>>,
    {
        let (principals, dup_principals) = index_by_id(principals);
        let (groups, dup_groups) = index_by_id(groups);
        let (policies, dup_policies) = index_by_id(policies);

        for (kind, ids) in [
            (Principal::KIND, dup_principals),
            (Group::KIND, dup_groups),
            (Policy::KIND, dup_policies),
        ] {
            if let Some(id) = ids.into_iter().next() {
                return Err(AccessError::DuplicateId { kind, id });
            }
        }

        Ok(Self::assemble(principals, groups, policies))
    }

    fn assemble(
        principals: AHashMap<String, Arc<Principal>>,
        groups: AHashMap<String, Arc<Group>>,
        policies: AHashMap<String, Arc<Policy>>,
    ) -> Self {
        let mut stats = IndexStats {
            principals: principals.len(),
            groups: groups.len(),
            policies: policies.len(),
            ..IndexStats::default()
        };

        for principal in principals.values() {
            stats.dangling_group_refs += principal
                .group_ids()
                .iter()
                .filter(|id| !groups.contains_key(id.as_str()))
                .count();
        }

        for group in groups.values() {
            stats.dangling_policy_refs += group
                .policy_ids()
                .iter()
                .filter(|id| !policies.contains_key(id.as_str()))
                .count();
        }

        for policy in policies.values() {
            stats.statements += policy.statements().len();
            stats.deny_statements += policy
                .statements()
                .iter()
                .filter(|s| s.effect() == Effect::Deny)
                .count();
        }

        info!(
            "Built policy index: {} principals, {} groups, {} policies, {} statements ({} deny)",
            stats.principals, stats.groups, stats.policies, stats.statements, stats.deny_statements
        );

        if stats.dangling_group_refs > 0 || stats.dangling_policy_refs > 0 {
            warn!(
                "Policy index has {} dangling group refs and {} dangling policy refs",
                stats.dangling_group_refs, stats.dangling_policy_refs
            );
        }

        PolicyIndex {
            principals,
            groups,
            policies,
            stats,
        }
    }

    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty() && self.groups.is_empty() && self.policies.is_empty()
    }

    /// Whether any policy in the snapshot carries an explicit Deny
    pub fn has_deny(&self) -> bool {
        self.stats.deny_statements > 0
    }

    /// Groups of a principal; `None` for an unknown principal
    pub fn group_ids(&self, principal_id: &str) -> Option<&IdSet> {
        self.principals.get(principal_id).map(|p| p.group_ids())
    }

    /// Policies attached to a group; `None` for an unknown group
    pub fn policy_ids(&self, group_id: &str) -> Option<&IdSet> {
        self.groups.get(group_id).map(|g| g.policy_ids())
    }

    /// Statements of a policy; `None` for an unknown policy
    pub fn statements(&self, policy_id: &str) -> Option<&[Statement]> {
        self.policies.get(policy_id).map(|p| p.statements())
    }

    pub fn principal(&self, id: &str) -> Option<&Arc<Principal>> {
        self.principals.get(id)
    }

    pub fn group(&self, id: &str) -> Option<&Arc<Group>> {
        self.groups.get(id)
    }

    pub fn policy(&self, id: &str) -> Option<&Arc<Policy>> {
        self.policies.get(id)
    }

    /// Every policy reachable from a principal, each at most once
    ///
    /// Dangling group and policy ids are skipped. Order is unspecified.
    pub fn reachable_policies(&self, principal_id: &str) -> Vec<&Policy> {
        let Some(group_ids) = self.group_ids(principal_id) else {
            return Vec::new();
        };

        let mut seen: AHashSet<&str> = AHashSet::new();
        let mut reachable = Vec::new();

        for group_id in group_ids {
            let Some(policy_ids) = self.policy_ids(group_id) else {
                continue;
            };

            for policy_id in policy_ids {
                if !seen.insert(policy_id.as_str()) {
                    continue;
                }
                if let Some(policy) = self.policies.get(policy_id.as_str()) {
                    reachable.push(policy.as_ref());
                }
            }
        }

        reachable
    }

    /// `(action, resource)` pairs a principal is granted
    ///
    /// Collects the pairs of every reachable Allow statement, drops pairs that
    /// a reachable Deny statement also matches, and returns them sorted.
    pub fn capabilities(&self, principal_id: &str) -> Vec<(&str, &str)> {
        let policies = self.reachable_policies(principal_id);
        let statements = || policies.iter().copied().flat_map(|p| p.statements().iter());

        let mut granted: BTreeSet<(&str, &str)> = BTreeSet::new();
        for statement in statements().filter(|s| s.effect() == Effect::Allow) {
            for action in statement.actions() {
                for resource in statement.resources() {
                    granted.insert((action.as_str(), resource.as_str()));
                }
            }
        }

        granted
            .into_iter()
            .filter(|(action, resource)| {
                !statements()
                    .any(|s| s.effect() == Effect::Deny && s.matches(resource, action))
            })
            .collect()
    }
}
