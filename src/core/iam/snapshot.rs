//! Serializable policy-graph snapshot
//!
//! Bundles the three collections the caller supplies into one JSON document:
//!
//! ```json
//! {
//!   "principals": [{ "id": "u1", "groupIds": ["g1"] }],
//!   "groups":     [{ "id": "g1", "policyIds": ["p1"] }],
//!   "policies":   [{ "id": "p1", "statements": [
//!       { "effect": "Allow", "actions": ["read"], "resources": ["doc:1"] }
//!   ] }]
//! }
//! ```

use super::index::PolicyIndex;
use super::model::{Group, Identified, Policy, Principal};
use crate::error::{AccessError, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The caller-supplied collections of one policy graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub principals: Vec<Principal>,
    pub groups: Vec<Group>,
    pub policies: Vec<Policy>,
}

impl Snapshot {
    pub fn new(principals: Vec<Principal>, groups: Vec<Group>, policies: Vec<Policy>) -> Self {
        Snapshot {
            principals,
            groups,
            policies,
        }
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize snapshot to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate entity structure
    ///
    /// Rejects empty ids and statements without actions or resources.
    /// Dangling references and duplicate ids are not checked here: the first
    /// is a normal Deny, the second is handled by the index build.
    pub fn validate(&self) -> Result<()> {
        for principal in &self.principals {
            check_entity(principal)?;
        }
        for group in &self.groups {
            check_entity(group)?;
        }
        for policy in &self.policies {
            check_entity(policy)?;
            if let Some(position) = policy.first_malformed_statement() {
                return Err(AccessError::InvalidEntity(format!(
                    "policy '{}' statement {} has no actions or no resources",
                    policy.id(),
                    position
                )));
            }
        }
        Ok(())
    }

    /// Build an index over this snapshot (repeated ids are merged)
    pub fn build_index(self) -> PolicyIndex {
        PolicyIndex::build(self.principals, self.groups, self.policies)
    }

    /// Build an index, rejecting repeated ids
    pub fn try_build_index(self) -> Result<PolicyIndex> {
        PolicyIndex::try_build(self.principals, self.groups, self.policies)
    }
}

fn check_entity<T: Validate + Identified>(entity: &T) -> Result<()> {
    entity.validate().map_err(|e| {
        AccessError::InvalidEntity(format!("{} '{}': {}", T::KIND, entity.id(), e))
    })
}
