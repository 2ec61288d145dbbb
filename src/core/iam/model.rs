//! Entity model for the authorization graph
//!
//! Principals belong to groups, groups attach policies, and policies hold
//! ordered statements. Every entity is immutable once constructed: fields are
//! private and only exposed through read-only accessors.
//!
//! Serialized field names follow the caller-facing shape
//! (`groupIds`, `policyIds`, `statements`, `effect`, `actions`, `resources`).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use validator::Validate;

/// Set of ids or names, hashed with ahash
pub type IdSet = HashSet<String, ahash::RandomState>;

fn collect_set<I, S>(items: I) -> IdSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

/// Anything the index keys by id
pub trait Identified {
    /// Entity kind used in diagnostics ("principal", "group", "policy")
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Fold a later entity carrying the same id into this one
    fn absorb(&mut self, duplicate: &Self);
}

/// Effect of a policy statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Effect {
    /// Allow the action
    #[default]
    Allow,
    /// Deny the action (takes precedence over Allow)
    Deny,
}

/// A single access rule
///
/// Matching is exact set membership on both the action and the resource.
/// `"s3:*"` only matches a request whose action is literally `"s3:*"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    #[serde(default)]
    effect: Effect,

    #[serde(default)]
    actions: IdSet,

    #[serde(default)]
    resources: IdSet,
}

impl Statement {
    /// Create a new statement
    pub fn new<A, R, S, T>(effect: Effect, actions: A, resources: R) -> Self
    where
        A: IntoIterator<Item = S>,
        R: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Statement {
            effect,
            actions: collect_set(actions),
            resources: collect_set(resources),
        }
    }

    /// Create an Allow statement
    pub fn allow<A, R, S, T>(actions: A, resources: R) -> Self
    where
        A: IntoIterator<Item = S>,
        R: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::new(Effect::Allow, actions, resources)
    }

    /// Create a Deny statement
    pub fn deny<A, R, S, T>(actions: A, resources: R) -> Self
    where
        A: IntoIterator<Item = S>,
        R: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::new(Effect::Deny, actions, resources)
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn actions(&self) -> &IdSet {
        &self.actions
    }

    pub fn resources(&self) -> &IdSet {
        &self.resources
    }

    /// Check if this statement covers the given resource and action
    pub fn matches(&self, resource: &str, action: &str) -> bool {
        self.resources.contains(resource) && self.actions.contains(action)
    }

    /// A statement with no actions or no resources can never match
    pub fn is_well_formed(&self) -> bool {
        !self.actions.is_empty() && !self.resources.is_empty()
    }
}

/// A user requesting access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    #[validate(length(min = 1))]
    id: String,

    #[serde(default)]
    group_ids: IdSet,
}

impl Principal {
    pub fn new<I, S>(id: impl Into<String>, group_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Principal {
            id: id.into(),
            group_ids: collect_set(group_ids),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn group_ids(&self) -> &IdSet {
        &self.group_ids
    }
}

impl Identified for Principal {
    const KIND: &'static str = "principal";

    fn id(&self) -> &str {
        &self.id
    }

    fn absorb(&mut self, duplicate: &Self) {
        self.group_ids.extend(duplicate.group_ids.iter().cloned());
    }
}

/// A named collection of policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[validate(length(min = 1))]
    id: String,

    #[serde(default)]
    policy_ids: IdSet,
}

impl Group {
    pub fn new<I, S>(id: impl Into<String>, policy_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Group {
            id: id.into(),
            policy_ids: collect_set(policy_ids),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn policy_ids(&self) -> &IdSet {
        &self.policy_ids
    }
}

impl Identified for Group {
    const KIND: &'static str = "group";

    fn id(&self) -> &str {
        &self.id
    }

    fn absorb(&mut self, duplicate: &Self) {
        self.policy_ids.extend(duplicate.policy_ids.iter().cloned());
    }
}

/// A named, ordered collection of statements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[validate(length(min = 1))]
    id: String,

    #[serde(default = "empty_statements")]
    statements: Arc<[Statement]>,
}

fn empty_statements() -> Arc<[Statement]> {
    Arc::from(Vec::new())
}

impl Policy {
    pub fn new<I>(id: impl Into<String>, statements: I) -> Self
    where
        I: IntoIterator<Item = Statement>,
    {
        Policy {
            id: id.into(),
            statements: statements.into_iter().collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Whether any statement in this policy carries an explicit Deny
    pub fn has_deny(&self) -> bool {
        self.statements
            .iter()
            .any(|statement| statement.effect == Effect::Deny)
    }

    /// Position of the first statement that can never match, if any
    pub fn first_malformed_statement(&self) -> Option<usize> {
        self.statements
            .iter()
            .position(|statement| !statement.is_well_formed())
    }
}

impl Identified for Policy {
    const KIND: &'static str = "policy";

    fn id(&self) -> &str {
        &self.id
    }

    fn absorb(&mut self, duplicate: &Self) {
        self.statements = self
            .statements
            .iter()
            .chain(duplicate.statements.iter())
            .cloned()
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_matches_exactly() {
        let stmt = Statement::allow(["read"], ["doc:1"]);

        assert!(stmt.matches("doc:1", "read"));
        assert!(!stmt.matches("doc:1", "write"));
        assert!(!stmt.matches("doc:2", "read"));
        // resource and action are not interchangeable
        assert!(!stmt.matches("read", "doc:1"));
    }

    #[test]
    fn test_no_wildcard_semantics() {
        let stmt = Statement::allow(["s3:*"], ["*"]);

        assert!(!stmt.matches("bucket/key", "s3:GetObject"));
        assert!(stmt.matches("*", "s3:*"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let principal = Principal::new("u1", ["g1", "g1", "g2"]);
        assert_eq!(principal.group_ids().len(), 2);

        let stmt = Statement::allow(["read", "read"], ["doc:1", "doc:1"]);
        assert_eq!(stmt.actions().len(), 1);
        assert_eq!(stmt.resources().len(), 1);
    }

    #[test]
    fn test_effect_defaults_to_allow() {
        let stmt: Statement =
            serde_json::from_str(r#"{"actions": ["read"], "resources": ["doc:1"]}"#).unwrap();

        assert_eq!(stmt.effect(), Effect::Allow);
    }

    #[test]
    fn test_policy_json_shape() {
        let policy: Policy = serde_json::from_str(
            r#"{
                "id": "p1",
                "statements": [
                    {"effect": "Allow", "actions": ["read"], "resources": ["doc:1"]},
                    {"effect": "Deny", "actions": ["write"], "resources": ["doc:1"]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(policy.id(), "p1");
        assert_eq!(policy.statements().len(), 2);
        assert!(policy.has_deny());

        let principal: Principal =
            serde_json::from_str(r#"{"id": "u1", "groupIds": ["g1"]}"#).unwrap();
        assert!(principal.group_ids().contains("g1"));
    }

    #[test]
    fn test_validation() {
        assert!(Principal::new("", ["g1"]).validate().is_err());
        assert!(Principal::new("u1", Vec::<String>::new()).validate().is_ok());
        assert!(Group::new("", ["p1"]).validate().is_err());
        assert!(Policy::new("", Vec::<Statement>::new()).validate().is_err());
    }

    #[test]
    fn test_absorb_unions_references() {
        let mut principal = Principal::new("u1", ["g1"]);
        principal.absorb(&Principal::new("u1", ["g1", "g2"]));
        assert_eq!(principal.group_ids().len(), 2);

        let mut policy = Policy::new("p1", [Statement::allow(["read"], ["doc:1"])]);
        policy.absorb(&Policy::new("p1", [Statement::deny(["read"], ["doc:1"])]));
        assert_eq!(policy.statements().len(), 2);
        assert_eq!(policy.statements()[1].effect(), Effect::Deny);
        assert!(policy.has_deny());
    }

    #[test]
    fn test_malformed_statement_detection() {
        let policy = Policy::new(
            "p1",
            [
                Statement::allow(["read"], ["doc:1"]),
                Statement::allow(Vec::<String>::new(), ["doc:1"]),
            ],
        );

        assert_eq!(policy.first_malformed_statement(), Some(1));
        assert!(!policy.has_deny());
    }
}
