//! Policy evaluation with deny precedence
//!
//! Walks the index from the principal to its reachable statements and reduces
//! the matches to a [`Decision`]:
//! - Explicit deny takes precedence over allow, independent of order
//! - Allow requires at least one exact action/resource match
//! - Anything else, unknown ids included, is an implicit deny

use super::decision::{Decision, Explanation, StatementRef};
use super::index::PolicyIndex;
use super::model::{Effect, Policy};
use super::request::AccessRequest;
use crate::error::Result;
use tracing::debug;

/// Stateless evaluator over a [`PolicyIndex`]
pub struct Evaluator;

struct Outcome {
    decision: Decision,
    matched: Option<StatementRef>,
}

impl Evaluator {
    /// Evaluate a request against an index
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if the principal id, resource or action is
    /// empty. Unknown ids are never errors; they evaluate to
    /// [`Decision::ImplicitDeny`].
    ///
    /// # Examples
    ///
    /// ```
    /// use accessgraph::{AccessRequest, Decision, Evaluator, Group, Policy, PolicyIndex, Principal, Statement};
    ///
    /// let index = PolicyIndex::build(
    ///     vec![Principal::new("u1", ["g1"])],
    ///     vec![Group::new("g1", ["p1"])],
    ///     vec![Policy::new("p1", [
    ///         Statement::allow(["read", "write"], ["doc:1"]),
    ///         Statement::deny(["write"], ["doc:1"]),
    ///     ])],
    /// );
    ///
    /// let read = AccessRequest::new("u1", "doc:1", "read");
    /// let write = AccessRequest::new("u1", "doc:1", "write");
    ///
    /// assert_eq!(Evaluator::check(&index, &read).unwrap(), Decision::Allow);
    /// assert_eq!(Evaluator::check(&index, &write).unwrap(), Decision::ExplicitDeny);
    /// ```
    pub fn check(index: &PolicyIndex, request: &AccessRequest<'_>) -> Result<Decision> {
        request.validate()?;
        Ok(Self::decide(index, request))
    }

    /// Evaluate a request and report which statement decided it
    ///
    /// Policies are visited in id order, so the reported Allow statement is
    /// stable across rebuilds of the same snapshot.
    pub fn explain(index: &PolicyIndex, request: &AccessRequest<'_>) -> Result<Explanation> {
        request.validate()?;

        let mut policies = index.reachable_policies(request.principal_id);
        policies.sort_unstable_by(|a, b| a.id().cmp(b.id()));

        // Keep scanning past the first Allow so a Deny further on is reported
        let outcome = Self::reduce(policies, request, true);

        Ok(Explanation {
            decision: outcome.decision,
            matched: outcome.matched,
        })
    }

    /// Evaluate an already validated request
    pub(crate) fn decide(index: &PolicyIndex, request: &AccessRequest<'_>) -> Decision {
        let policies = index.reachable_policies(request.principal_id);
        let decision = Self::reduce(policies, request, index.has_deny()).decision;

        debug!(
            "Access {:?} for principal '{}' on '{}' ({})",
            decision, request.principal_id, request.resource, request.action
        );

        decision
    }

    /// Reduce the statements of `policies` to a decision
    ///
    /// With `deny_possible == false` the first matching Allow is final.
    fn reduce<'a, I>(policies: I, request: &AccessRequest<'_>, deny_possible: bool) -> Outcome
    where
        I: IntoIterator<Item = &'a Policy>,
    {
        let mut allowed: Option<StatementRef> = None;

        'policies: for policy in policies {
            for (position, statement) in policy.statements().iter().enumerate() {
                if !statement.matches(request.resource, request.action) {
                    continue;
                }

                match statement.effect() {
                    Effect::Deny => {
                        return Outcome {
                            decision: Decision::ExplicitDeny,
                            matched: Some(StatementRef {
                                policy_id: policy.id().to_string(),
                                position,
                            }),
                        };
                    }
                    Effect::Allow => {
                        if allowed.is_none() {
                            allowed = Some(StatementRef {
                                policy_id: policy.id().to_string(),
                                position,
                            });
                        }
                        if !deny_possible {
                            break 'policies;
                        }
                    }
                }
            }
        }

        match allowed {
            Some(matched) => Outcome {
                decision: Decision::Allow,
                matched: Some(matched),
            },
            None => Outcome {
                decision: Decision::ImplicitDeny,
                matched: None,
            },
        }
    }
}

/// Boolean entry point: may `principal_id` perform `target_action` on
/// `target_resource`?
///
/// Fails closed: a malformed request is `false`, never an error.
pub fn has_permission(
    index: &PolicyIndex,
    principal_id: &str,
    target_resource: &str,
    target_action: &str,
) -> bool {
    let request = AccessRequest::new(principal_id, target_resource, target_action);
    match Evaluator::check(index, &request) {
        Ok(decision) => decision.is_allowed(),
        Err(e) => {
            debug!("Denying malformed request: {}", e);
            false
        }
    }
}
