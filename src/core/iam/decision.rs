//! Access decisions
//!
//! Evaluation is a three-valued reduction: an explicit Deny overrides any
//! Allow, and an Allow overrides the implicit Deny every request starts from.

use crate::error::{AccessError, Result};
use serde::{Deserialize, Serialize};

/// Outcome of evaluating one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    /// At least one reachable Allow statement matched and no Deny did
    Allow,
    /// A reachable Deny statement matched
    ExplicitDeny,
    /// Nothing matched (unknown principal, resource or action included)
    ImplicitDeny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn is_explicit_deny(self) -> bool {
        matches!(self, Decision::ExplicitDeny)
    }

    /// Convert into a `Result`, mapping both deny variants to the same
    /// generic [`AccessError::AccessDenied`]
    pub fn into_result(self) -> Result<()> {
        if self.is_allowed() {
            Ok(())
        } else {
            Err(AccessError::AccessDenied)
        }
    }
}

impl From<Decision> for bool {
    fn from(decision: Decision) -> bool {
        decision.is_allowed()
    }
}

/// The statement that produced a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRef {
    pub policy_id: String,
    /// Zero-based position of the statement inside its policy
    pub position: usize,
}

/// A decision together with the statement responsible for it
///
/// Meant for policy administrators. End users only ever get the generic
/// "not authorized" produced by [`Decision::into_result`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub decision: Decision,
    /// `None` for [`Decision::ImplicitDeny`]
    pub matched: Option<StatementRef>,
}
