//! Authorization requests

use crate::error::{AccessError, Result};

/// The three query parameters of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessRequest<'a> {
    pub principal_id: &'a str,
    pub resource: &'a str,
    pub action: &'a str,
}

impl<'a> AccessRequest<'a> {
    pub fn new(principal_id: &'a str, resource: &'a str, action: &'a str) -> Self {
        AccessRequest {
            principal_id,
            resource,
            action,
        }
    }

    /// Reject requests with an empty principal id, resource or action
    ///
    /// The empty string is never a valid domain value for any of the three.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("principal_id", self.principal_id),
            ("resource", self.resource),
            ("action", self.action),
        ];

        for (field, value) in fields {
            if value.is_empty() {
                return Err(AccessError::MalformedInput { field });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_fields() {
        assert!(AccessRequest::new("u1", "doc:1", "read").validate().is_ok());

        for (request, expected) in [
            (AccessRequest::new("", "doc:1", "read"), "principal_id"),
            (AccessRequest::new("u1", "", "read"), "resource"),
            (AccessRequest::new("u1", "doc:1", ""), "action"),
        ] {
            match request.validate() {
                Err(AccessError::MalformedInput { field }) => assert_eq!(field, expected),
                other => panic!("expected MalformedInput, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_whitespace_is_a_value() {
        // Only the empty string is rejected; ids are otherwise opaque
        assert!(AccessRequest::new(" ", " ", " ").validate().is_ok());
    }
}
