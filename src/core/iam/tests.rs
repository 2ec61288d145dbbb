//! Scenario tests for the IAM evaluator

use super::*;

/// `u1` → `g1` → `p1` (read doc:1)
/// `u2` → `g2` → `p-missing`
/// `u3` → `g1`, `g3` → `p1`, `p2` (write doc:2)
fn scenario_index() -> PolicyIndex {
    PolicyIndex::build(
        vec![
            Principal::new("u1", ["g1"]),
            Principal::new("u2", ["g2"]),
            Principal::new("u3", ["g1", "g3"]),
            Principal::new("loner", Vec::<String>::new()),
        ],
        vec![
            Group::new("g1", ["p1"]),
            Group::new("g2", ["p-missing"]),
            Group::new("g3", ["p2"]),
        ],
        vec![
            Policy::new("p1", [Statement::allow(["read"], ["doc:1"])]),
            Policy::new("p2", [Statement::allow(["write"], ["doc:2"])]),
        ],
    )
}

#[test]
fn test_single_group_grant() {
    let index = scenario_index();

    assert!(has_permission(&index, "u1", "doc:1", "read"));
    assert!(!has_permission(&index, "u1", "doc:1", "write"));
    assert!(!has_permission(&index, "u1", "doc:2", "read"));
}

#[test]
fn test_dangling_policy_reference() {
    let index = scenario_index();

    for (resource, action) in [("doc:1", "read"), ("doc:2", "write"), ("anything", "anything")] {
        assert!(!has_permission(&index, "u2", resource, action));
    }
}

#[test]
fn test_permissions_union_across_groups() {
    let index = scenario_index();

    assert!(has_permission(&index, "u3", "doc:1", "read"));
    assert!(has_permission(&index, "u3", "doc:2", "write"));
    assert!(!has_permission(&index, "u3", "doc:1", "write"));
    assert!(!has_permission(&index, "u3", "doc:2", "read"));
}

#[test]
fn test_unknown_principal() {
    let index = scenario_index();

    for (resource, action) in [("doc:1", "read"), ("doc:2", "write"), ("doc:3", "delete")] {
        let request = AccessRequest::new("ghost", resource, action);
        assert_eq!(
            Evaluator::check(&index, &request).unwrap(),
            Decision::ImplicitDeny
        );
    }
}

#[test]
fn test_principal_without_groups() {
    let index = scenario_index();

    assert!(!has_permission(&index, "loner", "doc:1", "read"));
    assert!(index.capabilities("loner").is_empty());
}

#[test]
fn test_dangling_group_reference() {
    let index = PolicyIndex::build(
        vec![Principal::new("u1", ["g-gone", "g1"])],
        vec![Group::new("g1", ["p1"])],
        vec![Policy::new("p1", [Statement::allow(["read"], ["doc:1"])])],
    );

    assert_eq!(index.stats().dangling_group_refs, 1);
    assert!(has_permission(&index, "u1", "doc:1", "read"));
}

#[test]
fn test_deny_in_other_group_overrides_allow() {
    let index = PolicyIndex::build(
        vec![Principal::new("u1", ["readers", "quarantine"])],
        vec![
            Group::new("readers", ["p-read"]),
            Group::new("quarantine", ["p-block"]),
        ],
        vec![
            Policy::new("p-read", [Statement::allow(["read"], ["doc:1", "doc:2"])]),
            Policy::new("p-block", [Statement::deny(["read"], ["doc:2"])]),
        ],
    );

    assert!(has_permission(&index, "u1", "doc:1", "read"));
    assert!(!has_permission(&index, "u1", "doc:2", "read"));
    assert_eq!(index.capabilities("u1"), vec![("read", "doc:1")]);
}

#[test]
fn test_deny_for_one_principal_does_not_leak() {
    let index = PolicyIndex::build(
        vec![
            Principal::new("u1", ["readers", "quarantine"]),
            Principal::new("u2", ["readers"]),
        ],
        vec![
            Group::new("readers", ["p-read"]),
            Group::new("quarantine", ["p-block"]),
        ],
        vec![
            Policy::new("p-read", [Statement::allow(["read"], ["doc:1"])]),
            Policy::new("p-block", [Statement::deny(["read"], ["doc:1"])]),
        ],
    );

    assert!(!has_permission(&index, "u1", "doc:1", "read"));
    assert!(has_permission(&index, "u2", "doc:1", "read"));
}

#[test]
fn test_exact_matching_only() {
    let index = PolicyIndex::build(
        vec![Principal::new("u1", ["g1"])],
        vec![Group::new("g1", ["p1"])],
        vec![Policy::new("p1", [Statement::allow(["s3:*"], ["arn:bucket/*"])])],
    );

    assert!(!has_permission(&index, "u1", "arn:bucket/key", "s3:GetObject"));
    assert!(!has_permission(&index, "u1", "arn:bucket/*", "s3:GetObject"));
    assert!(has_permission(&index, "u1", "arn:bucket/*", "s3:*"));
}

#[test]
fn test_case_sensitivity() {
    let index = scenario_index();

    assert!(!has_permission(&index, "u1", "DOC:1", "read"));
    assert!(!has_permission(&index, "u1", "doc:1", "Read"));
    assert!(!has_permission(&index, "U1", "doc:1", "read"));
}

#[test]
fn test_rebuild_is_idempotent() {
    let first = scenario_index();
    let second = scenario_index();

    for principal in ["u1", "u2", "u3", "loner", "ghost"] {
        for resource in ["doc:1", "doc:2", "doc:3"] {
            for action in ["read", "write"] {
                assert_eq!(
                    has_permission(&first, principal, resource, action),
                    has_permission(&second, principal, resource, action)
                );
            }
        }
        assert_eq!(first.capabilities(principal), second.capabilities(principal));
    }
}

#[test]
fn test_shared_policy_visited_once() {
    let index = PolicyIndex::build(
        vec![Principal::new("u1", ["g1", "g2"])],
        vec![Group::new("g1", ["p1"]), Group::new("g2", ["p1"])],
        vec![Policy::new("p1", [Statement::allow(["read"], ["doc:1"])])],
    );

    assert_eq!(index.reachable_policies("u1").len(), 1);
    assert!(has_permission(&index, "u1", "doc:1", "read"));
}
