#![no_main]
use accessgraph::{AccessRequest, Evaluator, Group, Policy, PolicyIndex, Principal, Statement};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    principals: Vec<(u8, Vec<u8>)>,
    groups: Vec<(u8, Vec<u8>)>,
    policies: Vec<(u8, Vec<(bool, Vec<u8>, Vec<u8>)>)>,
    queries: Vec<(u8, u8, u8)>,
}

// Small id space so references collide, dangle and repeat
fn id(prefix: &str, n: u8) -> String {
    format!("{}{}", prefix, n % 16)
}

fuzz_target!(|input: Input| {
    let principals: Vec<Principal> = input
        .principals
        .iter()
        .map(|(p, groups)| Principal::new(id("u", *p), groups.iter().map(|g| id("g", *g))))
        .collect();
    let groups: Vec<Group> = input
        .groups
        .iter()
        .map(|(g, policies)| Group::new(id("g", *g), policies.iter().map(|p| id("p", *p))))
        .collect();
    let policies: Vec<Policy> = input
        .policies
        .iter()
        .map(|(p, statements)| {
            Policy::new(
                id("p", *p),
                statements.iter().map(|(deny, actions, resources)| {
                    let actions = actions.iter().map(|a| id("a", *a));
                    let resources = resources.iter().map(|r| id("r", *r));
                    if *deny {
                        Statement::deny(actions, resources)
                    } else {
                        Statement::allow(actions, resources)
                    }
                }),
            )
        })
        .collect();

    let index = PolicyIndex::build(principals.clone(), groups.clone(), policies.clone());
    let strict = PolicyIndex::try_build(principals, groups, policies);

    for (p, r, a) in input.queries {
        let (principal, resource, action) = (id("u", p), id("r", r), id("a", a));
        let request = AccessRequest::new(&principal, &resource, &action);

        let decision = Evaluator::check(&index, &request).expect("request is well formed");
        let explanation = Evaluator::explain(&index, &request).expect("request is well formed");
        assert_eq!(decision, explanation.decision);

        if let Ok(strict) = &strict {
            assert_eq!(decision, Evaluator::check(strict, &request).expect("request is well formed"));
        }
    }
});
