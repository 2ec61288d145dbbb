#![no_main]
use accessgraph::{has_permission, Snapshot};
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes as a snapshot document: parsing may fail, nothing may panic
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(snapshot) = Snapshot::from_json(text) else {
        return;
    };

    let _ = snapshot.validate();
    let principals: Vec<String> = snapshot
        .principals
        .iter()
        .map(|p| p.id().to_string())
        .collect();

    let index = snapshot.build_index();
    for principal in &principals {
        let _ = index.capabilities(principal);
        let _ = has_permission(&index, principal, "doc:1", "read");
    }
});
