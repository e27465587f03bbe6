//! Actor identity and label default vectors.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use ccusage_core::usage::{resolve_identity, UsageRecord};

use vector_loader::load_vector;

#[test]
fn identity_vectors() {
    let files = [
        "actor_user.json",
        "actor_user_no_email.json",
        "actor_api_key.json",
        "actor_api_key_no_name.json",
        "actor_missing.json",
        "actor_other_type.json",
        "actor_malformed.json",
    ];

    for f in files {
        let v = load_vector(f);
        let rec = UsageRecord::from_value(v.record);
        assert_eq!(resolve_identity(&rec), v.expect.identity, "{}", v.description);
        assert_eq!(rec.customer_type, v.expect.customer_type, "{}", v.description);
        assert_eq!(rec.terminal_type, v.expect.terminal_type, "{}", v.description);
    }
}

#[test]
fn identity_is_deterministic() {
    let v = load_vector("actor_user.json");
    let a = UsageRecord::from_value(v.record.clone());
    let b = UsageRecord::from_value(v.record);
    assert_eq!(resolve_identity(&a), resolve_identity(&b));
    assert_eq!(a, b);
}

#[test]
fn non_object_record_decodes_to_defaults() {
    let rec = UsageRecord::from_value(serde_json::json!("garbage"));
    assert_eq!(rec, UsageRecord::default());
    assert_eq!(resolve_identity(&rec), "unknown");
}
