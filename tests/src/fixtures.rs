//! Request payload fixtures.

use serde_json::{json, Value};

/// A submission body.
pub fn ingest_payload(ids: &[u64], priority: &str) -> Value {
    json!({ "ids": ids, "priority": priority })
}

/// Identifiers `1..=n`.
pub fn sequential_ids(n: u64) -> Vec<u64> {
    (1..=n).collect()
}

/// Bodies that must be rejected with 422, with a label for assertion messages.
pub fn invalid_payloads() -> Vec<(&'static str, Value)> {
    vec![
        ("missing priority", json!({ "ids": [1, 2, 3] })),
        ("missing ids", json!({ "priority": "HIGH" })),
        ("unknown priority", json!({ "ids": [1], "priority": "URGENT" })),
        ("lowercase priority", json!({ "ids": [1], "priority": "high" })),
        ("empty ids", json!({ "ids": [], "priority": "LOW" })),
        ("zero id", json!({ "ids": [0, 1], "priority": "LOW" })),
        ("id above range", json!({ "ids": [1_000_000_008u64], "priority": "LOW" })),
        ("negative id", json!({ "ids": [-1], "priority": "LOW" })),
        ("non-numeric id", json!({ "ids": ["a"], "priority": "LOW" })),
    ]
}
