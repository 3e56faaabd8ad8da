//! Registry fixtures for resolver tests.

#![allow(clippy::unwrap_used)]

use irscope_trace::PhaseRegistry;
use serde_json::{json, Value};

/// Graph phase entry from `(id, origin)` pairs; `origin` is written verbatim.
pub fn graph(name: &str, nodes: &[(u32, Value)]) -> Value {
    let nodes: Vec<Value> = nodes
        .iter()
        .map(|(id, origin)| {
            if origin.is_null() {
                json!({ "id": id, "opcode": "Op" })
            } else {
                json!({ "id": id, "opcode": "Op", "origin": origin })
            }
        })
        .collect();
    json!({ "name": name, "kind": "graph", "data": { "nodes": nodes } })
}

pub fn registry(phases: Vec<Value>) -> PhaseRegistry {
    PhaseRegistry::from_value(json!({ "phases": phases })).unwrap()
}

/// Phases A (nodes 1..=3, fresh) and B (b1 from a1 and a2, b2 from a3).
pub fn merge_scenario() -> PhaseRegistry {
    registry(vec![
        graph("A", &[(1, Value::Null), (2, Value::Null), (3, Value::Null)]),
        graph("B", &[(1, json!([1, 2])), (2, json!(3))]),
    ])
}
