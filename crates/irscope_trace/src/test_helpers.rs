//! Trace fixtures shared by the unit tests.

use serde_json::{json, Value};

/// A trace document with the given phase entries.
pub fn trace(phases: Vec<Value>) -> Value {
    json!({
        "function": { "name": "add", "source": "function add(a, b) { return a + b; }" },
        "phases": phases,
    })
}

/// A graph phase entry without explicit ordinal.
pub fn graph_phase(name: &str, nodes: Value) -> Value {
    json!({ "name": name, "kind": "graph", "data": { "nodes": nodes } })
}

/// Three-node chain `Start -> Parameter -> Return`.
pub fn chain_nodes() -> Value {
    json!([
        { "id": 0, "opcode": "Start" },
        { "id": 1, "opcode": "Parameter", "inputs": [0] },
        { "id": 2, "opcode": "Return", "inputs": [1, 0] },
    ])
}
