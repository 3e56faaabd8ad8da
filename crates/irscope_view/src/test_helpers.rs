//! A small end-to-end trace shared by the view tests.
//!
//! `add(a, b)` through a graph, a typed graph, a broken entry, a schedule,
//! an instruction sequence and its disassembly. Node 3 is the addition in
//! every graph-like phase.

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use irscope_identity::{IdentityResolver, OriginPolicy};
use irscope_trace::PhaseRegistry;
use serde_json::{json, Value};

use crate::TextContainer;

pub const SOURCE: &str = "function add(a, b) {\n  return a + b;\n}";

fn nodes(origin: impl Fn(u32) -> Value) -> Value {
    json!([
        { "id": 0, "opcode": "Start", "origin": origin(0) },
        { "id": 1, "opcode": "Parameter", "label": "1: Parameter[a]", "inputs": [0],
          "sourcePosition": 13, "origin": origin(1) },
        { "id": 2, "opcode": "Parameter", "label": "2: Parameter[b]", "inputs": [0],
          "sourcePosition": 16, "origin": origin(2) },
        { "id": 3, "opcode": "Int32Add", "inputs": [1, 2], "sourcePosition": 32, "origin": origin(3) },
        { "id": 4, "opcode": "Return", "inputs": [3, 0], "sourcePosition": 23, "origin": origin(4) },
    ])
}

pub fn trace() -> Value {
    json!({
        "function": { "name": "add", "source": SOURCE, "sourceStart": 0 },
        "phases": [
            { "name": "bytecode graph", "kind": "graph", "data": { "nodes": nodes(|_| Value::Null) } },
            { "name": "typer", "kind": "graph", "data": { "nodes": nodes(|id| json!(id)) } },
            { "name": "escape analysis", "kind": "graph",
              "data": { "nodes": [{ "id": 0, "opcode": "Return", "inputs": [9] }] } },
            { "name": "schedule", "kind": "schedule", "data": {
                "nodes": nodes(|id| json!({ "nodeId": id, "phase": "typer" })),
                "blocks": [{ "id": 0, "nodes": [0, 1, 2, 3, 4] }],
            } },
            { "name": "code generation", "kind": "sequence", "data": { "blocks": [
                { "id": 0, "instructions": [
                    { "id": 0, "opcode": "ArchNop" },
                    { "id": 1, "opcode": "X64Add32", "operands": "[rax|R] = [rax|R], [rbx|R]", "origin": 3 },
                    { "id": 2, "opcode": "ArchRet", "operands": "[rax|R]", "origin": 4 },
                ] },
            ] } },
            { "name": "disassembly", "kind": "disassembly", "data": {
                "instructions": [
                    { "offset": 0, "text": "push rbp" },
                    { "offset": 4, "text": "addl rax,rbx", "sourcePosition": 32 },
                    { "offset": 8, "text": "ret" },
                ],
                "nodeRanges": [{ "node": 3, "start": 4, "end": 8 }],
            } },
        ],
    })
}

pub fn trace_text() -> String {
    trace().to_string()
}

pub fn registry() -> PhaseRegistry {
    PhaseRegistry::from_value(trace()).unwrap()
}

pub fn resolver(registry: &PhaseRegistry) -> Arc<IdentityResolver> {
    Arc::new(IdentityResolver::new(registry, OriginPolicy::Explicit))
}

pub fn container() -> (Rc<RefCell<TextContainer>>, Box<dyn crate::Container>) {
    let shared = TextContainer::shared();
    let boxed: Box<dyn crate::Container> = Box::new(Rc::clone(&shared));
    (shared, boxed)
}
