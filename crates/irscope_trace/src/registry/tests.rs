#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use irscope_ir::{ElementId, LineId, NodeId, Origin, PhaseKind};
use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::test_helpers::{chain_nodes, graph_phase, trace};

#[test]
fn loads_phases_in_order() {
    let doc = trace(vec![
        graph_phase("graph builder", chain_nodes()),
        graph_phase("inlining", chain_nodes()),
    ]);
    let reg = PhaseRegistry::from_value(doc).unwrap();
    assert_eq!(reg.phase_count(), 2);
    assert_eq!(reg.function().name, "add");
    assert!(reg.function().source.is_some());
    let p1 = reg.phase(1).unwrap();
    assert_eq!(p1.name, "inlining");
    assert_eq!(p1.index, 1);
    assert_eq!(p1.ordinal, 1);
    assert_eq!(p1.kind(), PhaseKind::Graph);
    assert!(reg.phase(2).is_none());
}

#[test]
fn malformed_second_phase_keeps_its_slot() {
    let doc = trace(vec![
        graph_phase("graph builder", chain_nodes()),
        json!({ "name": "typer", "kind": "graph", "data": "{ \"nodes\": [" }),
        graph_phase("lowering", chain_nodes()),
    ]);
    let reg = PhaseRegistry::from_value(doc).unwrap();
    assert_eq!(reg.phase_count(), 3);
    assert_eq!(reg.phase(0).unwrap().member_count(), 3);
    assert!(reg.phase(1).unwrap().is_broken());
    assert_eq!(reg.phase(1).unwrap().name, "typer");
    assert!(reg.phase_error(1).unwrap().starts_with("malformed phase payload"));
    let p2 = reg.phase(2).unwrap();
    assert_eq!(p2.index, 2);
    assert_eq!(p2.member_count(), 3);
    assert!(reg.phase_error(2).is_none());
}

#[test]
fn per_phase_failures_become_broken_phases() {
    let doc = trace(vec![
        json!({ "kind": "graph", "data": { "nodes": [] } }),
        json!({ "name": "x", "kind": "hologram", "data": {} }),
        json!({ "name": "y", "kind": "graph" }),
        json!(42),
        json!({ "name": "z", "kind": "graph", "data": { "nodes": [
            { "id": 0, "opcode": "Return", "inputs": [3] }
        ] } }),
    ]);
    let reg = PhaseRegistry::from_value(doc).unwrap();
    assert_eq!(reg.phase_count(), 5);
    assert!(reg.phases().iter().all(|p| p.is_broken()));
    assert_eq!(reg.phase(0).unwrap().name, "<phase 0>");
    assert_eq!(reg.phase_error(0), Some("missing required field `name`"));
    assert_eq!(reg.phase_error(1), Some("unknown phase kind `hologram`"));
    assert_eq!(reg.phase_error(2), Some("missing required field `data`"));
    assert_eq!(reg.phase_error(3), Some("phase entry is not an object"));
    assert_eq!(
        reg.phase(1).unwrap().broken().unwrap().declared_kind.as_deref(),
        Some("hologram")
    );
    assert_eq!(reg.phase(1).unwrap().member_count(), 0);
}

#[test]
fn fatal_errors_abort_the_load() {
    assert!(matches!(
        PhaseRegistry::load("not json"),
        Err(ParseError::Json(_))
    ));
    assert!(matches!(
        PhaseRegistry::load("[1, 2]"),
        Err(ParseError::NotAnObject)
    ));
    assert!(matches!(
        PhaseRegistry::load(r#"{ "function": "f" }"#),
        Err(ParseError::MissingPhases)
    ));

    let doc = trace(vec![
        json!({ "name": "a", "ordinal": 3, "kind": "graph", "data": { "nodes": [] } }),
        json!({ "name": "b", "ordinal": 3, "kind": "graph", "data": { "nodes": [] } }),
    ]);
    let err = PhaseRegistry::from_value(doc).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        ParseError::DuplicateOrdinal { ordinal: 3, first: 0, second: 1 }
    ));
}

#[test]
fn phases_sorted_by_ordinal() {
    let doc = trace(vec![
        json!({ "name": "late", "ordinal": 20, "kind": "graph", "data": { "nodes": [] } }),
        json!({ "name": "early", "ordinal": 10, "kind": "graph", "data": { "nodes": [] } }),
    ]);
    let reg = PhaseRegistry::from_value(doc).unwrap();
    let names: Vec<_> = reg.phases().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["early", "late"]);
    assert_eq!(reg.phase(0).unwrap().index, 0);
    assert_eq!(reg.find_by_name("late").unwrap().index, 1);
    assert!(reg.find_by_name("missing").is_none());
}

#[test]
fn textual_schedule_phase() {
    let doc = trace(vec![json!({
        "name": "schedule",
        "kind": "schedule",
        "data": "--- BLOCK B0 ---\n  0: Start\n  1: Return(0)\n",
    })]);
    let reg = PhaseRegistry::from_value(doc).unwrap();
    let phase = reg.phase(0).unwrap();
    assert_eq!(phase.kind(), PhaseKind::Schedule);
    assert_eq!(phase.graph().unwrap().blocks().len(), 1);
}

#[test]
fn disassembly_origins_derived_from_node_ranges() {
    let doc = trace(vec![
        graph_phase("machine", chain_nodes()),
        json!({ "name": "code", "kind": "disassembly", "data": {
            "lines": [
                { "offset": 0, "text": "push rbp" },
                { "offset": 4, "text": "ret", "origin": { "nodeId": 0 } },
                { "offset": 8, "text": "int3" },
            ],
            "nodeRanges": [
                { "node": 1, "start": 0, "end": 4 },
                { "node": 2, "start": 4, "end": 8 },
            ],
        } }),
    ]);
    let reg = PhaseRegistry::from_value(doc).unwrap();
    let PhaseBody::Instructions(d) = &reg.phase(1).unwrap().body else {
        panic!("expected instructions");
    };
    assert_eq!(
        d.line(LineId::new(0)).unwrap().origins.to_vec(),
        vec![Origin::in_phase(NodeId::new(1), "machine")]
    );
    assert_eq!(
        d.line(LineId::new(1)).unwrap().origins.to_vec(),
        vec![Origin::previous(ElementId::new(0))]
    );
    assert!(d.line(LineId::new(2)).unwrap().origins.is_empty());
}

#[test]
fn wrong_ordinal_type_breaks_only_that_phase() {
    let doc = trace(vec![
        json!({ "name": "a", "ordinal": "first", "kind": "graph", "data": { "nodes": [] } }),
        graph_phase("b", chain_nodes()),
    ]);
    let reg = PhaseRegistry::from_value(doc).unwrap();
    assert_eq!(reg.phase_error(0), Some("field `ordinal` has the wrong type"));
    assert!(!reg.phase(1).unwrap().is_broken());
}

fn numbered(name: &str, ordinal: u32) -> serde_json::Value {
    json!({ "name": name, "ordinal": ordinal, "kind": "graph", "data": { "nodes": [] } })
}

fn names(reg: &PhaseRegistry) -> Vec<&str> {
    reg.phases().iter().map(|p| p.name.as_str()).collect()
}

#[test]
fn unreadable_entry_with_one_based_ordinals_keeps_its_slot() {
    let doc = trace(vec![numbered("a", 1), json!(42), numbered("c", 3)]);
    let reg = PhaseRegistry::from_value(doc).unwrap();
    assert_eq!(names(&reg), vec!["a", "<phase 1>", "c"]);
    assert!(reg.phase(1).unwrap().is_broken());
    assert!(!reg.phase(0).unwrap().is_broken());
    assert!(!reg.phase(2).unwrap().is_broken());
    assert_eq!(reg.phase(1).unwrap().ordinal, 1);
}

#[test]
fn unreadable_entry_with_sparse_ordinals_keeps_its_slot() {
    let doc = trace(vec![
        numbered("a", 10),
        json!({ "name": "b", "ordinal": -4, "kind": "graph", "data": { "nodes": [] } }),
        numbered("c", 30),
    ]);
    let reg = PhaseRegistry::from_value(doc).unwrap();
    assert_eq!(names(&reg), vec!["a", "b", "c"]);
    assert_eq!(reg.phase_error(1), Some("field `ordinal` has the wrong type"));
    assert_eq!(reg.phase(2).unwrap().index, 2);
}

#[test]
fn unreadable_entry_follows_its_listed_neighbour_when_sorted() {
    let doc = trace(vec![
        numbered("late", 20),
        json!("not a phase"),
        json!({ "name": "unkinded", "data": {} }),
        numbered("early", 10),
    ]);
    let reg = PhaseRegistry::from_value(doc).unwrap();
    assert_eq!(names(&reg), vec!["early", "late", "<phase 1>", "unkinded"]);
}

#[test]
fn unreadable_entry_at_the_front_stays_first() {
    let doc = trace(vec![json!(7), numbered("a", 0), numbered("b", 1)]);
    let reg = PhaseRegistry::from_value(doc).unwrap();
    assert_eq!(names(&reg), vec!["<phase 0>", "a", "b"]);
}
