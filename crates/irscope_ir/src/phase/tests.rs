#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;
use smallvec::smallvec;

use super::*;
use crate::Node;

fn graph_phase() -> Phase {
    let nodes = vec![
        Node::new(NodeId::new(0), "Start"),
        Node::new(NodeId::new(4), "Int32Add")
            .with_inputs([NodeId::new(0)])
            .with_origins([Origin::previous(NodeId::new(2))]),
    ];
    Phase {
        name: "typer".to_string(),
        ordinal: 3,
        index: 1,
        body: PhaseBody::Graph(
            GraphPayload::from_inputs(nodes, vec![], &FxHashMap::default()).unwrap(),
        ),
    }
}

fn sequence_phase() -> Phase {
    let instr = |id: u32, node: u32| Instruction {
        id: InstrId::new(id),
        opcode: "ArchNop".to_string(),
        operands: String::new(),
        origins: smallvec![Origin::previous(NodeId::new(node))],
    };
    Phase {
        name: "codegen".to_string(),
        ordinal: 9,
        index: 4,
        body: PhaseBody::Sequence(SequencePayload::new(vec![
            SequenceBlock {
                id: BlockId::new(0),
                deferred: false,
                instructions: vec![instr(0, 4), instr(1, 0)],
                successors: vec![],
                predecessors: vec![],
            },
            SequenceBlock {
                id: BlockId::new(1),
                deferred: true,
                instructions: vec![instr(7, 4)],
                successors: vec![],
                predecessors: vec![],
            },
        ])),
    }
}

#[test]
fn kind_names_round_trip() {
    for kind in [
        PhaseKind::Graph,
        PhaseKind::TurboshaftGraph,
        PhaseKind::Schedule,
        PhaseKind::Sequence,
        PhaseKind::Instructions,
    ] {
        assert_eq!(PhaseKind::from_trace_name(kind.as_str()), Some(kind));
    }
    assert_eq!(PhaseKind::from_trace_name("disassembly"), Some(PhaseKind::Instructions));
    assert_eq!(PhaseKind::from_trace_name("broken"), None);
}

#[test]
fn graph_members_are_nodes() {
    let phase = graph_phase();
    let members = phase.members();
    let ids: Vec<ElementId> = members.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![ElementId::new(0), ElementId::new(4)]);
    assert_eq!(members[1].origins, &[Origin::previous(NodeId::new(2))]);
    assert!(phase.contains(ElementId::new(4)));
    assert!(!phase.contains(ElementId::new(2)));
    assert_eq!(phase.element_text(ElementId::new(4)).as_deref(), Some("4: Int32Add"));
}

#[test]
fn sequence_members_are_instructions() {
    let phase = sequence_phase();
    assert_eq!(phase.kind(), PhaseKind::Sequence);
    assert_eq!(phase.member_count(), 3);
    assert!(phase.graph().is_none());
    assert_eq!(phase.element_text(ElementId::new(1)).as_deref(), Some("ArchNop "));
}

#[test]
fn sequence_instructions_are_found_in_any_block() {
    let phase = sequence_phase();
    let PhaseBody::Sequence(sequence) = &phase.body else {
        panic!("expected a sequence");
    };
    let found = sequence.instruction(InstrId::new(7)).expect("instruction 7");
    assert_eq!(found.origins.as_slice(), &[Origin::previous(NodeId::new(4))]);
    assert_eq!(sequence.blocks().len(), 2);
    assert!(sequence.instruction(InstrId::new(2)).is_none());
    assert!(phase.contains(ElementId::new(7)));
    assert!(!phase.contains(ElementId::new(3)));
}

#[test]
fn broken_phase_has_no_members() {
    let phase = Phase {
        name: "bad".to_string(),
        ordinal: 2,
        index: 2,
        body: PhaseBody::Broken(BrokenPhase {
            declared_kind: Some("graph".to_string()),
            message: "expected value".to_string(),
        }),
    };
    assert!(phase.is_broken());
    assert!(phase.members().is_empty());
    assert_eq!(phase.kind(), PhaseKind::Broken);
}

#[test]
fn disassembly_maps_pc_to_nodes() {
    let payload = InstructionsPayload {
        lines: vec![],
        node_ranges: vec![(NodeId::new(3), 0..8), (NodeId::new(5), 4..12)],
    };
    let at_six: Vec<NodeId> = payload.nodes_at(6).collect();
    assert_eq!(at_six, vec![NodeId::new(3), NodeId::new(5)]);
    assert_eq!(payload.nodes_at(12).count(), 0);
}
