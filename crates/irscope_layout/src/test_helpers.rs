//! Payload builders for layout tests.

#![allow(clippy::unwrap_used)]

use irscope_ir::{Block, BlockId, EdgeKind, GraphPayload, Node, NodeId, Phase, PhaseBody};
use rustc_hash::FxHashMap;

pub fn n(id: u32) -> NodeId {
    NodeId::new(id)
}

/// Graph without blocks from `(id, inputs)` pairs; edges derived from inputs.
pub fn graph(nodes: &[(u32, &[u32])]) -> GraphPayload {
    let nodes = nodes
        .iter()
        .map(|&(id, inputs)| Node::new(n(id), "Op").with_inputs(inputs.iter().copied().map(n)))
        .collect();
    GraphPayload::from_inputs(nodes, Vec::new(), &FxHashMap::default()).unwrap()
}

/// Block with mutually consistent successor lists filled in by `blocks`.
pub fn block(id: u32, nodes: &[u32], succs: &[u32]) -> Block {
    Block {
        nodes: nodes.iter().copied().map(n).collect(),
        successors: succs.iter().copied().map(BlockId::new).collect(),
        ..Block::new(BlockId::new(id))
    }
}

/// Fill predecessor lists from successor lists.
pub fn link_blocks(mut blocks: Vec<Block>) -> Vec<Block> {
    let edges: Vec<(BlockId, BlockId)> = blocks
        .iter()
        .flat_map(|b| b.successors.iter().map(move |&s| (b.id, s)))
        .collect();
    for (from, to) in edges {
        if let Some(target) = blocks.iter_mut().find(|b| b.id == to) {
            target.predecessors.push(from);
        }
    }
    blocks
}

/// A loop: B0 → B1 (header) ⇄ B2 (body), B1 → B3 (exit).
///
/// The header phi takes its back-edge input from the body, so the value
/// graph is cyclic too.
pub fn loop_graph() -> GraphPayload {
    let nodes = vec![
        Node::new(n(0), "Start"),
        Node::new(n(1), "Loop").with_inputs([n(0), n(4)]),
        Node::new(n(2), "Phi").with_inputs([n(0), n(3), n(1)]),
        Node::new(n(3), "Add").with_inputs([n(2)]),
        Node::new(n(4), "LoopEnd").with_inputs([n(3)]),
        Node::new(n(5), "Return").with_inputs([n(2)]),
    ];
    let mut kinds = FxHashMap::default();
    kinds.insert(n(1), vec![EdgeKind::Control, EdgeKind::Control]);
    kinds.insert(n(2), vec![EdgeKind::Value, EdgeKind::Value, EdgeKind::Control]);
    let blocks = link_blocks(vec![
        block(0, &[0], &[1]),
        block(1, &[1, 2], &[2, 3]),
        block(2, &[3, 4], &[1]),
        block(3, &[5], &[]),
    ]);
    GraphPayload::from_inputs(nodes, blocks, &kinds).unwrap()
}

pub fn phase(name: &str, ordinal: u32, payload: GraphPayload) -> Phase {
    Phase {
        name: name.to_string(),
        ordinal,
        index: ordinal as usize,
        body: PhaseBody::Graph(payload),
    }
}
