//! Conversion from serde shapes to `irscope_ir` payloads.
//!
//! Each `convert_*` function turns one phase's `data` value into a
//! [`PhaseBody`], or a [`ParseError`] that the registry confines to that
//! phase.

use irscope_ir::{
    Block, BlockId, BlockKind, DisasmLine, Edge, EdgeKind, ElementId, GraphPayload, InstrId,
    Instruction, InstructionsPayload, LineId, Node, NodeFlags, NodeId, Origin, Origins,
    PhaseBody, PhaseKind, SequenceBlock, SequencePayload,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use serde_json::Value;

use crate::raw::{
    RawBlock, RawGraph, RawInstructions, RawNode, RawOrigin, RawOrigins, RawSequence,
};
use crate::schedule_text::parse_schedule_text;
use crate::ParseError;

/// Convert the `data` value of a phase of the given kind.
///
/// A string `data` is either a textual schedule (schedule phases) or an
/// embedded JSON document (every other kind).
pub(crate) fn convert_payload(kind: PhaseKind, data: &Value) -> Result<PhaseBody, ParseError> {
    if let Value::String(text) = data {
        if kind == PhaseKind::Schedule {
            return parse_schedule_text(text).map(PhaseBody::Schedule);
        }
        let embedded: Value = serde_json::from_str(text).map_err(ParseError::Payload)?;
        return convert_structured(kind, &embedded);
    }
    convert_structured(kind, data)
}

fn convert_structured(kind: PhaseKind, data: &Value) -> Result<PhaseBody, ParseError> {
    match kind {
        PhaseKind::Graph => convert_graph(data, None).map(PhaseBody::Graph),
        PhaseKind::TurboshaftGraph => {
            convert_graph(data, Some("turboshaft graph")).map(PhaseBody::TurboshaftGraph)
        }
        PhaseKind::Schedule => convert_graph(data, Some("schedule")).map(PhaseBody::Schedule),
        PhaseKind::Sequence => convert_sequence(data).map(PhaseBody::Sequence),
        PhaseKind::Instructions => convert_instructions(data).map(PhaseBody::Instructions),
        PhaseKind::Broken => Err(ParseError::UnknownKind(kind.as_str().to_string())),
    }
}

// ── Origins ─────────────────────────────────────────────────────────

pub(crate) fn convert_origins(raw: Option<RawOrigins>) -> Origins {
    let Some(raw) = raw else {
        return Origins::new();
    };
    raw.into_vec()
        .into_iter()
        .filter_map(|origin| match origin {
            RawOrigin::Id(id) => Some(Origin::previous(ElementId::new(id))),
            RawOrigin::Ref(r) => r.target.map(|target| Origin {
                target: ElementId::new(target),
                phase: r.phase,
            }),
        })
        .collect()
}

// ── Graphs ──────────────────────────────────────────────────────────

/// Convert a graph payload; `blocks_required` names the phase kind when
/// blocks are mandatory for it.
fn convert_graph(
    data: &Value,
    blocks_required: Option<&'static str>,
) -> Result<GraphPayload, ParseError> {
    let raw = RawGraph::deserialize(data).map_err(ParseError::Payload)?;
    if let Some(kind) = blocks_required {
        if raw.blocks.is_empty() {
            return Err(ParseError::MissingBlocks { kind });
        }
    }

    let mut input_kinds: FxHashMap<NodeId, Vec<EdgeKind>> = FxHashMap::default();
    let mut nodes = Vec::with_capacity(raw.nodes.len());
    for raw_node in raw.nodes {
        if !raw_node.input_kinds.is_empty() {
            let kinds = raw_node
                .input_kinds
                .iter()
                .map(|k| parse_edge_kind(k))
                .collect::<Result<Vec<_>, _>>()?;
            input_kinds.insert(NodeId::new(raw_node.id), kinds);
        }
        nodes.push(convert_node(raw_node));
    }

    let blocks = raw
        .blocks
        .into_iter()
        .map(convert_block)
        .collect::<Result<Vec<_>, _>>()?;

    let payload = match raw.edges {
        Some(raw_edges) => {
            let edges = raw_edges
                .into_iter()
                .map(|e| {
                    let kind = match e.kind.as_deref() {
                        Some(k) => parse_edge_kind(k)?,
                        None => EdgeKind::Value,
                    };
                    Ok(Edge::new(NodeId::new(e.source), NodeId::new(e.target), kind))
                })
                .collect::<Result<Vec<_>, ParseError>>()?;
            GraphPayload::new(nodes, edges, blocks)?
        }
        None => GraphPayload::from_inputs(nodes, blocks, &input_kinds)?,
    };
    Ok(payload)
}

fn convert_node(raw: RawNode) -> Node {
    let id = NodeId::new(raw.id);
    let mut flags = NodeFlags::empty();
    if raw.control {
        flags |= NodeFlags::CONTROL;
    }
    if raw.block_start {
        flags |= NodeFlags::BLOCK_START;
    }
    let label = raw
        .label
        .unwrap_or_else(|| format!("{}: {}", raw.id, raw.opcode));
    Node {
        id,
        opcode: raw.opcode,
        label,
        inputs: raw.inputs.into_iter().map(NodeId::new).collect(),
        output_type: raw.output_type,
        origins: convert_origins(raw.origin),
        flags,
        source_position: raw.source_position,
    }
}

fn convert_block(raw: RawBlock) -> Result<Block, ParseError> {
    let kind = match raw.kind.as_deref() {
        Some(k) => BlockKind::from_trace_name(k)
            .ok_or_else(|| ParseError::UnknownBlockKind(k.to_string()))?,
        None => BlockKind::Block,
    };
    Ok(Block {
        id: BlockId::new(raw.id),
        kind,
        deferred: raw.deferred,
        nodes: raw.nodes.into_iter().map(NodeId::new).collect(),
        successors: raw.successors.into_iter().map(BlockId::new).collect(),
        predecessors: raw.predecessors.into_iter().map(BlockId::new).collect(),
    })
}

fn parse_edge_kind(name: &str) -> Result<EdgeKind, ParseError> {
    EdgeKind::from_trace_name(name).ok_or_else(|| ParseError::UnknownEdgeKind(name.to_string()))
}

// ── Sequence ────────────────────────────────────────────────────────

fn convert_sequence(data: &Value) -> Result<SequencePayload, ParseError> {
    let raw = RawSequence::deserialize(data).map_err(ParseError::Payload)?;
    let mut seen = FxHashSet::default();
    let mut blocks = Vec::with_capacity(raw.blocks.len());
    for raw_block in raw.blocks {
        let mut instructions = Vec::with_capacity(raw_block.instructions.len());
        for raw_instr in raw_block.instructions {
            let id = InstrId::new(raw_instr.id);
            if !seen.insert(id) {
                return Err(ParseError::DuplicateInstruction(id));
            }
            instructions.push(Instruction {
                id,
                opcode: raw_instr.opcode,
                operands: raw_instr.operands,
                origins: convert_origins(raw_instr.origin),
            });
        }
        blocks.push(SequenceBlock {
            id: BlockId::new(raw_block.id),
            deferred: raw_block.deferred,
            instructions,
            successors: raw_block.successors.into_iter().map(BlockId::new).collect(),
            predecessors: raw_block.predecessors.into_iter().map(BlockId::new).collect(),
        });
    }
    Ok(SequencePayload::new(blocks))
}

// ── Instructions ────────────────────────────────────────────────────

fn convert_instructions(data: &Value) -> Result<InstructionsPayload, ParseError> {
    let raw = RawInstructions::deserialize(data).map_err(ParseError::Payload)?;
    let lines = raw
        .lines
        .into_iter()
        .enumerate()
        .map(|(idx, line)| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "disassembly listings are far below u32::MAX lines"
            )]
            let id = LineId::new(idx as u32);
            DisasmLine {
                id,
                pc_offset: line.offset,
                text: line.text,
                source_offset: line.source_position,
                origins: convert_origins(line.origin),
            }
        })
        .collect();
    let node_ranges = raw
        .node_ranges
        .into_iter()
        .map(|r| (NodeId::new(r.node), r.start..r.end))
        .collect();
    Ok(InstructionsPayload { lines, node_ranges })
}
