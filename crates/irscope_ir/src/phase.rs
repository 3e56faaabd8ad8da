//! Phases and their kind-specific payloads.
//!
//! A [`Phase`] is one snapshot of the function at a pipeline stage. The
//! payload is a closed set of variants ([`PhaseBody`]); code that needs to
//! treat phases uniformly goes through [`Phase::members`], which lists the
//! selectable elements of any kind together with their origin links.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use rustc_hash::FxHashMap;

use crate::{BlockId, ElementId, GraphPayload, InstrId, LineId, NodeId, Origin, Origins};

// ── Phase kinds ─────────────────────────────────────────────────────

/// Kind tag of a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Graph,
    TurboshaftGraph,
    Schedule,
    Sequence,
    Instructions,
    /// Placeholder for a phase that failed to parse.
    Broken,
}

impl PhaseKind {
    /// Parse the trace spelling of a phase kind.
    ///
    /// `Broken` has no trace spelling.
    pub fn from_trace_name(name: &str) -> Option<Self> {
        match name {
            "graph" => Some(PhaseKind::Graph),
            "turboshaft_graph" => Some(PhaseKind::TurboshaftGraph),
            "schedule" => Some(PhaseKind::Schedule),
            "sequence" => Some(PhaseKind::Sequence),
            "instructions" | "disassembly" => Some(PhaseKind::Instructions),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PhaseKind::Graph => "graph",
            PhaseKind::TurboshaftGraph => "turboshaft_graph",
            PhaseKind::Schedule => "schedule",
            PhaseKind::Sequence => "sequence",
            PhaseKind::Instructions => "instructions",
            PhaseKind::Broken => "broken",
        }
    }

    /// Whether elements of this kind are graph nodes.
    #[inline]
    pub fn is_graph_like(self) -> bool {
        matches!(
            self,
            PhaseKind::Graph | PhaseKind::TurboshaftGraph | PhaseKind::Schedule
        )
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Sequence payload ────────────────────────────────────────────────

/// One instruction of a register-allocated sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub id: InstrId,
    pub opcode: String,
    /// Operand text as printed by the compiler, e.g. `[rax|R] = [rbx|R], #1`.
    pub operands: String,
    /// Nodes (usually of the preceding schedule) this instruction was selected for.
    pub origins: Origins,
}

/// A block of the instruction sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceBlock {
    pub id: BlockId,
    pub deferred: bool,
    pub instructions: Vec<Instruction>,
    pub successors: Vec<BlockId>,
    pub predecessors: Vec<BlockId>,
}

/// Instruction sequence produced after instruction selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequencePayload {
    blocks: Vec<SequenceBlock>,
    /// Instruction id -> (block position, position in block).
    instr_index: FxHashMap<InstrId, (usize, usize)>,
}

impl SequencePayload {
    /// Index the instructions of `blocks`. A repeated id resolves to its
    /// first occurrence.
    pub fn new(blocks: Vec<SequenceBlock>) -> Self {
        let mut instr_index = FxHashMap::default();
        for (b, block) in blocks.iter().enumerate() {
            for (i, instr) in block.instructions.iter().enumerate() {
                instr_index.entry(instr.id).or_insert((b, i));
            }
        }
        SequencePayload { blocks, instr_index }
    }

    pub fn blocks(&self) -> &[SequenceBlock] {
        &self.blocks
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }

    pub fn instruction(&self, id: InstrId) -> Option<&Instruction> {
        let &(b, i) = self.instr_index.get(&id)?;
        self.blocks.get(b)?.instructions.get(i)
    }
}

// ── Instructions (disassembly) payload ──────────────────────────────

/// One line of disassembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisasmLine {
    pub id: LineId,
    /// Offset of the machine instruction from the code start.
    pub pc_offset: u32,
    pub text: String,
    /// Byte offset into the function source, when known.
    pub source_offset: Option<u32>,
    pub origins: Origins,
}

/// Final disassembly plus the node → pc range table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstructionsPayload {
    pub lines: Vec<DisasmLine>,
    /// Half-open pc ranges emitted for each node.
    pub node_ranges: Vec<(NodeId, Range<u32>)>,
}

impl InstructionsPayload {
    pub fn line(&self, id: LineId) -> Option<&DisasmLine> {
        self.lines.get(id.index()).filter(|l| l.id == id)
    }

    /// Nodes whose pc range covers `pc_offset`.
    pub fn nodes_at(&self, pc_offset: u32) -> impl Iterator<Item = NodeId> + '_ {
        self.node_ranges
            .iter()
            .filter(move |(_, range)| range.contains(&pc_offset))
            .map(|(node, _)| *node)
    }
}

// ── Broken phase ────────────────────────────────────────────────────

/// Placeholder for a phase entry that failed to parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokenPhase {
    /// Kind declared by the trace, if it could be read.
    pub declared_kind: Option<String>,
    /// Rendered parse error.
    pub message: String,
}

// ── Phase ───────────────────────────────────────────────────────────

/// Kind-specific payload of a phase.
#[derive(Clone, Debug)]
pub enum PhaseBody {
    Graph(GraphPayload),
    /// Turboshaft graphs always carry blocks.
    TurboshaftGraph(GraphPayload),
    /// Scheduled graph: every node is placed in a block.
    Schedule(GraphPayload),
    Sequence(SequencePayload),
    Instructions(InstructionsPayload),
    Broken(BrokenPhase),
}

/// One snapshot of the function at a pipeline stage.
#[derive(Clone, Debug)]
pub struct Phase {
    /// Stable identity of the phase across a run.
    pub name: String,
    /// Position declared by the trace. An entry whose ordinal could not be
    /// read takes the ordinal of the entry listed before it.
    pub ordinal: u32,
    /// Position in the loaded registry (the navigation axis).
    pub index: usize,
    pub body: PhaseBody,
}

/// A selectable element of a phase with its origin links.
#[derive(Clone, Copy, Debug)]
pub struct Member<'a> {
    pub id: ElementId,
    pub origins: &'a [Origin],
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match &self.body {
            PhaseBody::Graph(_) => PhaseKind::Graph,
            PhaseBody::TurboshaftGraph(_) => PhaseKind::TurboshaftGraph,
            PhaseBody::Schedule(_) => PhaseKind::Schedule,
            PhaseBody::Sequence(_) => PhaseKind::Sequence,
            PhaseBody::Instructions(_) => PhaseKind::Instructions,
            PhaseBody::Broken(_) => PhaseKind::Broken,
        }
    }

    #[inline]
    pub fn is_broken(&self) -> bool {
        matches!(self.body, PhaseBody::Broken(_))
    }

    /// Graph payload for graph, Turboshaft graph and schedule phases.
    pub fn graph(&self) -> Option<&GraphPayload> {
        match &self.body {
            PhaseBody::Graph(g) | PhaseBody::TurboshaftGraph(g) | PhaseBody::Schedule(g) => {
                Some(g)
            }
            _ => None,
        }
    }

    pub fn broken(&self) -> Option<&BrokenPhase> {
        match &self.body {
            PhaseBody::Broken(b) => Some(b),
            _ => None,
        }
    }

    /// Every selectable element of the phase, in listing order.
    pub fn members(&self) -> Vec<Member<'_>> {
        match &self.body {
            PhaseBody::Graph(g) | PhaseBody::TurboshaftGraph(g) | PhaseBody::Schedule(g) => g
                .nodes()
                .iter()
                .map(|n| Member {
                    id: n.id.into(),
                    origins: &n.origins,
                })
                .collect(),
            PhaseBody::Sequence(s) => s
                .instructions()
                .map(|i| Member {
                    id: i.id.into(),
                    origins: &i.origins,
                })
                .collect(),
            PhaseBody::Instructions(d) => d
                .lines
                .iter()
                .map(|l| Member {
                    id: l.id.into(),
                    origins: &l.origins,
                })
                .collect(),
            PhaseBody::Broken(_) => Vec::new(),
        }
    }

    pub fn member_count(&self) -> usize {
        match &self.body {
            PhaseBody::Graph(g) | PhaseBody::TurboshaftGraph(g) | PhaseBody::Schedule(g) => {
                g.nodes().len()
            }
            PhaseBody::Sequence(s) => s.instructions().count(),
            PhaseBody::Instructions(d) => d.lines.len(),
            PhaseBody::Broken(_) => 0,
        }
    }

    pub fn contains(&self, id: ElementId) -> bool {
        match &self.body {
            PhaseBody::Graph(g) | PhaseBody::TurboshaftGraph(g) | PhaseBody::Schedule(g) => {
                g.contains(id.as_node())
            }
            PhaseBody::Sequence(s) => s.instruction(id.as_instr()).is_some(),
            PhaseBody::Instructions(d) => d.line(id.as_line()).is_some(),
            PhaseBody::Broken(_) => false,
        }
    }

    /// Searchable text of an element: node label, instruction text, or
    /// disassembly line.
    pub fn element_text(&self, id: ElementId) -> Option<Cow<'_, str>> {
        match &self.body {
            PhaseBody::Graph(g) | PhaseBody::TurboshaftGraph(g) | PhaseBody::Schedule(g) => g
                .node(id.as_node())
                .map(|n| Cow::Borrowed(n.label.as_str())),
            PhaseBody::Sequence(s) => s
                .instruction(id.as_instr())
                .map(|i| Cow::Owned(format!("{} {}", i.opcode, i.operands))),
            PhaseBody::Instructions(d) => d.line(id.as_line()).map(|l| Cow::Borrowed(l.text.as_str())),
            PhaseBody::Broken(_) => None,
        }
    }
}

#[cfg(test)]
mod tests;
