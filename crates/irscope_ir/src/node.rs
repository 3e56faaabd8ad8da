//! Nodes, edges and origin links.

use std::fmt;

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::{ElementId, NodeId};

bitflags! {
    /// Control-flow flags carried by a node.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// The node participates in the control chain (`Start`, `Branch`, `Merge`, ...).
        const CONTROL = 1 << 0;
        /// The node opens a basic block.
        const BLOCK_START = 1 << 1;
    }
}

/// Backward pointer from an element to an element of an earlier phase.
///
/// With no `phase`, the link targets the phase immediately before the one
/// holding the element. With a phase name, it targets the latest earlier
/// phase of that name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Origin {
    /// The element this one was derived from.
    pub target: ElementId,
    /// Name of the phase holding `target`, if not the preceding one.
    pub phase: Option<String>,
}

impl Origin {
    /// Origin in the immediately preceding phase.
    pub fn previous(target: impl Into<ElementId>) -> Self {
        Origin {
            target: target.into(),
            phase: None,
        }
    }

    /// Origin in a named earlier phase.
    pub fn in_phase(target: impl Into<ElementId>, phase: impl Into<String>) -> Self {
        Origin {
            target: target.into(),
            phase: Some(phase.into()),
        }
    }
}

/// Origin list of one element.
///
/// Empty for fresh elements, one entry for a plain derivation, several for a
/// merge. Inline capacity 1 because merges are rare.
pub type Origins = SmallVec<[Origin; 1]>;

/// A node of a graph or schedule phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    /// Operator mnemonic, e.g. `Phi` or `Int32Add`.
    pub opcode: String,
    /// Display label. Defaults to `"{id}: {opcode}"` when the trace has none.
    pub label: String,
    /// Inputs in operand order.
    pub inputs: Vec<NodeId>,
    /// Output type descriptor, e.g. `Range(0, 10)`.
    pub output_type: Option<String>,
    pub origins: Origins,
    pub flags: NodeFlags,
    /// Byte offset into the function source this node was created for.
    pub source_position: Option<u32>,
}

impl Node {
    /// Create a node with no inputs, origins or flags.
    pub fn new(id: NodeId, opcode: impl Into<String>) -> Self {
        let opcode = opcode.into();
        Node {
            id,
            label: format!("{}: {}", id.raw(), opcode),
            opcode,
            inputs: Vec::new(),
            output_type: None,
            origins: Origins::new(),
            flags: NodeFlags::empty(),
            source_position: None,
        }
    }

    #[must_use]
    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = NodeId>) -> Self {
        self.inputs = inputs.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_origins(mut self, origins: impl IntoIterator<Item = Origin>) -> Self {
        self.origins = origins.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[inline]
    pub fn is_control(&self) -> bool {
        self.flags.contains(NodeFlags::CONTROL)
    }

    #[inline]
    pub fn is_block_start(&self) -> bool {
        self.flags.contains(NodeFlags::BLOCK_START)
    }
}

/// Kind of a dependency edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    Value,
    Control,
    Effect,
    FrameState,
}

impl EdgeKind {
    /// Parse the trace spelling of an edge kind.
    pub fn from_trace_name(name: &str) -> Option<Self> {
        match name {
            "value" => Some(EdgeKind::Value),
            "control" => Some(EdgeKind::Control),
            "effect" => Some(EdgeKind::Effect),
            "frame-state" | "frame_state" | "framestate" => Some(EdgeKind::FrameState),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Value => "value",
            EdgeKind::Control => "control",
            EdgeKind::Effect => "effect",
            EdgeKind::FrameState => "frame-state",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dependency edge from an input (`source`) to its user (`target`).
///
/// Parallel edges between the same pair are allowed as long as they carry
/// different kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId, kind: EdgeKind) -> Self {
        Edge {
            source,
            target,
            kind,
        }
    }

    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}
