//! ID newtypes shared by every phase payload.
//!
//! All IDs are `u32` values scoped to a single phase: node 12 in one phase
//! has nothing to do with node 12 in another unless an origin link says so.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an ID from its raw value.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw `u32` value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Get the ID as `usize` (for indexing into `Vec`s).
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Node ID within a graph or schedule phase.
    NodeId,
    "n"
);

define_id!(
    /// Basic block ID within a phase that carries blocks.
    BlockId,
    "B"
);

define_id!(
    /// Instruction ID within a sequence phase.
    InstrId,
    "i"
);

define_id!(
    /// Line ID within an instructions (disassembly) phase.
    ///
    /// Lines are numbered by their position in the listing.
    LineId,
    "L"
);

define_id!(
    /// Kind-agnostic ID of a selectable element of a phase.
    ///
    /// Graph and schedule phases expose nodes, sequence phases expose
    /// instructions, instructions phases expose disassembly lines. Origin
    /// links and cross-phase identity are expressed in terms of this ID so
    /// the identity machinery does not need to know the phase kind.
    ElementId,
    "#"
);

impl From<NodeId> for ElementId {
    fn from(id: NodeId) -> Self {
        ElementId(id.0)
    }
}

impl From<InstrId> for ElementId {
    fn from(id: InstrId) -> Self {
        ElementId(id.0)
    }
}

impl From<LineId> for ElementId {
    fn from(id: LineId) -> Self {
        ElementId(id.0)
    }
}

impl ElementId {
    /// Reinterpret as a node ID (for graph-like phases).
    #[inline]
    pub const fn as_node(self) -> NodeId {
        NodeId(self.0)
    }

    /// Reinterpret as an instruction ID (for sequence phases).
    #[inline]
    pub const fn as_instr(self) -> InstrId {
        InstrId(self.0)
    }

    /// Reinterpret as a line ID (for instructions phases).
    #[inline]
    pub const fn as_line(self) -> LineId {
        LineId(self.0)
    }
}
