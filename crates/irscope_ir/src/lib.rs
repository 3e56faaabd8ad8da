//! Phase model for the irscope IR inspector.
//!
//! This crate provides:
//!
//! - **IDs** ([`NodeId`], [`BlockId`], [`InstrId`], [`LineId`], [`ElementId`]):
//!   `u32` newtypes scoped to one phase.
//!
//! - **Graph model** ([`Node`], [`Edge`], [`Block`], [`GraphPayload`]): one
//!   phase's graph, validated once at load time and immutable afterwards.
//!
//! - **Phases** ([`Phase`], [`PhaseBody`], [`PhaseKind`]): a closed set of
//!   payload variants (graph, Turboshaft graph, schedule, sequence,
//!   instructions, broken) with a uniform [`Member`] view used by the
//!   identity resolver.
//!
//! - **Origins** ([`Origin`]): explicit backward pointers from an element to
//!   the element(s) of an earlier phase it was derived from.
//!
//! # Crate Dependencies
//!
//! Leaf crate: no dependency on trace parsing, identity or layout. The
//! trace loader builds these types, everything else only reads them.

mod graph;
mod ids;
mod node;
mod phase;

pub use graph::{Block, BlockKind, GraphError, GraphPayload};
pub use ids::{BlockId, ElementId, InstrId, LineId, NodeId};
pub use node::{Edge, EdgeKind, Node, NodeFlags, Origin, Origins};
pub use phase::{
    BrokenPhase, DisasmLine, Instruction, InstructionsPayload, Member, Phase, PhaseBody,
    PhaseKind, SequenceBlock, SequencePayload,
};
