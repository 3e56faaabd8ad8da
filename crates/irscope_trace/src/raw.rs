//! Serde shapes of the trace document.
//!
//! These mirror the JSON the compiler writes and are converted into
//! `irscope_ir` types by `convert`. Unknown fields are ignored so newer
//! compilers can add annotations without breaking older inspectors.

use serde::Deserialize;

/// Function metadata at the trace root.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawFunction {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
    /// Offset of `source` within the script, subtracted from source positions.
    #[serde(default)]
    pub source_start: u32,
}

// ── Origins ─────────────────────────────────────────────────────────

/// Origin annotation: one reference or a list of references (a merge).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawOrigins {
    Many(Vec<RawOrigin>),
    One(RawOrigin),
}

impl RawOrigins {
    pub fn into_vec(self) -> Vec<RawOrigin> {
        match self {
            RawOrigins::Many(v) => v,
            RawOrigins::One(o) => vec![o],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawOrigin {
    Id(u32),
    Ref(RawOriginRef),
}

/// Object form of an origin.
///
/// Origins without a target (e.g. bytecode-position origins) carry no
/// cross-phase identity and are dropped during conversion.
#[derive(Debug, Deserialize)]
pub(crate) struct RawOriginRef {
    #[serde(
        default,
        rename = "nodeId",
        alias = "instructionId",
        alias = "id",
        alias = "target"
    )]
    pub target: Option<u32>,
    #[serde(default)]
    pub phase: Option<String>,
}

// ── Graph payloads ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawNode {
    pub id: u32,
    #[serde(alias = "op")]
    pub opcode: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub inputs: Vec<u32>,
    #[serde(default)]
    pub input_kinds: Vec<String>,
    #[serde(default, rename = "type")]
    pub output_type: Option<String>,
    #[serde(default)]
    pub origin: Option<RawOrigins>,
    #[serde(default)]
    pub control: bool,
    #[serde(default)]
    pub block_start: bool,
    #[serde(default)]
    pub source_position: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEdge {
    pub source: u32,
    pub target: u32,
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBlock {
    pub id: u32,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub deferred: bool,
    #[serde(default)]
    pub nodes: Vec<u32>,
    #[serde(default)]
    pub successors: Vec<u32>,
    #[serde(default)]
    pub predecessors: Vec<u32>,
}

/// Graph, Turboshaft graph, or structured schedule payload.
#[derive(Debug, Deserialize)]
pub(crate) struct RawGraph {
    pub nodes: Vec<RawNode>,
    /// When absent, edges are derived from node inputs.
    #[serde(default)]
    pub edges: Option<Vec<RawEdge>>,
    #[serde(default)]
    pub blocks: Vec<RawBlock>,
}

// ── Sequence payload ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct RawInstruction {
    pub id: u32,
    pub opcode: String,
    #[serde(default)]
    pub operands: String,
    #[serde(default)]
    pub origin: Option<RawOrigins>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSequenceBlock {
    pub id: u32,
    #[serde(default)]
    pub deferred: bool,
    #[serde(default)]
    pub instructions: Vec<RawInstruction>,
    #[serde(default)]
    pub successors: Vec<u32>,
    #[serde(default)]
    pub predecessors: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSequence {
    pub blocks: Vec<RawSequenceBlock>,
}

// ── Instructions payload ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawLine {
    #[serde(alias = "pcOffset")]
    pub offset: u32,
    pub text: String,
    #[serde(default)]
    pub source_position: Option<u32>,
    #[serde(default)]
    pub origin: Option<RawOrigins>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNodeRange {
    pub node: u32,
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawInstructions {
    #[serde(alias = "instructions")]
    pub lines: Vec<RawLine>,
    #[serde(default)]
    pub node_ranges: Vec<RawNodeRange>,
}
