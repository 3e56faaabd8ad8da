//! Trace parse errors.

use irscope_ir::{GraphError, InstrId};
use thiserror::Error;

/// Error from loading a trace or one of its phases.
///
/// Whole-trace variants (`Json`, `NotAnObject`, `MissingPhases`,
/// `DuplicateOrdinal`) abort the load. Everything else is confined to the
/// offending phase, which is kept as a broken placeholder.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed trace: {0}")]
    Json(#[source] serde_json::Error),

    #[error("trace root is not an object")]
    NotAnObject,

    #[error("trace has no `phases` array")]
    MissingPhases,

    #[error("phase entries {first} and {second} share ordinal {ordinal}")]
    DuplicateOrdinal {
        ordinal: u32,
        first: usize,
        second: usize,
    },

    #[error("phase entry is not an object")]
    PhaseNotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has the wrong type")]
    WrongType { field: &'static str },

    #[error("unknown phase kind `{0}`")]
    UnknownKind(String),

    #[error("unknown edge kind `{0}`")]
    UnknownEdgeKind(String),

    #[error("unknown block kind `{0}`")]
    UnknownBlockKind(String),

    #[error("malformed phase payload: {0}")]
    Payload(#[source] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("{kind} phase has no blocks")]
    MissingBlocks { kind: &'static str },

    #[error("duplicate instruction id {0}")]
    DuplicateInstruction(InstrId),

    #[error("schedule line {line}: {message}")]
    Schedule { line: usize, message: String },
}

impl ParseError {
    /// Whether this error aborts the whole load rather than one phase.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ParseError::Json(_)
                | ParseError::NotAnObject
                | ParseError::MissingPhases
                | ParseError::DuplicateOrdinal { .. }
        )
    }
}
