//! CLI error type.

use std::path::PathBuf;

use irscope_ir::ElementId;
use irscope_trace::ParseError;
use irscope_view::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid trace: {0}")]
    Trace(#[from] ParseError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("missing option --{0}")]
    MissingOption(&'static str),
    #[error("invalid value '{value}' for --{option}")]
    InvalidOption { option: &'static str, value: String },
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("no phase {index} (the trace has {count})")]
    NoSuchPhase { index: usize, count: usize },
    #[error("phase {index} is a {kind} phase, not a graph")]
    NotAGraph { index: usize, kind: String },
    #[error("phase {phase} has no element {id}")]
    NoSuchElement { phase: usize, id: ElementId },
    #[error("trace has no graph phase")]
    NoGraphPhase,
}
