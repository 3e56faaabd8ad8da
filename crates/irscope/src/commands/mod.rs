//! Command handlers for the irscope CLI.
//!
//! Every handler takes the trace text and the parsed [`Options`] and
//! returns the report to print. Reading the file is the binary's job.

use std::path::Path;
use std::sync::Arc;

use irscope_ir::Phase;
use irscope_trace::PhaseRegistry;

use crate::{CliError, Options};

mod layout;
mod phases;
mod render;
mod trace;

pub use layout::layout_phase;
pub use phases::list_phases;
pub use render::render_phase;
pub use trace::trace_entity;

/// Read a trace file.
pub fn read_trace(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Phase `index`, or a `NoSuchPhase` error.
fn phase_at(registry: &PhaseRegistry, index: usize) -> Result<&Arc<Phase>, CliError> {
    registry.phase(index).ok_or(CliError::NoSuchPhase {
        index,
        count: registry.phase_count(),
    })
}

/// The `--phase` phase, defaulting to the first graph-like one.
fn graph_phase<'r>(
    registry: &'r PhaseRegistry,
    options: &Options,
) -> Result<&'r Arc<Phase>, CliError> {
    let phase = match options.phase {
        Some(index) => phase_at(registry, index)?,
        None => registry
            .phases()
            .iter()
            .find(|p| p.kind().is_graph_like())
            .ok_or(CliError::NoGraphPhase)?,
    };
    if phase.graph().is_none() {
        return Err(CliError::NotAGraph {
            index: phase.index,
            kind: phase.kind().to_string(),
        });
    }
    Ok(phase)
}
