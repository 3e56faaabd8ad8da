//! Trace loading for the irscope IR inspector.
//!
//! A trace is a JSON document listing the phases a compiler pipeline
//! produced for one function:
//!
//! ```json
//! {
//!   "function": { "name": "add", "source": "function add(a, b) { return a + b; }" },
//!   "phases": [
//!     { "name": "graph builder", "ordinal": 0, "kind": "graph",
//!       "data": { "nodes": [{ "id": 0, "opcode": "Start" }] } }
//!   ]
//! }
//! ```
//!
//! [`PhaseRegistry::load`] parses the document into immutable
//! [`Phase`](irscope_ir::Phase)s. A phase whose entry is malformed keeps its
//! slot as a broken placeholder; only structural problems with the document
//! itself fail the load (see [`ParseError::is_fatal`]).
//!
//! Schedule phases may carry the compiler's textual schedule listing instead
//! of structured blocks; it is tokenized with `logos`.

mod convert;
mod error;
mod raw;
mod registry;
mod schedule_text;

#[cfg(test)]
mod test_helpers;

pub use error::ParseError;
pub use registry::{FunctionInfo, PhaseRegistry};
