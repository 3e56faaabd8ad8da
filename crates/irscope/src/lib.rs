//! irscope command-line driver.
//!
//! The binary reads a trace file and hands its text to one of the
//! [`commands`]; every command returns its report as a string so the
//! library can be tested without a terminal.
//!
//! # Logging
//!
//! Set `RUST_LOG` to get a hierarchical trace of loading, identity
//! resolution and layout, e.g. `RUST_LOG=irscope_layout=debug`.

use std::sync::Once;

pub mod commands;
mod error;
mod options;

pub use error::CliError;
pub use options::Options;

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        }
    });
}
