//! `irscope render`: draw one phase the way the inspector shows it.

use std::rc::Rc;

use irscope_ir::ElementId;
use irscope_view::{SelectionMode, Session, TextContainer};

use crate::{CliError, Options};

/// Render `--phase` (default 0), optionally after selecting `--node` or
/// the `--search` matches, and optionally with the function source.
#[tracing::instrument(level = "debug", skip_all, fields(phase = ?options.phase))]
pub fn render_phase(text: &str, options: &Options) -> Result<String, CliError> {
    let mut session = Session::new(options.session_config());
    session.load(text)?;

    let view = TextContainer::shared();
    session.activate(options.phase.unwrap_or(0), Box::new(Rc::clone(&view)))?;
    let source = if options.source {
        let source = TextContainer::shared();
        session.attach_source(Box::new(Rc::clone(&source)))?;
        Some(source)
    } else {
        None
    };

    if let Some(node) = options.node {
        session.click(ElementId::new(node), SelectionMode::Replace)?;
    }
    if let Some(needle) = &options.search {
        let mode = if options.node.is_some() {
            SelectionMode::Add
        } else {
            SelectionMode::Replace
        };
        session.search(needle, mode)?;
    }
    session.render()?;

    let mut out = view.borrow().text().to_string();
    if let Some(source) = source {
        out.push('\n');
        out.push_str(source.borrow().text());
    }
    Ok(out)
}
