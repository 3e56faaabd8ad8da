//! The view contract and its variants.
//!
//! Every variant implements the same four operations (initialize, render,
//! react to selection, tear down) over a different payload shape. Views
//! never write to phase data; the only thing they change outside
//! themselves is the selection, through a [`ViewHost`](crate::ViewHost).

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use irscope_identity::EntityRef;
use irscope_ir::{ElementId, Phase, PhaseBody, PhaseKind};
use irscope_layout::Rect;

use crate::frame::{Container, Frame};
use crate::selection::Selection;

mod disassembly;
mod graph;
mod info;
mod schedule;
mod sequence;
mod source;

pub use disassembly::DisassemblyView;
pub use graph::GraphView;
pub use info::InfoView;
pub use schedule::ScheduleView;
pub use sequence::SequenceView;
pub use source::SourceView;

/// Which variant a view is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Graph,
    Schedule,
    Sequence,
    Disassembly,
    Info,
    Source,
}

impl ViewKind {
    /// Variant that displays `phase`. Broken phases get an info view.
    pub fn for_phase(phase: &Phase) -> Self {
        match phase.kind() {
            PhaseKind::Graph | PhaseKind::TurboshaftGraph => ViewKind::Graph,
            PhaseKind::Schedule => ViewKind::Schedule,
            PhaseKind::Sequence => ViewKind::Sequence,
            PhaseKind::Instructions => ViewKind::Disassembly,
            PhaseKind::Broken => ViewKind::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewKind::Graph => "graph",
            ViewKind::Schedule => "schedule",
            ViewKind::Sequence => "sequence",
            ViewKind::Disassembly => "disassembly",
            ViewKind::Info => "info",
            ViewKind::Source => "source",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user selection gesture, before it is mapped to entities.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture<'a> {
    /// Click on one element.
    Click(ElementId),
    /// Drag a rectangle over a graph.
    Rect(Rect),
    /// Case-insensitive substring of a label or opcode.
    Search(&'a str),
    /// Byte range of the function source.
    SourceRange(Range<u32>),
}

/// Capability interface shared by every view variant.
pub trait View {
    fn kind(&self) -> ViewKind;

    /// Bind the view to a phase. Called once before the first render.
    fn initialize(&mut self, phase: Arc<Phase>);

    /// Draw into the container.
    fn render(&mut self);

    /// Update highlighting for a new selection. Never changes structure.
    fn on_selection_changed(&mut self, selection: &Selection);

    /// Release resources and hand the container back.
    ///
    /// Returns `None` if the container was already returned.
    fn teardown(&mut self) -> Option<Box<dyn Container>>;

    /// Highlighted local ids, ascending.
    fn highlighted(&self) -> Vec<ElementId>;

    /// Phase-qualified elements a gesture lands on.
    ///
    /// Gestures a variant does not support pick nothing.
    fn pick(&mut self, gesture: &Gesture<'_>) -> Vec<EntityRef>;

    /// The bound phase, if any.
    fn phase(&self) -> Option<&Arc<Phase>>;
}

/// State every phase view carries.
pub(crate) struct ViewCore {
    container: Option<Box<dyn Container>>,
    phase: Option<Arc<Phase>>,
    highlighted: Vec<ElementId>,
}

impl ViewCore {
    pub(crate) fn new(container: Box<dyn Container>) -> Self {
        ViewCore {
            container: Some(container),
            phase: None,
            highlighted: Vec::new(),
        }
    }

    pub(crate) fn bind(&mut self, phase: Arc<Phase>) {
        self.phase = Some(phase);
        self.highlighted.clear();
    }

    pub(crate) fn phase(&self) -> Option<&Arc<Phase>> {
        self.phase.as_ref()
    }

    pub(crate) fn draw(&mut self, frame: &Frame) {
        if let Some(container) = &mut self.container {
            container.draw(frame);
        }
    }

    pub(crate) fn is_highlighted(&self, id: ElementId) -> bool {
        self.highlighted.binary_search(&id).is_ok()
    }

    pub(crate) fn highlighted(&self) -> &[ElementId] {
        &self.highlighted
    }

    /// Highlight the members the selection has in the bound phase.
    pub(crate) fn highlight(&mut self, selection: &Selection) {
        self.highlighted = match &self.phase {
            Some(phase) => selection.members_in(phase.index),
            None => Vec::new(),
        };
    }

    pub(crate) fn take_container(&mut self) -> Option<Box<dyn Container>> {
        let mut container = self.container.take()?;
        container.clear();
        Some(container)
    }

    /// Elements picked by a click or search; other gestures pick nothing.
    pub(crate) fn pick_common(&self, gesture: &Gesture<'_>) -> Vec<EntityRef> {
        let Some(phase) = &self.phase else {
            return Vec::new();
        };
        let ids = match gesture {
            Gesture::Click(id) if phase.contains(*id) => vec![*id],
            Gesture::Search(text) => search(phase, text),
            _ => Vec::new(),
        };
        ids.into_iter()
            .map(|id| EntityRef::new(phase.index, id))
            .collect()
    }
}

/// Members whose label, opcode or text contains `needle`, ignoring case.
///
/// An empty needle matches nothing.
pub fn search(phase: &Phase, needle: &str) -> Vec<ElementId> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let matches = |text: &str| text.to_lowercase().contains(&needle);
    match &phase.body {
        PhaseBody::Graph(g) | PhaseBody::TurboshaftGraph(g) | PhaseBody::Schedule(g) => g
            .nodes()
            .iter()
            .filter(|n| matches(&n.label) || matches(&n.opcode))
            .map(|n| n.id.into())
            .collect(),
        _ => phase
            .members()
            .into_iter()
            .filter(|m| phase.element_text(m.id).is_some_and(|t| matches(&t)))
            .map(|m| m.id)
            .collect(),
    }
}

#[cfg(test)]
mod tests;
