//! Function source with the positions of selected entities marked.

use std::ops::Range;
use std::sync::Arc;

use irscope_identity::EntityRef;
use irscope_ir::{ElementId, Phase, PhaseBody};
use irscope_trace::FunctionInfo;

use super::{Gesture, View, ViewCore, ViewKind};
use crate::frame::{Container, Frame};
use crate::selection::Selection;

/// View of the function source.
///
/// Selecting a byte range selects every node whose source position falls
/// in it: nodes of the bound phase when that phase is graph-like, else of
/// every graph-like phase. Lines holding a source position of any member of
/// a selected entity are highlighted. All offsets are relative to the
/// start of the function source.
pub struct SourceView {
    core: ViewCore,
    function: FunctionInfo,
    phases: Vec<Arc<Phase>>,
    offsets: Vec<u32>,
}

impl SourceView {
    pub fn new(container: Box<dyn Container>, function: FunctionInfo, phases: Vec<Arc<Phase>>) -> Self {
        SourceView {
            core: ViewCore::new(container),
            function,
            phases,
            offsets: Vec::new(),
        }
    }

    /// Source offsets of the selection, ascending.
    pub fn highlighted_offsets(&self) -> &[u32] {
        &self.offsets
    }

    fn relative(&self, position: u32) -> Option<u32> {
        position.checked_sub(self.function.source_start)
    }

    fn offset_of(&self, member: EntityRef) -> Option<u32> {
        let phase = self.phases.get(member.phase)?;
        let position = match &phase.body {
            PhaseBody::Graph(g) | PhaseBody::TurboshaftGraph(g) | PhaseBody::Schedule(g) => {
                g.node(member.id.as_node())?.source_position
            }
            PhaseBody::Instructions(listing) => listing.line(member.id.as_line())?.source_offset,
            PhaseBody::Sequence(_) | PhaseBody::Broken(_) => None,
        }?;
        self.relative(position)
    }

    fn pick_range(&self, range: &Range<u32>) -> Vec<EntityRef> {
        let bound = self.core.phase().filter(|p| p.kind().is_graph_like());
        let candidates: Vec<&Arc<Phase>> = match bound {
            Some(phase) => vec![phase],
            None => self
                .phases
                .iter()
                .filter(|p| p.kind().is_graph_like())
                .collect(),
        };
        let mut picked = Vec::new();
        for phase in candidates {
            let Some(graph) = phase.graph() else { continue };
            for node in graph.nodes() {
                let offset = node.source_position.and_then(|p| self.relative(p));
                if offset.is_some_and(|o| range.contains(&o)) {
                    picked.push(EntityRef::new(phase.index, node.id.into()));
                }
            }
        }
        picked
    }
}

impl View for SourceView {
    fn kind(&self) -> ViewKind {
        ViewKind::Source
    }

    /// Bind to the active phase, which scopes range selection.
    fn initialize(&mut self, phase: Arc<Phase>) {
        self.core.bind(phase);
    }

    fn render(&mut self) {
        let mut frame = Frame::new(format!("source of {}", self.function.name));
        match &self.function.source {
            Some(source) => {
                let mut start = 0u32;
                for (number, line) in source.split('\n').enumerate() {
                    let len = u32::try_from(line.len()).unwrap_or(u32::MAX);
                    let end = start.saturating_add(len);
                    let first = self.offsets.partition_point(|&o| o < start);
                    let marked = self.offsets.get(first).is_some_and(|&o| o <= end);
                    frame.marked(format!("{:>4} {line}", number + 1), marked);
                    start = end.saturating_add(1);
                }
            }
            None => frame.text("no source"),
        }
        self.core.draw(&frame);
    }

    fn on_selection_changed(&mut self, selection: &Selection) {
        let mut offsets: Vec<u32> = selection
            .entities()
            .flat_map(|e| e.members())
            .filter_map(|&m| self.offset_of(m))
            .collect();
        offsets.sort_unstable();
        offsets.dedup();
        self.offsets = offsets;
    }

    fn teardown(&mut self) -> Option<Box<dyn Container>> {
        self.offsets.clear();
        self.core.take_container()
    }

    /// Source lines are not elements; see [`SourceView::highlighted_offsets`].
    fn highlighted(&self) -> Vec<ElementId> {
        Vec::new()
    }

    fn pick(&mut self, gesture: &Gesture<'_>) -> Vec<EntityRef> {
        match gesture {
            Gesture::SourceRange(range) => self.pick_range(range),
            _ => Vec::new(),
        }
    }

    fn phase(&self) -> Option<&Arc<Phase>> {
        self.core.phase()
    }
}
