//! Graph and Turboshaft graph phases, drawn from a layered layout.

use std::sync::Arc;

use irscope_identity::EntityRef;
use irscope_ir::{ElementId, Phase};
use irscope_layout::{CancellationToken, GraphLayout, LayoutEngine, PendingLayout};

use super::{Gesture, View, ViewCore, ViewKind};
use crate::frame::{Container, Frame};
use crate::selection::Selection;

/// View of a graph phase.
///
/// The layout starts on a background thread as soon as the view is
/// initialized and is awaited on first use. Tearing the view down before
/// then cancels it.
pub struct GraphView {
    core: ViewCore,
    engine: Arc<LayoutEngine>,
    pending: Option<PendingLayout>,
    layout: Option<Arc<GraphLayout>>,
}

impl GraphView {
    pub fn new(container: Box<dyn Container>, engine: Arc<LayoutEngine>) -> Self {
        GraphView {
            core: ViewCore::new(container),
            engine,
            pending: None,
            layout: None,
        }
    }

    /// The layout, if it has been awaited.
    pub fn layout(&self) -> Option<&Arc<GraphLayout>> {
        self.layout.as_ref()
    }

    pub fn is_layout_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Token of the in-flight layout run.
    pub fn layout_token(&self) -> Option<&CancellationToken> {
        self.pending.as_ref().map(PendingLayout::token)
    }

    fn ensure_layout(&mut self) -> Option<&Arc<GraphLayout>> {
        if self.layout.is_none() {
            if let Some(pending) = self.pending.take() {
                self.layout = pending.wait();
            } else if let Some(phase) = self.core.phase() {
                self.layout = self.engine.layout(phase, &CancellationToken::new());
            }
        }
        self.layout.as_ref()
    }
}

impl View for GraphView {
    fn kind(&self) -> ViewKind {
        ViewKind::Graph
    }

    fn initialize(&mut self, phase: Arc<Phase>) {
        self.layout = None;
        self.pending = Some(self.engine.spawn(Arc::clone(&phase)));
        self.core.bind(phase);
    }

    fn render(&mut self) {
        let Some(phase) = self.core.phase().cloned() else {
            return;
        };
        let layout = self.ensure_layout().cloned();
        let mut frame = Frame::new(format!("{} [{}]", phase.name, phase.kind()));
        match (layout, phase.graph()) {
            (Some(layout), Some(graph)) => {
                for l in 0..layout.layer_count {
                    for id in layout.layer(l) {
                        let (Some(node), Some(place)) = (graph.node(id), layout.placement(id))
                        else {
                            continue;
                        };
                        frame.element(
                            id.into(),
                            format!(
                                "L{l:<3} {} @ ({}, {})",
                                node.label, place.rect.x, place.rect.y
                            ),
                            self.core.is_highlighted(id.into()),
                        );
                    }
                }
                let stats = &layout.stats;
                frame.text(format!(
                    "{} layers, {} crossings, {} back edges{}",
                    layout.layer_count,
                    stats.crossings,
                    stats.back_edges,
                    if stats.cancelled { " (unoptimized)" } else { "" }
                ));
            }
            _ => frame.text("no layout"),
        }
        self.core.draw(&frame);
    }

    fn on_selection_changed(&mut self, selection: &Selection) {
        self.core.highlight(selection);
    }

    fn teardown(&mut self) -> Option<Box<dyn Container>> {
        if let Some(pending) = self.pending.take() {
            tracing::debug!("cancelling in-flight layout");
            pending.cancel();
        }
        self.layout = None;
        self.core.take_container()
    }

    fn highlighted(&self) -> Vec<ElementId> {
        self.core.highlighted().to_vec()
    }

    fn pick(&mut self, gesture: &Gesture<'_>) -> Vec<EntityRef> {
        let Gesture::Rect(area) = gesture else {
            return self.core.pick_common(gesture);
        };
        let Some(index) = self.core.phase().map(|p| p.index) else {
            return Vec::new();
        };
        self.ensure_layout()
            .map(|layout| {
                layout
                    .nodes_in(area)
                    .into_iter()
                    .map(|id| EntityRef::new(index, id.into()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn phase(&self) -> Option<&Arc<Phase>> {
        self.core.phase()
    }
}
