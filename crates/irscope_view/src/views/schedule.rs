//! Scheduled graph as a block listing.

use std::sync::Arc;

use irscope_identity::EntityRef;
use irscope_ir::{ElementId, Phase};

use super::{Gesture, View, ViewCore, ViewKind};
use crate::frame::{Container, Frame};
use crate::selection::Selection;

/// View of a schedule phase: each block header, then its nodes.
pub struct ScheduleView {
    core: ViewCore,
}

impl ScheduleView {
    pub fn new(container: Box<dyn Container>) -> Self {
        ScheduleView {
            core: ViewCore::new(container),
        }
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl View for ScheduleView {
    fn kind(&self) -> ViewKind {
        ViewKind::Schedule
    }

    fn initialize(&mut self, phase: Arc<Phase>) {
        self.core.bind(phase);
    }

    fn render(&mut self) {
        let Some(phase) = self.core.phase().cloned() else {
            return;
        };
        let mut frame = Frame::new(format!("{} [{}]", phase.name, phase.kind()));
        if let Some(graph) = phase.graph() {
            for block in graph.blocks() {
                let mut header = format!("--- {}", block.id);
                if block.deferred {
                    header.push_str(" (deferred)");
                }
                if !block.predecessors.is_empty() {
                    header.push_str(&format!(" <- {}", join(&block.predecessors)));
                }
                if !block.successors.is_empty() {
                    header.push_str(&format!(" -> {}", join(&block.successors)));
                }
                frame.text(header);
                for &id in &block.nodes {
                    if let Some(node) = graph.node(id) {
                        let text = match &node.output_type {
                            Some(ty) => format!("  {} : {ty}", node.label),
                            None => format!("  {}", node.label),
                        };
                        frame.element(id.into(), text, self.core.is_highlighted(id.into()));
                    }
                }
            }
        }
        self.core.draw(&frame);
    }

    fn on_selection_changed(&mut self, selection: &Selection) {
        self.core.highlight(selection);
    }

    fn teardown(&mut self) -> Option<Box<dyn Container>> {
        self.core.take_container()
    }

    fn highlighted(&self) -> Vec<ElementId> {
        self.core.highlighted().to_vec()
    }

    fn pick(&mut self, gesture: &Gesture<'_>) -> Vec<EntityRef> {
        self.core.pick_common(gesture)
    }

    fn phase(&self) -> Option<&Arc<Phase>> {
        self.core.phase()
    }
}
