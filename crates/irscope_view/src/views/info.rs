//! Phase summary without selectable elements.

use std::sync::Arc;

use irscope_identity::EntityRef;
use irscope_ir::{ElementId, Phase};

use super::{Gesture, View, ViewCore, ViewKind};
use crate::frame::{Container, Frame};
use crate::selection::Selection;

/// Degenerate view: no graph, nothing to select, selection ignored.
///
/// Shows the diagnostic of a phase that failed to parse.
pub struct InfoView {
    core: ViewCore,
}

impl InfoView {
    pub fn new(container: Box<dyn Container>) -> Self {
        InfoView {
            core: ViewCore::new(container),
        }
    }
}

impl View for InfoView {
    fn kind(&self) -> ViewKind {
        ViewKind::Info
    }

    fn initialize(&mut self, phase: Arc<Phase>) {
        self.core.bind(phase);
    }

    fn render(&mut self) {
        let Some(phase) = self.core.phase().cloned() else {
            return;
        };
        let mut frame = Frame::new(format!("{} [{}]", phase.name, phase.kind()));
        frame.text(format!("ordinal: {}", phase.ordinal));
        match phase.broken() {
            Some(broken) => {
                if let Some(kind) = &broken.declared_kind {
                    frame.text(format!("declared kind: {kind}"));
                }
                frame.text(format!("unavailable: {}", broken.message));
            }
            None => frame.text(format!("members: {}", phase.member_count())),
        }
        self.core.draw(&frame);
    }

    fn on_selection_changed(&mut self, _selection: &Selection) {}

    fn teardown(&mut self) -> Option<Box<dyn Container>> {
        self.core.take_container()
    }

    fn highlighted(&self) -> Vec<ElementId> {
        Vec::new()
    }

    fn pick(&mut self, _gesture: &Gesture<'_>) -> Vec<EntityRef> {
        Vec::new()
    }

    fn phase(&self) -> Option<&Arc<Phase>> {
        self.core.phase()
    }
}
