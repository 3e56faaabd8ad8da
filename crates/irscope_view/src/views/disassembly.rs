//! Final machine code listing.

use std::sync::Arc;

use irscope_identity::EntityRef;
use irscope_ir::{ElementId, Phase, PhaseBody};

use super::{Gesture, View, ViewCore, ViewKind};
use crate::frame::{Container, Frame};
use crate::selection::Selection;

/// View of an instructions phase, one line per machine instruction.
pub struct DisassemblyView {
    core: ViewCore,
}

impl DisassemblyView {
    pub fn new(container: Box<dyn Container>) -> Self {
        DisassemblyView {
            core: ViewCore::new(container),
        }
    }
}

impl View for DisassemblyView {
    fn kind(&self) -> ViewKind {
        ViewKind::Disassembly
    }

    fn initialize(&mut self, phase: Arc<Phase>) {
        self.core.bind(phase);
    }

    fn render(&mut self) {
        let Some(phase) = self.core.phase().cloned() else {
            return;
        };
        let mut frame = Frame::new(format!("{} [{}]", phase.name, phase.kind()));
        if let PhaseBody::Instructions(listing) = &phase.body {
            for line in &listing.lines {
                frame.element(
                    line.id.into(),
                    format!("{:#06x}  {}", line.pc_offset, line.text),
                    self.core.is_highlighted(line.id.into()),
                );
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
