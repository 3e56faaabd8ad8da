//! Register-allocated instruction sequence.

use std::sync::Arc;

use irscope_identity::EntityRef;
use irscope_ir::{ElementId, Phase, PhaseBody};

use super::{Gesture, View, ViewCore, ViewKind};
use crate::frame::{Container, Frame};
use crate::selection::Selection;

pub struct SequenceView {
    core: ViewCore,
}

impl SequenceView {
    pub fn new(container: Box<dyn Container>) -> Self {
        SequenceView {
            core: ViewCore::new(container),
        }
    }
}

impl View for SequenceView {
    fn kind(&self) -> ViewKind {
        ViewKind::Sequence
    }

    fn initialize(&mut self, phase: Arc<Phase>) {
        self.core.bind(phase);
    }

    fn render(&mut self) {
        let Some(phase) = self.core.phase().cloned() else {
            return;
        };
        let mut frame = Frame::new(format!("{} [{}]", phase.name, phase.kind()));
        if let PhaseBody::Sequence(sequence) = &phase.body {
            for block in sequence.blocks() {
                frame.text(if block.deferred {
                    format!("{} (deferred):", block.id)
                } else {
                    format!("{}:", block.id)
                });
                for instr in &block.instructions {
                    let text = if instr.operands.is_empty() {
                        format!("  {:>4}: {}", instr.id.raw(), instr.opcode)
                    } else {
                        format!("  {:>4}: {} {}", instr.id.raw(), instr.opcode, instr.operands)
                    };
                    frame.element(instr.id.into(), text, self.core.is_highlighted(instr.id.into()));
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
