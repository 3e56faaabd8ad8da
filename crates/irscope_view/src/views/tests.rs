#![allow(clippy::unwrap_used)]

use std::rc::Rc;
use std::sync::Arc;

use irscope_ir::ElementId;
use irscope_layout::LayoutEngine;
use irscope_trace::PhaseRegistry;
use pretty_assertions::assert_eq;

use super::*;
use crate::host::ViewHost;
use crate::selection::{SelectionBroadcaster, SelectionMode};
use crate::test_helpers::{container, registry, resolver};

const TYPER: usize = 1;
const BROKEN: usize = 2;
const SCHEDULE: usize = 3;
const SEQUENCE: usize = 4;
const DISASSEMBLY: usize = 5;

fn e(id: u32) -> ElementId {
    ElementId::new(id)
}

struct Fixture {
    registry: PhaseRegistry,
    broadcaster: Rc<SelectionBroadcaster>,
    engine: Arc<LayoutEngine>,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            registry: registry(),
            broadcaster: Rc::new(SelectionBroadcaster::new()),
            engine: Arc::new(LayoutEngine::default()),
        }
    }

    fn host(&self, mut view: Box<dyn View>, phase: usize) -> ViewHost {
        view.initialize(Arc::clone(self.registry.phase(phase).unwrap()));
        ViewHost::attach(view, Rc::clone(&self.broadcaster), resolver(&self.registry))
    }
}

#[test]
fn view_kind_follows_phase_kind() {
    let registry = registry();
    let kinds: Vec<ViewKind> = registry
        .phases()
        .iter()
        .map(|p| ViewKind::for_phase(p))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ViewKind::Graph,
            ViewKind::Graph,
            ViewKind::Info,
            ViewKind::Schedule,
            ViewKind::Sequence,
            ViewKind::Disassembly,
        ]
    );
}

#[test]
fn click_highlights_the_entity_in_every_view() {
    let fx = Fixture::new();
    let (graph_text, graph_box) = container();
    let graph = fx.host(Box::new(GraphView::new(graph_box, Arc::clone(&fx.engine))), TYPER);
    let (_, schedule_box) = container();
    let schedule = fx.host(Box::new(ScheduleView::new(schedule_box)), SCHEDULE);
    let (_, sequence_box) = container();
    let sequence = fx.host(Box::new(SequenceView::new(sequence_box)), SEQUENCE);
    let (_, disasm_box) = container();
    let disasm = fx.host(Box::new(DisassemblyView::new(disasm_box)), DISASSEMBLY);

    assert_eq!(graph.click(e(3), SelectionMode::Replace), 1);

    assert_eq!(graph.highlighted(), vec![e(3)]);
    assert_eq!(schedule.highlighted(), vec![e(3)]);
    assert_eq!(sequence.highlighted(), vec![e(1)]);
    assert_eq!(disasm.highlighted(), vec![e(1)]);

    graph.render();
    let text = graph_text.borrow();
    assert!(text.text().contains("* L"));
    assert_eq!(text.frame().unwrap().highlighted_elements(), vec![e(3)]);
}

#[test]
fn empty_replace_clears_every_view() {
    let fx = Fixture::new();
    let (_, a) = container();
    let schedule = fx.host(Box::new(ScheduleView::new(a)), SCHEDULE);
    let (_, b) = container();
    let sequence = fx.host(Box::new(SequenceView::new(b)), SEQUENCE);

    schedule.click(e(4), SelectionMode::Replace);
    assert_eq!(sequence.highlighted(), vec![e(2)]);

    fx.broadcaster.select(Vec::new(), SelectionMode::Replace);
    assert!(schedule.highlighted().is_empty());
    assert!(sequence.highlighted().is_empty());
}

#[test]
fn click_outside_the_phase_clears() {
    let fx = Fixture::new();
    let (_, boxed) = container();
    let schedule = fx.host(Box::new(ScheduleView::new(boxed)), SCHEDULE);
    schedule.click(e(1), SelectionMode::Replace);
    assert_eq!(schedule.click(e(99), SelectionMode::Replace), 0);
    assert!(fx.broadcaster.current().is_empty());
}

#[test]
fn search_matches_labels_and_opcodes() {
    let fx = Fixture::new();
    let phase = fx.registry.phase(TYPER).unwrap();
    assert_eq!(search(phase, "PARAMETER"), vec![e(1), e(2)]);
    assert_eq!(search(phase, "int32"), vec![e(3)]);
    assert!(search(phase, "  ").is_empty());

    let sequence = fx.registry.phase(SEQUENCE).unwrap();
    assert_eq!(search(sequence, "rbx"), vec![e(1)]);

    let (_, boxed) = container();
    let host = fx.host(Box::new(GraphView::new(boxed, Arc::clone(&fx.engine))), TYPER);
    assert_eq!(host.search("parameter", SelectionMode::Replace), 2);
    assert_eq!(host.highlighted(), vec![e(1), e(2)]);
}

#[test]
fn rectangle_selects_nodes_under_it() {
    let fx = Fixture::new();
    let (_, boxed) = container();
    let host = fx.host(Box::new(GraphView::new(boxed, Arc::clone(&fx.engine))), TYPER);
    let layout = fx
        .engine
        .layout(fx.registry.phase(TYPER).unwrap(), &irscope_layout::CancellationToken::new())
        .unwrap();

    assert_eq!(host.select_rect(layout.bounds, SelectionMode::Replace), 5);

    let start = layout.placement(irscope_ir::NodeId::new(0)).unwrap().rect;
    assert_eq!(host.select_rect(start, SelectionMode::Replace), 1);
    assert_eq!(host.highlighted(), vec![e(0)]);
}

#[test]
fn schedule_render_lists_blocks() {
    let fx = Fixture::new();
    let (text, boxed) = container();
    let host = fx.host(Box::new(ScheduleView::new(boxed)), SCHEDULE);
    host.click(e(3), SelectionMode::Replace);
    host.render();
    let text = text.borrow();
    assert!(text.text().contains("--- B0"));
    assert!(text.text().contains("*   3: Int32Add"));
}

#[test]
fn broken_phase_shows_its_diagnostic() {
    let fx = Fixture::new();
    let (text, boxed) = container();
    let info = fx.host(Box::new(InfoView::new(boxed)), BROKEN);
    assert_eq!(info.click(e(0), SelectionMode::Replace), 0);

    let (_, other) = container();
    let schedule = fx.host(Box::new(ScheduleView::new(other)), SCHEDULE);
    schedule.click(e(3), SelectionMode::Replace);
    assert!(info.highlighted().is_empty());

    info.render();
    let text = text.borrow();
    assert!(text.text().contains("unavailable:"));
    assert!(text.text().contains("declared kind: graph"));
}

#[test]
fn source_range_selects_nodes_and_marks_lines() {
    let fx = Fixture::new();
    let registry = &fx.registry;
    let (text, boxed) = container();
    let mut view = SourceView::new(
        boxed,
        registry.function().clone(),
        registry.phases().to_vec(),
    );
    view.initialize(Arc::clone(registry.phase(TYPER).unwrap()));
    let source = ViewHost::attach(Box::new(view), Rc::clone(&fx.broadcaster), resolver(registry));

    // `a + b` on the second line.
    assert_eq!(source.select_source(30..35, SelectionMode::Replace), 1);
    let selected = fx.broadcaster.current();
    assert_eq!(selected.members_in(TYPER), vec![e(3)]);

    source.render();
    let frame = text.borrow().frame().cloned().unwrap();
    let marked: Vec<bool> = frame.lines.iter().map(|l| l.highlighted).collect();
    assert_eq!(marked, vec![false, true, false]);
}

#[test]
fn teardown_returns_the_container_and_cancels_layout() {
    let fx = Fixture::new();
    let (text, boxed) = container();
    let mut view = GraphView::new(boxed, Arc::clone(&fx.engine));
    view.initialize(Arc::clone(fx.registry.phase(TYPER).unwrap()));
    let token = view.layout_token().cloned().unwrap();
    view.render();
    assert_eq!(text.borrow().draws(), 1);
    assert!(!view.is_layout_pending());

    let mut second = GraphView::new(view.teardown().unwrap(), Arc::clone(&fx.engine));
    assert!(text.borrow().text().is_empty());
    second.initialize(Arc::clone(fx.registry.phase(0).unwrap()));
    let pending = second.layout_token().cloned().unwrap();
    assert!(second.teardown().is_some());
    assert!(pending.is_cancelled());
    assert!(second.teardown().is_none());
    // The first run completed before teardown.
    assert!(!token.is_cancelled());
}
