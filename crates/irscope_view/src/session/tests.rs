#![allow(clippy::unwrap_used)]

use irscope_ir::ElementId;
use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{container, trace_text};
use crate::TextContainer;

fn e(id: u32) -> ElementId {
    ElementId::new(id)
}

fn loaded() -> Session {
    let mut session = Session::default();
    assert!(session.load(&trace_text()).unwrap().is_empty());
    session
}

#[test]
fn nothing_works_before_load() {
    let mut session = Session::default();
    let (_, boxed) = container();
    assert!(matches!(session.activate(0, boxed), Err(SessionError::NoTrace)));
    assert!(matches!(session.render(), Err(SessionError::NoActiveView)));
    assert!(matches!(session.next(), Err(SessionError::NoActiveView)));
    assert!(session.highlighted().is_empty());
}

#[test]
fn activate_builds_the_matching_view() {
    let mut session = loaded();
    assert_eq!(session.registry().unwrap().phase_count(), 6);

    let (text, boxed) = container();
    assert!(session.activate(1, boxed).unwrap().is_none());
    assert_eq!(session.active_index(), Some(1));
    assert_eq!(session.active_view().unwrap().kind(), ViewKind::Graph);
    session.render().unwrap();
    assert!(text.borrow().text().starts_with("== typer [graph] =="));

    let (_, other) = container();
    let previous = session.activate(3, other).unwrap();
    assert!(previous.is_some());
    assert_eq!(session.active_view().unwrap().kind(), ViewKind::Schedule);
}

#[test]
fn out_of_range_phase() {
    let mut session = loaded();
    let (_, boxed) = container();
    let err = session.activate(6, boxed).err().unwrap();
    assert!(matches!(err, SessionError::PhaseOutOfRange { index: 6, count: 6 }));
    assert_eq!(err.to_string(), "phase 6 out of range (6 phases)");
}

#[test]
fn navigation_skips_broken_phases() {
    let mut session = loaded();
    let (text, boxed) = container();
    session.activate(1, boxed).unwrap();

    assert_eq!(session.next().unwrap(), Some(3));
    assert_eq!(session.next().unwrap(), Some(4));
    assert_eq!(session.next().unwrap(), Some(5));
    assert_eq!(session.next().unwrap(), None);
    assert_eq!(session.active_index(), Some(5));

    assert_eq!(session.previous().unwrap(), Some(4));
    assert_eq!(session.previous().unwrap(), Some(3));
    assert_eq!(session.previous().unwrap(), Some(1));
    assert_eq!(session.previous().unwrap(), Some(0));
    assert_eq!(session.previous().unwrap(), None);

    // The same container moved along.
    session.render().unwrap();
    assert!(text.borrow().text().starts_with("== bytecode graph [graph] =="));
}

#[test]
fn broken_phase_is_still_reachable_directly() {
    let mut session = loaded();
    let (text, boxed) = container();
    session.activate(2, boxed).unwrap();
    assert_eq!(session.active_view().unwrap().kind(), ViewKind::Info);
    session.render().unwrap();
    assert!(text.borrow().text().contains("unavailable"));
    assert_eq!(session.next().unwrap(), Some(3));
}

#[test]
fn selection_survives_navigation() {
    let mut session = loaded();
    let (_, boxed) = container();
    session.activate(1, boxed).unwrap();
    assert_eq!(session.click(e(3), SelectionMode::Replace).unwrap(), 1);

    session.next().unwrap();
    assert_eq!(session.highlighted(), vec![e(3)]);
    session.next().unwrap();
    assert_eq!(session.highlighted(), vec![e(1)]);
}

#[test]
fn load_replaces_everything() {
    let mut session = loaded();
    let (_, boxed) = container();
    session.activate(1, boxed).unwrap();
    let (_, source) = container();
    session.attach_source(source).unwrap();
    session.search("return", SelectionMode::Replace).unwrap();
    assert_eq!(session.selection().len(), 1);

    let released = session.load(&trace_text()).unwrap();
    assert_eq!(released.len(), 2);
    assert!(session.selection().is_empty());
    assert!(session.active_view().is_none());
    assert!(session.source_view().is_none());
    assert_eq!(session.broadcaster().subscriber_count(), 0);
}

#[test]
fn fatal_load_error_keeps_the_old_trace() {
    let mut session = loaded();
    let (_, boxed) = container();
    session.activate(3, boxed).unwrap();

    let err = session.load("{ not json").err().unwrap();
    assert!(matches!(err, SessionError::Load(_)));
    assert_eq!(session.registry().unwrap().phase_count(), 6);
    assert_eq!(session.active_index(), Some(3));
}

#[test]
fn source_view_follows_the_active_phase() {
    let mut session = loaded();
    assert!(matches!(
        session.select_source(0..1, SelectionMode::Replace),
        Err(SessionError::NoSourceView)
    ));

    let (_, boxed) = container();
    session.activate(3, boxed).unwrap();
    let shared = TextContainer::shared();
    session
        .attach_source(Box::new(std::rc::Rc::clone(&shared)))
        .unwrap();

    // Parameters `a` and `b` on the first line.
    assert_eq!(session.select_source(13..17, SelectionMode::Replace).unwrap(), 2);
    assert_eq!(session.highlighted(), vec![e(1), e(2)]);

    session.render().unwrap();
    let frame = shared.borrow().frame().cloned().unwrap();
    assert!(frame.lines[0].highlighted);
    assert!(!frame.lines[1].highlighted);
}

#[test]
fn same_id_policy_links_unannotated_nodes() {
    let text = serde_json::json!({
        "phases": [
            { "name": "a", "kind": "graph", "data": { "nodes": [{ "id": 7, "opcode": "Phi" }] } },
            { "name": "b", "kind": "graph", "data": { "nodes": [{ "id": 7, "opcode": "Phi" }] } },
        ],
    })
    .to_string();

    let mut explicit = Session::default();
    explicit.load(&text).unwrap();
    let (_, boxed) = container();
    explicit.activate(0, boxed).unwrap();
    explicit.click(e(7), SelectionMode::Replace).unwrap();
    assert_eq!(explicit.selection().members_in(1), Vec::<ElementId>::new());

    let mut same_id = Session::new(SessionConfig {
        origin_policy: irscope_identity::OriginPolicy::ExplicitOrSameId,
        ..SessionConfig::default()
    });
    same_id.load(&text).unwrap();
    let (_, boxed) = container();
    same_id.activate(0, boxed).unwrap();
    same_id.click(e(7), SelectionMode::Replace).unwrap();
    assert_eq!(same_id.selection().members_in(1), vec![e(7)]);
}

#[test]
fn prewarm_lays_out_graph_phases_on_load() {
    let mut session = Session::new(SessionConfig {
        prewarm: true,
        ..SessionConfig::default()
    });
    session.load(&trace_text()).unwrap();
    // Bytecode graph and typer share a topology; the schedule has blocks.
    assert_eq!(session.engine().cached_layouts(), 2);
}
