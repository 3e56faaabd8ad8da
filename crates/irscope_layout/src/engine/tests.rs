#![allow(clippy::unwrap_used)]

use irscope_ir::{PhaseBody, SequencePayload};
use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{graph, loop_graph, phase};

fn chain() -> GraphPayload {
    graph(&[(0, &[]), (1, &[0]), (2, &[1])])
}

#[test]
fn same_phase_hits_by_ordinal() {
    let engine = LayoutEngine::default();
    let p = phase("typer", 0, chain());
    let token = CancellationToken::new();
    let first = engine.layout(&p, &token).unwrap();
    let second = engine.layout(&p, &token).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(
        engine.cache_stats(),
        CacheStats {
            ordinal_hits: 1,
            topology_hits: 0,
            misses: 1,
        }
    );
}

#[test]
fn equal_topology_shares_a_layout() {
    let engine = LayoutEngine::default();
    let token = CancellationToken::new();
    let a = engine.layout(&phase("typer", 0, chain()), &token).unwrap();
    let b = engine.layout(&phase("lowering", 1, chain()), &token).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(engine.cache_stats().topology_hits, 1);
    assert_eq!(engine.cached_layouts(), 1);
}

#[test]
fn changed_topology_misses() {
    let engine = LayoutEngine::default();
    let token = CancellationToken::new();
    engine.layout(&phase("typer", 0, chain()), &token).unwrap();
    let shorter = graph(&[(0, &[]), (1, &[0])]);
    // Same ordinal, different graph: the ordinal entry is stale.
    let layout = engine.layout(&phase("typer", 0, shorter), &token).unwrap();
    assert_eq!(layout.nodes.len(), 2);
    assert_eq!(engine.cache_stats().misses, 2);
    assert_eq!(engine.cached_layouts(), 2);
}

#[test]
fn cancelled_layouts_are_not_cached() {
    let engine = LayoutEngine::default();
    let token = CancellationToken::new();
    token.cancel();
    let layout = engine.layout(&phase("typer", 0, loop_graph()), &token).unwrap();
    assert!(layout.stats.cancelled);
    assert_eq!(engine.cached_layouts(), 0);
    assert_eq!(engine.cache_stats().misses, 0);

    let fresh = engine
        .layout(&phase("typer", 0, loop_graph()), &CancellationToken::new())
        .unwrap();
    assert!(!fresh.stats.cancelled);
    assert_eq!(engine.cached_layouts(), 1);
}

#[test]
fn non_graph_phases_have_no_layout() {
    let engine = LayoutEngine::default();
    let p = Phase {
        name: "bytecode".to_string(),
        ordinal: 0,
        index: 0,
        body: PhaseBody::Sequence(SequencePayload::default()),
    };
    assert!(engine.layout(&p, &CancellationToken::new()).is_none());
}

#[test]
fn background_layout_completes() {
    let engine = Arc::new(LayoutEngine::default());
    let pending = engine.spawn(Arc::new(phase("typer", 0, loop_graph())));
    let layout = pending.wait().unwrap();
    assert_eq!(layout.nodes.len(), 6);
    assert!(!layout.stats.cancelled);
    assert_eq!(engine.cached_layouts(), 1);
}

#[test]
fn cancelled_background_layout_still_returns() {
    let engine = Arc::new(LayoutEngine::default());
    let pending = engine.spawn(Arc::new(phase("typer", 0, loop_graph())));
    pending.cancel();
    assert!(pending.token().is_cancelled());
    let layout = pending.wait().unwrap();
    assert_eq!(layout.nodes.len(), 6);
    // Whether the worker saw the cancel depends on timing.
    let expected = usize::from(!layout.stats.cancelled);
    assert_eq!(engine.cached_layouts(), expected);
}

#[test]
fn prewarm_fills_the_cache() {
    let engine = LayoutEngine::default();
    let phases = vec![
        Arc::new(phase("typer", 0, chain())),
        Arc::new(phase("lowering", 1, chain())),
        Arc::new(phase("schedule", 2, loop_graph())),
    ];
    let laid_out = engine.prewarm(&phases, &CancellationToken::new());
    assert_eq!(laid_out, 3);
    assert_eq!(engine.cached_layouts(), 2);

    engine.clear();
    assert_eq!(engine.cached_layouts(), 0);
}

#[test]
fn topology_tracks_graph_shape() {
    let a = chain();
    let b = graph(&[(0, &[]), (1, &[0]), (2, &[1])]);
    assert_eq!(Topology::of(&a), Topology::of(&b));
    assert_ne!(Topology::of(&a), Topology::of(&loop_graph()));
}
