use pretty_assertions::assert_eq;

use super::*;
use crate::layering::assign_layers;
use crate::test_helpers::graph;

#[test]
fn inversions_count_crossing_pairs() {
    assert_eq!(inversions(vec![(0, 1), (1, 0)], 2), 1);
    assert_eq!(inversions(vec![(0, 0), (1, 1)], 2), 0);
    // Shared endpoints never cross.
    assert_eq!(inversions(vec![(0, 0), (0, 1), (1, 1)], 2), 0);
    assert_eq!(inversions(vec![(0, 2), (1, 1), (2, 0)], 3), 3);
}

/// Top layer `0, 1`; bottom `2` uses `1` and `3` uses `0`.
fn crossed() -> irscope_ir::GraphPayload {
    graph(&[(0, &[]), (1, &[]), (2, &[1]), (3, &[0])])
}

#[test]
fn sweep_removes_simple_crossing() {
    let payload = crossed();
    let g = LayoutGraph::new(&payload);
    let token = CancellationToken::new();
    let layering = assign_layers(&g, &[vec![0, 1, 2, 3]], &token);
    let order = reduce_crossings(&g, &layering.layer, 2, 4, &token);
    assert_eq!(order.crossings, 0);
    assert_eq!(order.passes_run, 1);
    assert_eq!(order.layers, vec![vec![0, 1], vec![3, 2]]);
}

#[test]
fn zero_passes_keep_id_order() {
    let payload = crossed();
    let g = LayoutGraph::new(&payload);
    let token = CancellationToken::new();
    let layering = assign_layers(&g, &[vec![0, 1, 2, 3]], &token);
    let order = reduce_crossings(&g, &layering.layer, 2, 0, &token);
    assert_eq!(order.crossings, 1);
    assert_eq!(order.passes_run, 0);
    assert_eq!(order.layers, vec![vec![0, 1], vec![2, 3]]);
}

#[test]
fn cancelled_ordering_returns_id_order() {
    let payload = crossed();
    let g = LayoutGraph::new(&payload);
    let token = CancellationToken::new();
    let layering = assign_layers(&g, &[vec![0, 1, 2, 3]], &token);
    token.cancel();
    let order = reduce_crossings(&g, &layering.layer, 2, 4, &token);
    assert!(order.cancelled);
    assert_eq!(order.layers, vec![vec![0, 1], vec![2, 3]]);
}
