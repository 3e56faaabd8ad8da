//! Crossing reduction within layers.

use std::cmp::Ordering;

use crate::layering::LayoutGraph;
use crate::CancellationToken;

/// Order of the nodes in every layer, plus what it cost to get there.
pub(crate) struct LayerOrder {
    pub layers: Vec<Vec<usize>>,
    pub passes_run: usize,
    pub crossings: usize,
    pub cancelled: bool,
}

/// Bucket nodes by layer, each layer in node id order.
fn initial_order(graph: &LayoutGraph<'_>, layer: &[usize], layer_count: usize) -> Vec<Vec<usize>> {
    let mut layers = vec![Vec::new(); layer_count];
    for (v, &l) in layer.iter().enumerate() {
        layers[l].push(v);
    }
    for members in &mut layers {
        members.sort_by_key(|&v| graph.id(v));
    }
    layers
}

/// Barycenter sweeps over value edges.
///
/// Each pass sweeps down (ordering a layer by the mean position of its
/// value inputs above) and then up (by the mean position of its value users
/// below). Nodes without such neighbors keep their current position; ties
/// break by node id. The best order seen is kept, since a pass can make
/// things worse. The token is polled before every pass; a cancelled run
/// returns the initial id order.
pub(crate) fn reduce_crossings(
    graph: &LayoutGraph<'_>,
    layer: &[usize],
    layer_count: usize,
    passes: usize,
    token: &CancellationToken,
) -> LayerOrder {
    let mut current = initial_order(graph, layer, layer_count);
    let mut position = vec![0usize; graph.len()];
    update_positions(&current, &mut position);

    let mut best_crossings = count_crossings(graph, layer, &current, &position);
    let mut best = current.clone();
    let mut passes_run = 0;

    for _ in 0..passes {
        if token.is_cancelled() {
            tracing::debug!(passes_run, "ordering cancelled");
            return LayerOrder {
                passes_run,
                ..unordered(graph, layer, layer_count)
            };
        }
        if best_crossings == 0 {
            break;
        }

        for l in 1..layer_count {
            sweep_layer(graph, layer, &mut current[l], &position, Direction::Down);
            update_positions(&current, &mut position);
        }
        for l in (0..layer_count.saturating_sub(1)).rev() {
            sweep_layer(graph, layer, &mut current[l], &position, Direction::Up);
            update_positions(&current, &mut position);
        }
        passes_run += 1;

        let crossings = count_crossings(graph, layer, &current, &position);
        tracing::trace!(pass = passes_run, crossings, "ordering pass");
        if crossings < best_crossings {
            best_crossings = crossings;
            best.clone_from(&current);
        }
    }

    LayerOrder {
        layers: best,
        passes_run,
        crossings: best_crossings,
        cancelled: false,
    }
}

/// Id order without any sweeps, for cancelled runs.
pub(crate) fn unordered(graph: &LayoutGraph<'_>, layer: &[usize], layer_count: usize) -> LayerOrder {
    let layers = initial_order(graph, layer, layer_count);
    let mut position = vec![0usize; graph.len()];
    update_positions(&layers, &mut position);
    let crossings = count_crossings(graph, layer, &layers, &position);
    LayerOrder {
        layers,
        passes_run: 0,
        crossings,
        cancelled: true,
    }
}

#[derive(Clone, Copy)]
enum Direction {
    /// Order by neighbors in earlier layers.
    Down,
    /// Order by neighbors in later layers.
    Up,
}

fn update_positions(layers: &[Vec<usize>], position: &mut [usize]) {
    for members in layers {
        for (i, &v) in members.iter().enumerate() {
            position[v] = i;
        }
    }
}

fn sweep_layer(
    graph: &LayoutGraph<'_>,
    layer: &[usize],
    members: &mut [usize],
    position: &[usize],
    direction: Direction,
) {
    let mut keyed: Vec<(f64, u32, usize)> = members
        .iter()
        .map(|&v| {
            let neighbors: Vec<usize> = match direction {
                Direction::Down => graph.in_edges[v]
                    .iter()
                    .filter(|&&e| graph.is_value(e))
                    .map(|&e| graph.ends[e].0)
                    .filter(|&u| layer[u] < layer[v])
                    .collect(),
                Direction::Up => graph.out_edges[v]
                    .iter()
                    .filter(|&&e| graph.is_value(e))
                    .map(|&e| graph.ends[e].1)
                    .filter(|&u| layer[u] > layer[v])
                    .collect(),
            };
            let key = if neighbors.is_empty() {
                position[v] as f64
            } else {
                neighbors.iter().map(|&u| position[u] as f64).sum::<f64>() / neighbors.len() as f64
            };
            (key, graph.id(v).raw(), v)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    for (slot, (_, _, v)) in members.iter_mut().zip(keyed) {
        *slot = v;
    }
}

/// Value-edge crossings between adjacent layers.
pub(crate) fn count_crossings(
    graph: &LayoutGraph<'_>,
    layer: &[usize],
    layers: &[Vec<usize>],
    position: &[usize],
) -> usize {
    let mut pairs_by_layer: Vec<Vec<(usize, usize)>> = vec![Vec::new(); layers.len()];
    for (e, &(s, t)) in graph.ends.iter().enumerate() {
        if !graph.is_value(e) {
            continue;
        }
        let (upper, lower) = match layer[s].cmp(&layer[t]) {
            Ordering::Less => (s, t),
            Ordering::Greater => (t, s),
            Ordering::Equal => continue,
        };
        if layer[lower] == layer[upper] + 1 {
            pairs_by_layer[layer[upper]].push((position[upper], position[lower]));
        }
    }
    pairs_by_layer
        .into_iter()
        .enumerate()
        .map(|(l, pairs)| {
            let width = layers.get(l + 1).map_or(0, Vec::len);
            inversions(pairs, width)
        })
        .sum()
}

/// Pairs `(a, b)` crossing when sorted by `a`: `a_i < a_j` but `b_i > b_j`.
///
/// Counted with a Fenwick tree over `b`. Pairs sharing an `a` never cross.
fn inversions(mut pairs: Vec<(usize, usize)>, width: usize) -> usize {
    if pairs.len() < 2 {
        return 0;
    }
    pairs.sort_unstable();
    let mut tree = vec![0usize; width + 1];
    let mut inserted = 0usize;
    let mut crossings = 0usize;
    let mut i = 0;
    while i < pairs.len() {
        let a = pairs[i].0;
        let group_end = pairs[i..]
            .iter()
            .position(|p| p.0 != a)
            .map_or(pairs.len(), |off| i + off);
        for &(_, b) in &pairs[i..group_end] {
            crossings += inserted - prefix_sum(&tree, b + 1);
        }
        for &(_, b) in &pairs[i..group_end] {
            let mut k = b + 1;
            while k < tree.len() {
                tree[k] += 1;
                k += k & k.wrapping_neg();
            }
            inserted += 1;
        }
        i = group_end;
    }
    crossings
}

/// Number of inserted values in `[0, end)`.
fn prefix_sum(tree: &[usize], end: usize) -> usize {
    let mut acc = 0;
    let mut k = end.min(tree.len() - 1);
    while k > 0 {
        acc += tree[k];
        k &= k - 1;
    }
    acc
}

#[cfg(test)]
mod tests;
