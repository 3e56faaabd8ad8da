//! Block ordering and layer assignment.
//!
//! Nodes are addressed by their position in the payload's node list
//! throughout the layout pipeline; edges by their position in the edge list.

use irscope_ir::{EdgeKind, GraphPayload, NodeId};

use crate::CancellationToken;

/// Position-indexed adjacency of a graph payload.
pub(crate) struct LayoutGraph<'a> {
    pub payload: &'a GraphPayload,
    /// Edge endpoints as node positions.
    pub ends: Vec<(usize, usize)>,
    /// Outgoing edge indices per node.
    pub out_edges: Vec<Vec<usize>>,
    /// Incoming edge indices per node.
    pub in_edges: Vec<Vec<usize>>,
}

impl<'a> LayoutGraph<'a> {
    pub fn new(payload: &'a GraphPayload) -> Self {
        let n = payload.nodes().len();
        let mut out_edges = vec![Vec::new(); n];
        let mut in_edges = vec![Vec::new(); n];
        let mut ends = Vec::with_capacity(payload.edges().len());
        for (idx, edge) in payload.edges().iter().enumerate() {
            // Endpoints were validated at load time.
            let s = payload.node_position(edge.source).unwrap_or(0);
            let t = payload.node_position(edge.target).unwrap_or(0);
            ends.push((s, t));
            out_edges[s].push(idx);
            in_edges[t].push(idx);
        }
        LayoutGraph {
            payload,
            ends,
            out_edges,
            in_edges,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.out_edges.len()
    }

    #[inline]
    pub fn id(&self, pos: usize) -> NodeId {
        self.payload.nodes()[pos].id
    }

    #[inline]
    pub fn is_value(&self, edge: usize) -> bool {
        self.payload.edges()[edge].kind == EdgeKind::Value
    }
}

// ── Block order ─────────────────────────────────────────────────────

/// Block positions in reverse postorder from the entry blocks.
///
/// Entry blocks are those without predecessors, visited in id order.
/// Blocks unreachable from any entry follow in id order. In the result only
/// loop back edges point backward.
pub(crate) fn order_blocks(payload: &GraphPayload) -> Vec<usize> {
    let blocks = payload.blocks();
    let mut by_id: Vec<usize> = (0..blocks.len()).collect();
    by_id.sort_by_key(|&b| blocks[b].id);

    let mut visited = vec![false; blocks.len()];
    let mut postorder = Vec::with_capacity(blocks.len());
    for &root in by_id.iter().filter(|&&b| blocks[b].predecessors.is_empty()) {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let mut stack = vec![(root, 0usize)];
        while let Some((block, next)) = stack.last_mut() {
            let succs = &blocks[*block].successors;
            if let Some(&succ_id) = succs.get(*next) {
                *next += 1;
                if let Some(succ) = payload.block_position(succ_id) {
                    if !visited[succ] {
                        visited[succ] = true;
                        stack.push((succ, 0));
                    }
                }
            } else {
                postorder.push(*block);
                stack.pop();
            }
        }
    }

    postorder.reverse();
    postorder.extend(by_id.into_iter().filter(|&b| !visited[b]));
    postorder
}

// ── Layers ──────────────────────────────────────────────────────────

/// Result of layer assignment.
pub(crate) struct Layering {
    /// Global layer per node position.
    pub layer: Vec<usize>,
    /// Layer range of each group, in group order.
    pub group_layers: Vec<(usize, usize)>,
    /// Edges excluded as back edges.
    pub back_edges: Vec<bool>,
    /// Layering stopped early; later groups got fallback layers.
    pub cancelled: bool,
}

impl Layering {
    pub fn layer_count(&self) -> usize {
        self.group_layers
            .last()
            .map_or(0, |&(first, count)| first + count)
    }
}

/// Assign layers to each group independently and stack the groups.
///
/// A group is the node list of one block, or the whole graph when the phase
/// has no blocks. Every group spans at least one layer. The token is polled
/// between groups; once cancelled, the remaining groups get one layer per
/// node in listing order.
pub(crate) fn assign_layers(
    graph: &LayoutGraph<'_>,
    groups: &[Vec<usize>],
    token: &CancellationToken,
) -> Layering {
    let n = graph.len();
    let mut group_of = vec![usize::MAX; n];
    for (g, members) in groups.iter().enumerate() {
        for &v in members {
            group_of[v] = g;
        }
    }

    let mut layer = vec![0usize; n];
    let mut back_edges = vec![false; graph.ends.len()];
    let mut group_layers = Vec::with_capacity(groups.len());
    let mut cancelled = false;
    let mut base = 0usize;

    for (g, members) in groups.iter().enumerate() {
        if !cancelled && token.is_cancelled() {
            tracing::debug!(group = g, "layering cancelled");
            cancelled = true;
        }
        let count = if cancelled {
            for (i, &v) in members.iter().enumerate() {
                layer[v] = base + i;
            }
            members.len()
        } else {
            mark_back_edges(graph, members, &group_of, g, &mut back_edges);
            longest_path(graph, members, &group_of, g, &back_edges, base, &mut layer)
        };
        let count = count.max(1);
        group_layers.push((base, count));
        base += count;
    }

    Layering {
        layer,
        group_layers,
        back_edges,
        cancelled,
    }
}

/// Mark edges closing a cycle inside one group.
///
/// Depth-first from the group's sources in id order, then from any node not
/// yet reached in id order. Successors are visited in edge order, so the
/// result depends only on the payload.
fn mark_back_edges(
    graph: &LayoutGraph<'_>,
    members: &[usize],
    group_of: &[usize],
    g: usize,
    back_edges: &mut [bool],
) {
    const UNSEEN: u8 = 0;
    const ON_STACK: u8 = 1;
    const DONE: u8 = 2;

    let in_group = |v: usize| group_of[v] == g;
    let mut roots: Vec<usize> = members.to_vec();
    roots.sort_by_key(|&v| {
        let has_pred = graph.in_edges[v]
            .iter()
            .any(|&e| in_group(graph.ends[e].0) && graph.ends[e].0 != v);
        (has_pred, graph.id(v))
    });

    let mut state = vec![UNSEEN; graph.len()];
    for root in roots {
        if state[root] != UNSEEN {
            continue;
        }
        state[root] = ON_STACK;
        let mut stack = vec![(root, 0usize)];
        while let Some((v, next)) = stack.last_mut() {
            let v = *v;
            if let Some(&e) = graph.out_edges[v].get(*next) {
                *next += 1;
                let t = graph.ends[e].1;
                if !in_group(t) {
                    continue;
                }
                match state[t] {
                    UNSEEN => {
                        state[t] = ON_STACK;
                        stack.push((t, 0));
                    }
                    ON_STACK => back_edges[e] = true,
                    _ => {}
                }
            } else {
                state[v] = DONE;
                stack.pop();
            }
        }
    }
}

/// Longest-path layering of one group over its non-back edges.
///
/// Returns the number of layers used.
fn longest_path(
    graph: &LayoutGraph<'_>,
    members: &[usize],
    group_of: &[usize],
    g: usize,
    back_edges: &[bool],
    base: usize,
    layer: &mut [usize],
) -> usize {
    let forward = |e: usize| !back_edges[e] && group_of[graph.ends[e].0] == g && group_of[graph.ends[e].1] == g;

    let mut in_degree: Vec<usize> = vec![0; graph.len()];
    for &v in members {
        in_degree[v] = graph.in_edges[v].iter().filter(|&&e| forward(e)).count();
    }
    let mut local = vec![0usize; graph.len()];
    let mut queue: Vec<usize> = members.iter().copied().filter(|&v| in_degree[v] == 0).collect();
    queue.sort_by_key(|&v| graph.id(v));

    let mut head = 0;
    while head < queue.len() {
        let u = queue[head];
        head += 1;
        for &e in &graph.out_edges[u] {
            if !forward(e) {
                continue;
            }
            let v = graph.ends[e].1;
            local[v] = local[v].max(local[u] + 1);
            in_degree[v] -= 1;
            if in_degree[v] == 0 {
                queue.push(v);
            }
        }
    }

    let mut count = 0;
    for &v in members {
        layer[v] = base + local[v];
        count = count.max(local[v] + 1);
    }
    count
}
