//! The layout pipeline for one graph payload.

use irscope_ir::{BlockId, GraphPayload};

use crate::geometry::{GraphLayout, LayoutStats, NodePlacement};
use crate::layering::{assign_layers, order_blocks, LayoutGraph};
use crate::ordering::{reduce_crossings, unordered};
use crate::placement::place;
use crate::routing::route_edges;
use crate::{CancellationToken, LayoutConfig};

/// Lay out a graph payload.
///
/// Never fails: disconnected, cyclic and empty graphs all get a valid
/// placement. A cancelled token yields an unoptimized placement with
/// `stats.cancelled` set.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(nodes = payload.nodes().len(), edges = payload.edges().len())
)]
pub fn compute_layout(
    payload: &GraphPayload,
    config: &LayoutConfig,
    token: &CancellationToken,
) -> GraphLayout {
    let graph = LayoutGraph::new(payload);

    let (groups, group_blocks): (Vec<Vec<usize>>, Vec<Option<BlockId>>) = if payload.has_blocks() {
        order_blocks(payload)
            .into_iter()
            .map(|b| {
                let block = &payload.blocks()[b];
                let members: Vec<usize> = block
                    .nodes
                    .iter()
                    .filter_map(|&id| payload.node_position(id))
                    .collect();
                (members, Some(block.id))
            })
            .unzip()
    } else {
        (vec![(0..graph.len()).collect()], vec![None])
    };

    let layering = assign_layers(&graph, &groups, token);
    let layer_count = layering.layer_count();
    let order = if layering.cancelled {
        unordered(&graph, &layering.layer, layer_count)
    } else {
        reduce_crossings(
            &graph,
            &layering.layer,
            layer_count,
            config.ordering_passes,
            token,
        )
    };

    let placement = place(&graph, config, &layering, &order.layers, &group_blocks);
    let routes = route_edges(&graph, config, &layering.layer, &order.layers, &placement);

    let mut position = vec![0usize; graph.len()];
    for members in &order.layers {
        for (i, &v) in members.iter().enumerate() {
            position[v] = i;
        }
    }
    let nodes = payload
        .nodes()
        .iter()
        .enumerate()
        .map(|(v, node)| NodePlacement {
            id: node.id,
            layer: layering.layer[v],
            order: position[v],
            rect: placement.rects[v],
            block: payload.block_of(node.id),
        })
        .collect();

    let stats = LayoutStats {
        passes_run: order.passes_run,
        crossings: order.crossings,
        back_edges: layering.back_edges.iter().filter(|&&b| b).count(),
        side_channels: routes.side_channels,
        cancelled: order.cancelled,
    };
    tracing::debug!(
        layers = layer_count,
        crossings = stats.crossings,
        passes = stats.passes_run,
        back_edges = stats.back_edges,
        cancelled = stats.cancelled,
        "layout complete"
    );
    GraphLayout::new(nodes, placement.bands, routes.edges, layer_count, stats)
}
