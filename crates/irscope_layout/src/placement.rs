//! Coordinates: layer heights, node widths and block bands.

use irscope_ir::BlockId;

use crate::geometry::{BlockBand, Rect};
use crate::layering::{LayoutGraph, Layering};
use crate::LayoutConfig;

/// Node rectangles and the vertical grid they sit on.
pub(crate) struct Placement {
    /// Rectangle per node position.
    pub rects: Vec<Rect>,
    /// Top of each layer.
    pub layer_y: Vec<f64>,
    pub bands: Vec<BlockBand>,
    /// Widest layer.
    pub width: f64,
}

impl Placement {
    /// Vertical center of the gap below `layer`.
    pub fn gap_below(&self, layer: usize, config: &LayoutConfig) -> f64 {
        let bottom = self.layer_y[layer] + config.node_height;
        match self.layer_y.get(layer + 1) {
            Some(&next) => (bottom + next) / 2.0,
            None => bottom + config.layer_gap / 2.0,
        }
    }

    /// Vertical center of the gap above `layer`.
    pub fn gap_above(&self, layer: usize, config: &LayoutConfig) -> f64 {
        match layer.checked_sub(1) {
            Some(prev) => self.gap_below(prev, config),
            None => self.layer_y.first().copied().unwrap_or(0.0) - config.layer_gap / 2.0,
        }
    }
}

/// Place nodes left to right in their layer order and stack layers
/// top to bottom.
///
/// Each layer is centered on the widest one. With blocks, every group gets
/// a band padded by half a block gap on each side.
pub(crate) fn place(
    graph: &LayoutGraph<'_>,
    config: &LayoutConfig,
    layering: &Layering,
    layers: &[Vec<usize>],
    group_blocks: &[Option<BlockId>],
) -> Placement {
    let has_blocks = group_blocks.iter().any(Option::is_some);
    let pad = if has_blocks { config.block_gap / 2.0 } else { 0.0 };

    let mut layer_y = vec![0.0; layers.len()];
    let mut spans = Vec::with_capacity(layering.group_layers.len());
    let mut y = 0.0;
    for &(first, count) in &layering.group_layers {
        let top = y;
        y += pad;
        for slot in &mut layer_y[first..first + count] {
            *slot = y;
            y += config.node_height + config.layer_gap;
        }
        y += pad - config.layer_gap;
        spans.push((top, y));
        y += config.layer_gap;
    }

    let widths: Vec<f64> = graph
        .payload
        .nodes()
        .iter()
        .map(|n| config.node_width(&n.label))
        .collect();
    let layer_width = |members: &[usize]| {
        let gaps = members.len().saturating_sub(1) as f64 * config.node_gap;
        members.iter().map(|&v| widths[v]).sum::<f64>() + gaps
    };
    let width = layers
        .iter()
        .map(|m| layer_width(m))
        .fold(0.0_f64, f64::max);

    let mut rects = vec![Rect::default(); graph.len()];
    for (l, members) in layers.iter().enumerate() {
        let mut x = (width - layer_width(members)) / 2.0;
        for &v in members {
            rects[v] = Rect::new(x, layer_y[l], widths[v], config.node_height);
            x += widths[v] + config.node_gap;
        }
    }

    let bands = if has_blocks {
        layering
            .group_layers
            .iter()
            .zip(group_blocks)
            .zip(spans)
            .filter_map(|((&(first, count), block), (top, bottom))| {
                block.map(|id| BlockBand {
                    id,
                    first_layer: first,
                    layer_count: count,
                    rect: Rect::new(-pad, top, width + 2.0 * pad, bottom - top),
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    Placement {
        rects,
        layer_y,
        bands,
        width,
    }
}
