//! `irscope layout`: lay out one graph phase and print the geometry.

use irscope_layout::{CancellationToken, LayoutEngine};
use irscope_trace::PhaseRegistry;

use super::graph_phase;
use crate::{CliError, Options};

/// Layers, node boxes, block bands, edge routes and layout statistics.
#[tracing::instrument(level = "debug", skip_all, fields(phase = ?options.phase))]
pub fn layout_phase(text: &str, options: &Options) -> Result<String, CliError> {
    let registry = PhaseRegistry::load(text)?;
    let phase = graph_phase(&registry, options)?;
    let engine = LayoutEngine::new(options.layout_config());
    let layout = engine.layout(phase, &CancellationToken::new());
    let (Some(layout), Some(graph)) = (layout, phase.graph()) else {
        return Err(CliError::NotAGraph {
            index: phase.index,
            kind: phase.kind().to_string(),
        });
    };

    let mut lines = vec![format!(
        "{} [{}]: {} layers, {:.1} x {:.1}",
        phase.name,
        phase.kind(),
        layout.layer_count,
        layout.bounds.width,
        layout.bounds.height
    )];
    for layer in 0..layout.layer_count {
        for id in layout.layer(layer) {
            let (Some(node), Some(place)) = (graph.node(id), layout.placement(id)) else {
                continue;
            };
            let r = place.rect;
            lines.push(format!(
                "L{layer:<3} {:<5} {:<24} ({:.1}, {:.1}) {:.1} x {:.1}",
                id.to_string(),
                node.label,
                r.x,
                r.y,
                r.width,
                r.height
            ));
        }
    }
    for band in &layout.blocks {
        lines.push(format!(
            "block {} layers {}..{}",
            band.id,
            band.first_layer,
            band.first_layer + band.layer_count
        ));
    }
    for edge in &layout.edges {
        lines.push(format!(
            "edge {} -> {} ({}) {} bends",
            edge.source,
            edge.target,
            edge.kind,
            edge.route.bends()
        ));
    }
    let stats = &layout.stats;
    lines.push(format!(
        "{} passes, {} crossings, {} back edges, {} side channels",
        stats.passes_run, stats.crossings, stats.back_edges, stats.side_channels
    ));
    Ok(lines.join("\n"))
}
