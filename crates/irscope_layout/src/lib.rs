//! Layered graph layout for the irscope IR inspector.
//!
//! A Sugiyama-style pipeline over one graph phase:
//!
//! 1. **Block order**: reverse postorder from the entry blocks, so only
//!    loop back edges point upward.
//! 2. **Layering**: back edges found by a deterministic DFS are set aside,
//!    then each block (or the whole graph, without blocks) is layered by
//!    longest path from its sources. Blocks are stacked in block order.
//! 3. **Ordering**: barycenter sweeps over value edges, a bounded number of
//!    passes ([`LayoutConfig::ordering_passes`]).
//! 4. **Coordinates**: node width from label length, layers centered on the
//!    widest one.
//! 5. **Routing**: orthogonal routes through layer gaps, side channels for
//!    blocked long edges and back edges, bowed curves for self loops and
//!    same-layer edges.
//!
//! Layout never fails. The token in [`CancellationToken`] is polled between
//! blocks during layering and between ordering passes; a cancelled run
//! returns a valid, unoptimized placement.
//!
//! [`LayoutEngine`] caches layouts by phase ordinal and [`Topology`], runs
//! layouts on a background thread ([`LayoutEngine::spawn`]) and prewarms
//! many phases in parallel with `rayon`.

mod cancel;
mod compute;
mod config;
mod engine;
mod geometry;
mod layering;
mod ordering;
mod placement;
mod routing;

#[cfg(test)]
mod test_helpers;

pub use cancel::CancellationToken;
pub use compute::compute_layout;
pub use config::LayoutConfig;
pub use engine::{CacheStats, LayoutEngine, PendingLayout, Topology};
pub use geometry::{
    BlockBand, EdgeRoute, GraphLayout, LayoutStats, NodePlacement, Point, Rect, RoutedEdge,
};
