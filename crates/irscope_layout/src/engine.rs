//! Layout engine: cached, cancellable, optionally off-thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use irscope_ir::{BlockId, EdgeKind, GraphPayload, NodeId, Phase};
use parking_lot::Mutex;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::compute::compute_layout;
use crate::{CancellationToken, GraphLayout, LayoutConfig};

/// Everything a layout depends on, besides the config.
///
/// Two payloads with equal topology get identical layouts, so adjacent
/// phases that leave the graph skeleton alone share one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Topology {
    /// Node ids with their label lengths, in payload order.
    nodes: Vec<(NodeId, usize)>,
    edges: Vec<(NodeId, NodeId, EdgeKind)>,
    blocks: Vec<(BlockId, Vec<NodeId>, Vec<BlockId>)>,
}

impl Topology {
    pub fn of(payload: &GraphPayload) -> Self {
        Topology {
            nodes: payload
                .nodes()
                .iter()
                .map(|n| (n.id, n.label.chars().count()))
                .collect(),
            edges: payload
                .edges()
                .iter()
                .map(|e| (e.source, e.target, e.kind))
                .collect(),
            blocks: payload
                .blocks()
                .iter()
                .map(|b| (b.id, b.nodes.clone(), b.successors.clone()))
                .collect(),
        }
    }
}

/// Cache hit/miss counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Same phase, same topology.
    pub ordinal_hits: usize,
    /// Different phase with an equal topology.
    pub topology_hits: usize,
    pub misses: usize,
}

#[derive(Default)]
struct LayoutCache {
    by_ordinal: FxHashMap<u32, (Arc<Topology>, Arc<GraphLayout>)>,
    by_topology: FxHashMap<Arc<Topology>, Arc<GraphLayout>>,
    stats: CacheStats,
}

impl LayoutCache {
    fn get(&mut self, ordinal: u32, topology: &Topology) -> Option<Arc<GraphLayout>> {
        if let Some((cached, layout)) = self.by_ordinal.get(&ordinal) {
            if **cached == *topology {
                self.stats.ordinal_hits += 1;
                return Some(Arc::clone(layout));
            }
        }
        let (key, layout) = self.by_topology.get_key_value(topology)?;
        let (key, layout) = (Arc::clone(key), Arc::clone(layout));
        self.stats.topology_hits += 1;
        self.by_ordinal.insert(ordinal, (key, Arc::clone(&layout)));
        Some(layout)
    }

    fn insert(&mut self, ordinal: u32, topology: Topology, layout: Arc<GraphLayout>) {
        let topology = Arc::new(topology);
        self.by_topology
            .insert(Arc::clone(&topology), Arc::clone(&layout));
        self.by_ordinal.insert(ordinal, (topology, layout));
    }
}

/// Lays out graph phases, reusing results across phases of equal topology.
///
/// The cache is keyed by phase ordinal and topology. It lives as long as
/// the engine; call [`LayoutEngine::clear`] when a new trace is loaded,
/// since ordinals restart.
pub struct LayoutEngine {
    config: LayoutConfig,
    cache: Mutex<LayoutCache>,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        LayoutEngine {
            config,
            cache: Mutex::new(LayoutCache::default()),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Layout of a graph-like phase; `None` for other kinds.
    ///
    /// Cancelled runs are returned but never cached.
    pub fn layout(&self, phase: &Phase, token: &CancellationToken) -> Option<Arc<GraphLayout>> {
        let payload = phase.graph()?;
        let topology = Topology::of(payload);
        if let Some(hit) = self.cache.lock().get(phase.ordinal, &topology) {
            tracing::debug!(phase = %phase.name, "layout cache hit");
            return Some(hit);
        }

        let layout = Arc::new(compute_layout(payload, &self.config, token));
        let mut cache = self.cache.lock();
        if layout.stats.cancelled {
            tracing::debug!(phase = %phase.name, "layout cancelled; not cached");
        } else {
            cache.stats.misses += 1;
            cache.insert(phase.ordinal, topology, Arc::clone(&layout));
        }
        Some(layout)
    }

    /// Uncached layout of a bare payload.
    pub fn layout_payload(&self, payload: &GraphPayload, token: &CancellationToken) -> GraphLayout {
        compute_layout(payload, &self.config, token)
    }

    /// Start laying out `phase` on a background thread.
    pub fn spawn(self: &Arc<Self>, phase: Arc<Phase>) -> PendingLayout {
        let token = CancellationToken::new();
        let engine = Arc::clone(self);
        let worker_token = token.clone();
        let handle = thread::spawn(move || engine.layout(&phase, &worker_token));
        PendingLayout {
            token,
            handle: Some(handle),
        }
    }

    /// Lay out every graph-like phase in parallel, filling the cache.
    ///
    /// Returns the number of phases laid out (cache hits included).
    #[tracing::instrument(level = "debug", skip_all, fields(phases = phases.len()))]
    pub fn prewarm(&self, phases: &[Arc<Phase>], token: &CancellationToken) -> usize {
        phases
            .par_iter()
            .filter(|p| p.kind().is_graph_like() && !p.is_broken())
            .filter_map(|p| self.layout(p, token))
            .count()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats
    }

    /// Number of distinct cached layouts.
    pub fn cached_layouts(&self) -> usize {
        self.cache.lock().by_topology.len()
    }

    /// Drop every cached layout.
    pub fn clear(&self) {
        let mut cache = self.cache.lock();
        cache.by_ordinal.clear();
        cache.by_topology.clear();
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

/// A layout running on a background thread.
///
/// Dropping it cancels the run without waiting for it.
pub struct PendingLayout {
    token: CancellationToken,
    handle: Option<JoinHandle<Option<Arc<GraphLayout>>>>,
}

impl PendingLayout {
    /// Ask the worker to stop; it returns a fallback layout soon after.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Block until the worker is done.
    ///
    /// `None` for non-graph phases, or if the worker panicked.
    pub fn wait(mut self) -> Option<Arc<GraphLayout>> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(layout) => layout,
            Err(_) => {
                tracing::warn!("layout worker panicked");
                None
            }
        }
    }
}

impl Drop for PendingLayout {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests;
