//! Graph payload: nodes, edges and optional basic blocks.
//!
//! Used by graph, Turboshaft graph and schedule phases. A payload is built
//! once by the trace loader, validated, and never mutated afterwards.

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::{BlockId, Edge, EdgeKind, Node, NodeId};

// ── Blocks ──────────────────────────────────────────────────────────

/// Kind annotation of a basic block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockKind {
    #[default]
    Block,
    /// Loop header.
    Loop,
    /// Control-flow merge.
    Merge,
}

impl BlockKind {
    pub fn from_trace_name(name: &str) -> Option<Self> {
        match name {
            "block" => Some(BlockKind::Block),
            "loop" => Some(BlockKind::Loop),
            "merge" => Some(BlockKind::Merge),
            _ => None,
        }
    }
}

/// A basic block: an ordered run of nodes plus CFG neighbors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Deferred (cold) block.
    pub deferred: bool,
    pub nodes: Vec<NodeId>,
    pub successors: Vec<BlockId>,
    pub predecessors: Vec<BlockId>,
}

impl Block {
    pub fn new(id: BlockId) -> Self {
        Block {
            id,
            kind: BlockKind::Block,
            deferred: false,
            nodes: Vec::new(),
            successors: Vec::new(),
            predecessors: Vec::new(),
        }
    }
}

// ── Validation errors ───────────────────────────────────────────────

/// Structural defect in a graph payload.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),
    #[error("node {node} references missing input {input}")]
    DanglingInput { node: NodeId, input: NodeId },
    #[error("edge {from} -> {to} references a missing node")]
    DanglingEdge { from: NodeId, to: NodeId },
    #[error("duplicate block id {0}")]
    DuplicateBlock(BlockId),
    #[error("block {block} lists missing node {node}")]
    DanglingBlockMember { block: BlockId, node: NodeId },
    #[error("node {node} belongs to both {first} and {second}")]
    NodeInTwoBlocks {
        node: NodeId,
        first: BlockId,
        second: BlockId,
    },
    #[error("node {0} belongs to no block")]
    NodeWithoutBlock(NodeId),
    #[error("block {block} references missing block {target}")]
    DanglingBlock { block: BlockId, target: BlockId },
    #[error("{from} lists {to} as successor but {to} does not list {from} as predecessor")]
    InconsistentBlockEdge { from: BlockId, to: BlockId },
}

// ── Payload ─────────────────────────────────────────────────────────

/// Nodes, edges and blocks of one phase.
#[derive(Clone, Debug, Default)]
pub struct GraphPayload {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    blocks: Vec<Block>,
    node_index: FxHashMap<NodeId, usize>,
    block_index: FxHashMap<BlockId, usize>,
    node_block: FxHashMap<NodeId, BlockId>,
}

impl GraphPayload {
    /// Build and validate a payload.
    ///
    /// Checks that node ids are unique, that inputs and edge endpoints name
    /// existing nodes, and (when blocks are present) that every node belongs
    /// to exactly one block and block successor/predecessor lists agree.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, blocks: Vec<Block>) -> Result<Self, GraphError> {
        let mut node_index = FxHashMap::default();
        for (idx, node) in nodes.iter().enumerate() {
            if node_index.insert(node.id, idx).is_some() {
                return Err(GraphError::DuplicateNode(node.id));
            }
        }

        for node in &nodes {
            if let Some(&input) = node.inputs.iter().find(|&&i| !node_index.contains_key(&i)) {
                return Err(GraphError::DanglingInput {
                    node: node.id,
                    input,
                });
            }
        }

        for edge in &edges {
            if !node_index.contains_key(&edge.source) || !node_index.contains_key(&edge.target) {
                return Err(GraphError::DanglingEdge {
                    from: edge.source,
                    to: edge.target,
                });
            }
        }

        let mut block_index = FxHashMap::default();
        for (idx, block) in blocks.iter().enumerate() {
            if block_index.insert(block.id, idx).is_some() {
                return Err(GraphError::DuplicateBlock(block.id));
            }
        }

        let node_block = Self::validate_blocks(&nodes, &node_index, &blocks, &block_index)?;

        Ok(GraphPayload {
            nodes,
            edges,
            blocks,
            node_index,
            block_index,
            node_block,
        })
    }

    /// Build a payload whose edges are derived from node inputs.
    ///
    /// Every input becomes a `value` edge unless `kinds` supplies a kind for
    /// that (node, operand position).
    pub fn from_inputs(
        nodes: Vec<Node>,
        blocks: Vec<Block>,
        kinds: &FxHashMap<NodeId, Vec<EdgeKind>>,
    ) -> Result<Self, GraphError> {
        let mut edges = Vec::new();
        for node in &nodes {
            let node_kinds = kinds.get(&node.id);
            for (pos, &input) in node.inputs.iter().enumerate() {
                let kind = node_kinds
                    .and_then(|k| k.get(pos).copied())
                    .unwrap_or(EdgeKind::Value);
                edges.push(Edge::new(input, node.id, kind));
            }
        }
        Self::new(nodes, edges, blocks)
    }

    fn validate_blocks(
        nodes: &[Node],
        node_index: &FxHashMap<NodeId, usize>,
        blocks: &[Block],
        block_index: &FxHashMap<BlockId, usize>,
    ) -> Result<FxHashMap<NodeId, BlockId>, GraphError> {
        let mut node_block: FxHashMap<NodeId, BlockId> = FxHashMap::default();
        if blocks.is_empty() {
            return Ok(node_block);
        }

        for block in blocks {
            for &node in &block.nodes {
                if !node_index.contains_key(&node) {
                    return Err(GraphError::DanglingBlockMember {
                        block: block.id,
                        node,
                    });
                }
                if let Some(&first) = node_block.get(&node) {
                    return Err(GraphError::NodeInTwoBlocks {
                        node,
                        first,
                        second: block.id,
                    });
                }
                node_block.insert(node, block.id);
            }
        }

        if let Some(orphan) = nodes.iter().find(|n| !node_block.contains_key(&n.id)) {
            return Err(GraphError::NodeWithoutBlock(orphan.id));
        }

        for block in blocks {
            for &target in block.successors.iter().chain(&block.predecessors) {
                if !block_index.contains_key(&target) {
                    return Err(GraphError::DanglingBlock {
                        block: block.id,
                        target,
                    });
                }
            }
        }

        let edges: FxHashSet<(BlockId, BlockId)> = blocks
            .iter()
            .flat_map(|b| b.successors.iter().map(move |&s| (b.id, s)))
            .collect();
        let back: FxHashSet<(BlockId, BlockId)> = blocks
            .iter()
            .flat_map(|b| b.predecessors.iter().map(move |&p| (p, b.id)))
            .collect();
        let mut mismatched: Vec<&(BlockId, BlockId)> = edges.symmetric_difference(&back).collect();
        mismatched.sort_unstable();
        if let Some(&&(from, to)) = mismatched.first() {
            return Err(GraphError::InconsistentBlockEdge { from, to });
        }

        Ok(node_block)
    }

    // ── Queries ─────────────────────────────────────────────────────

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    pub fn has_blocks(&self) -> bool {
        !self.blocks.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|&idx| &self.nodes[idx])
    }

    /// Position of `id` in [`nodes`](Self::nodes).
    pub fn node_position(&self, id: NodeId) -> Option<usize> {
        self.node_index.get(&id).copied()
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.block_index.get(&id).map(|&idx| &self.blocks[idx])
    }

    /// Position of `id` in [`blocks`](Self::blocks).
    pub fn block_position(&self, id: BlockId) -> Option<usize> {
        self.block_index.get(&id).copied()
    }

    /// The block holding `node`, if the payload has blocks.
    pub fn block_of(&self, node: NodeId) -> Option<BlockId> {
        self.node_block.get(&node).copied()
    }
}
