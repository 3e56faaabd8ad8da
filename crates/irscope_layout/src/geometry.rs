//! Layout output types.

use irscope_ir::{BlockId, EdgeKind, NodeId};
use rustc_hash::FxHashMap;

/// A point in layout space. `y` grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Whether the two rectangles share interior area.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    #[must_use]
    pub fn include_point(&self, p: Point) -> Rect {
        self.union(&Rect::new(p.x, p.y, 0.0, 0.0))
    }
}

/// Position of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodePlacement {
    pub id: NodeId,
    pub layer: usize,
    /// Position within the layer, left to right.
    pub order: usize,
    pub rect: Rect,
    pub block: Option<BlockId>,
}

/// Horizontal band occupied by one block.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockBand {
    pub id: BlockId,
    /// First layer of the block.
    pub first_layer: usize,
    /// Number of layers (at least one, even for empty blocks).
    pub layer_count: usize,
    pub rect: Rect,
}

/// Geometry of one routed edge.
#[derive(Clone, Debug, PartialEq)]
pub enum EdgeRoute {
    /// Axis-aligned polyline.
    Orthogonal(Vec<Point>),
    /// Quadratic curve, used for self loops and same-layer edges.
    Bowed { start: Point, control: Point, end: Point },
}

impl EdgeRoute {
    pub fn start(&self) -> Option<Point> {
        match self {
            EdgeRoute::Orthogonal(points) => points.first().copied(),
            EdgeRoute::Bowed { start, .. } => Some(*start),
        }
    }

    pub fn end(&self) -> Option<Point> {
        match self {
            EdgeRoute::Orthogonal(points) => points.last().copied(),
            EdgeRoute::Bowed { end, .. } => Some(*end),
        }
    }

    /// Number of bends of an orthogonal route.
    pub fn bends(&self) -> usize {
        match self {
            EdgeRoute::Orthogonal(points) => points.len().saturating_sub(2),
            EdgeRoute::Bowed { .. } => 0,
        }
    }

    /// Whether every segment is horizontal or vertical.
    #[allow(clippy::float_cmp, reason = "route points share copied coordinates")]
    pub fn is_axis_aligned(&self) -> bool {
        match self {
            EdgeRoute::Orthogonal(points) => points
                .windows(2)
                .all(|w| w[0].x == w[1].x || w[0].y == w[1].y),
            EdgeRoute::Bowed { .. } => false,
        }
    }

    pub(crate) fn points(&self) -> Vec<Point> {
        match self {
            EdgeRoute::Orthogonal(points) => points.clone(),
            EdgeRoute::Bowed {
                start,
                control,
                end,
            } => vec![*start, *control, *end],
        }
    }
}

/// An edge together with its route.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutedEdge {
    /// Index into the payload's edge list.
    pub edge: usize,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    pub route: EdgeRoute,
}

/// Counters describing one layout run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutStats {
    /// Ordering passes actually run.
    pub passes_run: usize,
    /// Value-edge crossings between adjacent layers in the final order.
    pub crossings: usize,
    /// Edges excluded from layering as loop back edges.
    pub back_edges: usize,
    /// Edges routed through a side channel.
    pub side_channels: usize,
    /// The run was cancelled and fell back to an unoptimized placement.
    pub cancelled: bool,
}

/// Complete placement of one graph phase.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphLayout {
    /// In the payload's node order.
    pub nodes: Vec<NodePlacement>,
    pub blocks: Vec<BlockBand>,
    pub edges: Vec<RoutedEdge>,
    pub bounds: Rect,
    pub layer_count: usize,
    pub stats: LayoutStats,
    index: FxHashMap<NodeId, usize>,
}

impl GraphLayout {
    pub(crate) fn new(
        nodes: Vec<NodePlacement>,
        blocks: Vec<BlockBand>,
        edges: Vec<RoutedEdge>,
        layer_count: usize,
        stats: LayoutStats,
    ) -> Self {
        let index = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
        let mut bounds: Option<Rect> = None;
        let mut grow = |r: Rect| {
            bounds = Some(match bounds {
                Some(b) => b.union(&r),
                None => r,
            });
        };
        nodes.iter().for_each(|n| grow(n.rect));
        blocks.iter().for_each(|b| grow(b.rect));
        for edge in &edges {
            for p in edge.route.points() {
                grow(Rect::new(p.x, p.y, 0.0, 0.0));
            }
        }
        GraphLayout {
            nodes,
            blocks,
            edges,
            bounds: bounds.unwrap_or_default(),
            layer_count,
            stats,
            index,
        }
    }

    pub fn placement(&self, id: NodeId) -> Option<&NodePlacement> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Node ids of one layer, left to right.
    pub fn layer(&self, layer: usize) -> Vec<NodeId> {
        let mut members: Vec<&NodePlacement> =
            self.nodes.iter().filter(|n| n.layer == layer).collect();
        members.sort_by_key(|n| n.order);
        members.into_iter().map(|n| n.id).collect()
    }

    /// Nodes whose rectangle overlaps `area`, in payload order.
    pub fn nodes_in(&self, area: &Rect) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.rect.overlaps(area) || area.contains_point(Point::new(n.rect.x, n.rect.y)))
            .map(|n| n.id)
            .collect()
    }

    /// Node at a point, if any.
    pub fn node_at(&self, p: Point) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.rect.contains_point(p))
            .map(|n| n.id)
    }
}
