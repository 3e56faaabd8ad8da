//! Edge routing.
//!
//! Edges leave the bottom center of their source and enter the top center
//! of their target. Horizontal segments always run through the gap between
//! two layers, so they never cross a node; vertical segments run either at
//! an endpoint's center or through a side channel outside every node of the
//! layers they span.

use crate::geometry::{EdgeRoute, Point, Rect, RoutedEdge};
use crate::layering::LayoutGraph;
use crate::placement::Placement;
use crate::LayoutConfig;

pub(crate) struct Routes {
    pub edges: Vec<RoutedEdge>,
    pub side_channels: usize,
}

/// Route every edge of the payload, in edge order.
pub(crate) fn route_edges(
    graph: &LayoutGraph<'_>,
    config: &LayoutConfig,
    layer: &[usize],
    layers: &[Vec<usize>],
    placement: &Placement,
) -> Routes {
    let mut router = Router {
        config,
        layer,
        layers,
        placement,
        left_lanes: 0,
        right_lanes: 0,
    };
    let edges = graph
        .payload
        .edges()
        .iter()
        .zip(&graph.ends)
        .enumerate()
        .map(|(idx, (edge, &(s, t)))| RoutedEdge {
            edge: idx,
            source: edge.source,
            target: edge.target,
            kind: edge.kind,
            route: router.route(s, t),
        })
        .collect();
    Routes {
        edges,
        side_channels: router.left_lanes + router.right_lanes,
    }
}

struct Router<'a> {
    config: &'a LayoutConfig,
    layer: &'a [usize],
    layers: &'a [Vec<usize>],
    placement: &'a Placement,
    left_lanes: usize,
    right_lanes: usize,
}

impl Router<'_> {
    fn rect(&self, v: usize) -> Rect {
        self.placement.rects[v]
    }

    fn route(&mut self, s: usize, t: usize) -> EdgeRoute {
        let (src, dst) = (self.rect(s), self.rect(t));
        if s == t {
            return self.self_loop(src);
        }
        let (ls, lt) = (self.layer[s], self.layer[t]);
        if ls == lt {
            return self.same_layer(src, dst);
        }

        let start = Point::new(src.center_x(), src.bottom());
        let end = Point::new(dst.center_x(), dst.y);
        let below_src = self.placement.gap_below(ls, self.config);
        let above_dst = self.placement.gap_above(lt, self.config);

        if lt == ls + 1 {
            return EdgeRoute::Orthogonal(vec![
                start,
                Point::new(start.x, below_src),
                Point::new(end.x, below_src),
                end,
            ]);
        }

        if lt > ls {
            // Long forward edge: straight down one of the endpoint columns
            // if nothing is in the way, otherwise around the right side.
            if !self.column_blocked(start.x, ls + 1, lt) {
                return EdgeRoute::Orthogonal(vec![
                    start,
                    Point::new(start.x, above_dst),
                    Point::new(end.x, above_dst),
                    end,
                ]);
            }
            if !self.column_blocked(end.x, ls + 1, lt) {
                return EdgeRoute::Orthogonal(vec![
                    start,
                    Point::new(start.x, below_src),
                    Point::new(end.x, below_src),
                    end,
                ]);
            }
            self.right_lanes += 1;
            let x = self.extent(ls, lt).1 + self.config.lane_gap * self.right_lanes as f64;
            return self.through_channel(start, end, x, below_src, above_dst);
        }

        // Backward edge: around the left side.
        self.left_lanes += 1;
        let x = self.extent(lt, ls).0 - self.config.lane_gap * self.left_lanes as f64;
        self.through_channel(start, end, x, below_src, above_dst)
    }

    fn through_channel(
        &self,
        start: Point,
        end: Point,
        x: f64,
        below_src: f64,
        above_dst: f64,
    ) -> EdgeRoute {
        EdgeRoute::Orthogonal(vec![
            start,
            Point::new(start.x, below_src),
            Point::new(x, below_src),
            Point::new(x, above_dst),
            Point::new(end.x, above_dst),
            end,
        ])
    }

    /// Whether a vertical line at `x` hits a node in layers `[from, to)`.
    fn column_blocked(&self, x: f64, from: usize, to: usize) -> bool {
        let margin = self.config.node_gap / 4.0;
        self.layers[from..to].iter().flatten().any(|&v| {
            let r = self.rect(v);
            x >= r.x - margin && x <= r.right() + margin
        })
    }

    /// Leftmost and rightmost node edge in layers `[from, to]`.
    fn extent(&self, from: usize, to: usize) -> (f64, f64) {
        self.layers[from..=to]
            .iter()
            .flatten()
            .map(|&v| self.rect(v))
            .fold((0.0_f64, self.placement.width), |(lo, hi), r| {
                (lo.min(r.x), hi.max(r.right()))
            })
    }

    fn self_loop(&self, r: Rect) -> EdgeRoute {
        let bow = self.config.node_gap / 2.0 + r.height / 2.0;
        EdgeRoute::Bowed {
            start: Point::new(r.right(), r.y + r.height / 4.0),
            control: Point::new(r.right() + bow, r.center_y()),
            end: Point::new(r.right(), r.y + r.height * 3.0 / 4.0),
        }
    }

    fn same_layer(&self, src: Rect, dst: Rect) -> EdgeRoute {
        let start = Point::new(src.center_x(), src.y);
        let end = Point::new(dst.center_x(), dst.y);
        EdgeRoute::Bowed {
            start,
            control: Point::new((start.x + end.x) / 2.0, src.y - self.config.layer_gap / 2.0),
            end,
        }
    }
}
