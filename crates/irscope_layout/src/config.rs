//! Layout tuning knobs.

/// Spacing and iteration bounds for the layered layout.
///
/// All distances are in abstract layout units; a text renderer can treat
/// one unit as one character cell.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    pub node_height: f64,
    /// Width of one label character.
    pub char_width: f64,
    /// Horizontal padding on each side of a label.
    pub node_padding: f64,
    pub min_node_width: f64,
    /// Vertical gap between consecutive layers.
    pub layer_gap: f64,
    /// Horizontal gap between neighbors in a layer.
    pub node_gap: f64,
    /// Extra vertical gap between stacked blocks.
    pub block_gap: f64,
    /// Distance between side channels of rerouted edges.
    pub lane_gap: f64,
    /// Barycenter sweep passes (down then up). Zero keeps id order.
    pub ordering_passes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            node_height: 3.0,
            char_width: 1.0,
            node_padding: 1.0,
            min_node_width: 5.0,
            layer_gap: 4.0,
            node_gap: 3.0,
            block_gap: 2.0,
            lane_gap: 2.0,
            ordering_passes: 4,
        }
    }
}

impl LayoutConfig {
    #[must_use]
    pub fn with_ordering_passes(mut self, passes: usize) -> Self {
        self.ordering_passes = passes;
        self
    }

    /// Width of a node with the given label.
    pub fn node_width(&self, label: &str) -> f64 {
        let chars = label.chars().count() as f64;
        (chars * self.char_width + 2.0 * self.node_padding).max(self.min_node_width)
    }
}
