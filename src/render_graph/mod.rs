//! Render Graph System
//!
//! One [`RenderGraphNode`] per scene batch, each owning the pipeline that
//! draws it, plus a [`RenderGraph`] that owns the nodes, the shared push
//! buffer and the camera push constants. Nodes are rebuilt on demand through
//! dirty flags.

pub mod graph;
pub mod node;

pub use graph::*;
pub use node::*;

/// Default line width of nodes whose object does not request one.
pub const DEFAULT_LINE_WIDTH: f32 = 1.0;

/// Configuration of a render graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderGraphConfig {
    pub default_line_width: f32,
}

impl RenderGraphConfig {
    pub fn with_default_line_width(mut self, line_width: f32) -> Self {
        self.default_line_width = line_width;
        self
    }
}

impl Default for RenderGraphConfig {
    fn default() -> Self {
        Self {
            default_line_width: DEFAULT_LINE_WIDTH,
        }
    }
}
