//! Fieldplot - render-graph pipeline lifecycle for simulation geometry
//!
//! Imported geometry (see `fieldplot-import`) is grouped into a
//! [`SceneLayout`] and turned into a [`RenderGraph`]: one pipeline per batch,
//! a shared push buffer and camera push constants.
//!
//! Two backends implement [`GraphicsBackend`]:
//! - **Dummy**: records every call, for tests and headless runs
//! - **Vulkan**: drives a caller-owned device via ash (native only)
//!
//! # Example
//!
//! ```
//! use fieldplot::{DummyBackend, RenderGraph, SceneLayout, ShaderSet};
//!
//! let mut backend = DummyBackend::new();
//! let shaders = ShaderSet::dummy();
//! let mut graph = RenderGraph::construct(&mut backend, &SceneLayout::new(), &shaders).unwrap();
//! graph.mark_all_dirty();
//! graph.reload(&mut backend, &shaders);
//! graph.destroy(&mut backend);
//! ```

pub mod backend;
pub mod pipeline;
pub mod render_graph;
pub mod scene;

pub use backend::{
    BackendError, BackendResult, DummyBackend, GraphicsBackend, SampleCount, ShaderModule,
    ShaderSet,
};
#[cfg(all(feature = "vulkan-backend", not(target_arch = "wasm32")))]
pub use backend::vulkan::VulkanBackend;
pub use pipeline::PipelineDescriptor;
pub use render_graph::{RenderGraph, RenderGraphConfig, RenderGraphNode, DEFAULT_LINE_WIDTH};
pub use scene::{Camera, CameraKind, CameraUniform, SceneLayout, SceneObject};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
