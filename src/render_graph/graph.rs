//! Render graph: nodes, shared push buffer and camera state

use glam::Mat4;

use crate::backend::{
    BackendError, BackendResult, BufferDescriptor, BufferHandle, BufferUsage, GraphicsBackend,
    MemoryLocation, ShaderSet,
};
use crate::render_graph::node::RenderGraphNode;
use crate::render_graph::RenderGraphConfig;
use crate::scene::{CameraKind, CameraUniform, SceneLayout};

/// Pipelines for every batch of a scene plus the buffer they draw from.
///
/// The graph is owned by the graphics thread. [`reload`](Self::reload) and
/// [`destroy`](Self::destroy) must run between frames.
#[derive(Debug)]
pub struct RenderGraph {
    nodes: Vec<RenderGraphNode>,
    push_buffer: Option<BufferHandle>,
    push_buffer_size: u64,
    camera: CameraKind,
    uniform: CameraUniform,
    update: bool,
    config: RenderGraphConfig,
}

impl RenderGraph {
    /// Build the graph with the default configuration.
    pub fn construct(
        backend: &mut dyn GraphicsBackend,
        layout: &SceneLayout,
        shaders: &ShaderSet,
    ) -> BackendResult<Self> {
        Self::construct_with_config(backend, layout, shaders, RenderGraphConfig::default())
    }

    /// Build one node per scene object, then allocate the shared push buffer
    /// sized to the largest batch.
    ///
    /// Node pipeline failures are logged and leave that node unbuilt. A push
    /// buffer failure destroys everything already created and is returned.
    pub fn construct_with_config(
        backend: &mut dyn GraphicsBackend,
        layout: &SceneLayout,
        shaders: &ShaderSet,
        config: RenderGraphConfig,
    ) -> BackendResult<Self> {
        let mut graph = Self {
            nodes: Vec::with_capacity(layout.len()),
            push_buffer: None,
            push_buffer_size: 0,
            camera: CameraKind::ThreeD,
            uniform: CameraUniform::default(),
            update: false,
            config,
        };

        for object in layout.objects() {
            let mut node = RenderGraphNode::from_object(object, graph.config.default_line_width);
            // Failures are logged by the node; it stays unbuilt until a reload.
            let _ = node.construct(backend, shaders);
            graph.push_buffer_size = graph.push_buffer_size.max(node.batch().byte_size());
            graph.camera = CameraKind::from(node.dimension());
            graph.nodes.push(node);
        }

        if graph.push_buffer_size > 0 {
            let desc = BufferDescriptor::new(graph.push_buffer_size, BufferUsage::VERTEX)
                .with_label("push buffer")
                .with_location(MemoryLocation::CpuToGpu);
            match backend.create_buffer(&desc) {
                Ok(buffer) => graph.push_buffer = Some(buffer),
                Err(e) => {
                    log::error!(
                        "Failed to allocate {} byte push buffer: {e}",
                        graph.push_buffer_size
                    );
                    graph.destroy(backend);
                    return Err(e);
                }
            }
        }

        log::info!(
            "Render graph built on {}: {} nodes, {} byte push buffer, {:?} camera",
            backend.name(),
            graph.nodes.len(),
            graph.push_buffer_size,
            graph.camera
        );

        Ok(graph)
    }

    /// Rebuild the pipelines of every dirty node.
    ///
    /// Does nothing unless the graph is marked dirty. Replacement pipelines
    /// are all created first; then the device is waited on once and the old
    /// pipelines are swapped out and destroyed. Returns the number of nodes
    /// whose pipeline was rebuilt successfully.
    pub fn reload(&mut self, backend: &mut dyn GraphicsBackend, shaders: &ShaderSet) -> usize {
        if !self.update {
            return 0;
        }

        let mut builds = Vec::new();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if !node.update {
                continue;
            }
            if node.to_render() {
                builds.push((index, node.build(backend, shaders)));
            } else {
                node.update = false;
            }
        }

        if builds.is_empty() {
            self.update = false;
            return 0;
        }

        if let Err(e) = backend.wait_idle() {
            log::error!("Reload aborted, device did not go idle: {e}");
            for (_, build) in builds {
                if let Ok(pipeline) = build.pipeline {
                    backend.destroy_pipeline(pipeline);
                }
                if let Some(layout) = build.layout {
                    backend.destroy_pipeline_layout(layout);
                }
            }
            return 0;
        }

        let mut rebuilt = 0;
        for (index, build) in builds {
            let node = &mut self.nodes[index];
            if node.swap_in(backend, build) {
                rebuilt += 1;
            }
            node.update = false;
        }
        self.update = false;

        log::info!("Reloaded {rebuilt} render graph nodes");
        rebuilt
    }

    /// Destroy every node pipeline, the CPU batches and the push buffer.
    pub fn destroy(mut self, backend: &mut dyn GraphicsBackend) {
        for node in &mut self.nodes {
            node.destroy(backend);
            node.release_batch();
        }
        if let Some(buffer) = self.push_buffer.take() {
            backend.destroy_buffer(buffer);
        }
        log::debug!("Render graph destroyed");
    }

    /// Copy a node's batch into the push buffer.
    pub fn upload_node(&self, backend: &mut dyn GraphicsBackend, index: usize) -> BackendResult<()> {
        let buffer = self
            .push_buffer
            .ok_or_else(|| BackendError::InvalidHandle("no push buffer".into()))?;
        let node = self
            .nodes
            .get(index)
            .ok_or_else(|| BackendError::InvalidHandle(format!("render graph node {index}")))?;
        backend.write_buffer(buffer, 0, node.batch().as_bytes())
    }

    /// Mark one node for rebuild. Returns `false` for an unknown index.
    pub fn mark_node_dirty(&mut self, index: usize) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) => {
                node.update = true;
                self.update = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_dirty(&mut self) {
        for node in &mut self.nodes {
            node.update = true;
        }
        self.update = !self.nodes.is_empty();
    }

    /// Change a node's line width and mark it for rebuild.
    pub fn set_line_width(&mut self, index: usize, line_width: f32) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) => node.set_line_width(line_width),
            None => return false,
        }
        self.mark_node_dirty(index)
    }

    pub fn update_camera(&mut self, view_proj: Mat4) {
        self.uniform.view_proj = view_proj;
    }

    pub fn set_model(&mut self, model: Mat4) {
        self.uniform.model = model;
    }

    pub fn camera_uniform(&self) -> &CameraUniform {
        &self.uniform
    }

    /// Bytes to push as the vertex-stage push constant.
    pub fn push_constant_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.uniform)
    }

    /// Nodes the frame loop should draw: rendered kinds with a built pipeline.
    pub fn renderable_nodes(&self) -> impl Iterator<Item = &RenderGraphNode> {
        self.nodes
            .iter()
            .filter(|node| node.to_render() && node.is_built())
    }

    pub fn nodes(&self) -> &[RenderGraphNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&RenderGraphNode> {
        self.nodes.get(index)
    }

    pub fn camera_kind(&self) -> CameraKind {
        self.camera
    }

    pub fn push_buffer(&self) -> Option<BufferHandle> {
        self.push_buffer
    }

    pub fn push_buffer_size(&self) -> u64 {
        self.push_buffer_size
    }

    pub fn is_dirty(&self) -> bool {
        self.update
    }

    pub fn config(&self) -> &RenderGraphConfig {
        &self.config
    }
}

impl Drop for RenderGraph {
    fn drop(&mut self) {
        if self.push_buffer.is_some() || self.nodes.iter().any(RenderGraphNode::holds_gpu_objects) {
            log::warn!(
                "RenderGraph dropped without destroy(). GPU objects leaked; \
                 always call destroy() with the backend that created them."
            );
        }
    }
}
