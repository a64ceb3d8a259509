//! A render-graph node: one batch and the pipeline that draws it.

use fieldplot_core::mesh::{Dimension, GeometryKind, MeshBatch, PolygonMode, PrimitiveTopology, Vertex};

use crate::backend::{BackendResult, GraphicsBackend, PipelineHandle, PipelineLayoutHandle, ShaderSet};
use crate::pipeline::{pipeline_layout_descriptor, PipelineDescriptor};
use crate::scene::SceneObject;

/// Handles produced by one pipeline build attempt.
///
/// A failed attempt may still carry a layout: the layout call succeeded but
/// the pipeline call did not.
#[derive(Debug)]
pub(crate) struct PipelineBuild {
    pub layout: Option<PipelineLayoutHandle>,
    pub pipeline: BackendResult<PipelineHandle>,
}

/// One drawable batch plus its pipeline state.
///
/// The pipeline state is either absent (both handles `None`) or built (both
/// `Some`). A failed build can leave the layout alone; the node then never
/// draws until a later rebuild succeeds.
#[derive(Debug)]
pub struct RenderGraphNode {
    kind: GeometryKind,
    dimension: Dimension,
    pub(crate) update: bool,
    to_render: bool,
    line_width: f32,
    polygon_mode: PolygonMode,
    batch: MeshBatch,
    pipeline: Option<PipelineHandle>,
    layout: Option<PipelineLayoutHandle>,
}

impl RenderGraphNode {
    /// Node for a scene object. Volumes are kept but never rendered.
    pub fn from_object(object: &SceneObject, default_line_width: f32) -> Self {
        Self {
            kind: object.kind,
            dimension: object.dimension(),
            update: false,
            to_render: !object.kind.is_volume(),
            line_width: object.line_width.unwrap_or(default_line_width),
            polygon_mode: object.polygon_mode,
            batch: object.batch.clone(),
            pipeline: None,
            layout: None,
        }
    }

    /// Standalone node over raw vertices: 2D batches draw lines, 3D batches
    /// draw triangles.
    pub fn from_vertices(vertices: &[Vertex], kind: GeometryKind, line_width: f32) -> Self {
        let dimension = kind.dimension();
        let topology = match dimension {
            Dimension::TwoD => PrimitiveTopology::LineList,
            Dimension::ThreeD => PrimitiveTopology::TriangleList,
        };

        Self {
            kind,
            dimension,
            update: false,
            to_render: !kind.is_volume(),
            line_width,
            polygon_mode: PolygonMode::Line,
            batch: MeshBatch::from_arrays([vertices], topology, dimension),
            pipeline: None,
            layout: None,
        }
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn is_dirty(&self) -> bool {
        self.update
    }

    pub fn to_render(&self) -> bool {
        self.to_render
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    pub(crate) fn set_line_width(&mut self, line_width: f32) {
        self.line_width = line_width;
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    pub fn batch(&self) -> &MeshBatch {
        &self.batch
    }

    pub fn pipeline(&self) -> Option<PipelineHandle> {
        self.pipeline
    }

    pub fn layout(&self) -> Option<PipelineLayoutHandle> {
        self.layout
    }

    /// Both handles present.
    pub fn is_built(&self) -> bool {
        self.pipeline.is_some() && self.layout.is_some()
    }

    /// Pipeline description for this node on a device with `backend`'s
    /// sample count.
    pub fn descriptor(&self, backend: &dyn GraphicsBackend, shaders: &ShaderSet) -> PipelineDescriptor {
        PipelineDescriptor::for_batch(
            self.dimension,
            self.batch.topology(),
            self.polygon_mode,
            self.line_width,
            shaders,
            backend.sample_count(),
        )
        .with_label(format!("{} node", self.kind))
    }

    /// Build the pipeline layout and pipeline.
    ///
    /// Existing handles are destroyed first. On failure the error is logged
    /// and returned; the node keeps whatever handles were created.
    ///
    /// Nodes with `to_render == false` (volumes) are skipped and stay without
    /// any pipeline or layout. Their batches have `Undefined` topology, which
    /// no backend can build a pipeline for.
    pub fn construct(&mut self, backend: &mut dyn GraphicsBackend, shaders: &ShaderSet) -> BackendResult<()> {
        self.destroy(backend);
        if !self.to_render {
            log::debug!("Skipping pipeline for non-rendered {} node", self.kind);
            return Ok(());
        }

        let build = self.build(backend, shaders);
        self.layout = build.layout;
        match build.pipeline {
            Ok(pipeline) => {
                self.pipeline = Some(pipeline);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to build pipeline for {} node: {e}", self.kind);
                Err(e)
            }
        }
    }

    /// Create a layout and a pipeline without touching the node's handles.
    pub(crate) fn build(&self, backend: &mut dyn GraphicsBackend, shaders: &ShaderSet) -> PipelineBuild {
        let layout = match backend.create_pipeline_layout(&pipeline_layout_descriptor()) {
            Ok(layout) => layout,
            Err(e) => {
                return PipelineBuild {
                    layout: None,
                    pipeline: Err(e),
                }
            }
        };

        let descriptor = self.descriptor(backend, shaders);
        PipelineBuild {
            layout: Some(layout),
            pipeline: backend.create_graphics_pipeline(&descriptor, layout),
        }
    }

    /// Destroy the current handles and adopt `build`'s.
    pub(crate) fn swap_in(&mut self, backend: &mut dyn GraphicsBackend, build: PipelineBuild) -> bool {
        self.destroy(backend);
        self.layout = build.layout;
        match build.pipeline {
            Ok(pipeline) => {
                self.pipeline = Some(pipeline);
                true
            }
            Err(e) => {
                log::error!("Failed to rebuild pipeline for {} node: {e}", self.kind);
                false
            }
        }
    }

    /// Destroy the pipeline and layout. Absent handles are skipped.
    pub fn destroy(&mut self, backend: &mut dyn GraphicsBackend) {
        if let Some(pipeline) = self.pipeline.take() {
            backend.destroy_pipeline(pipeline);
        }
        if let Some(layout) = self.layout.take() {
            backend.destroy_pipeline_layout(layout);
        }
    }

    /// Release the CPU batch data.
    pub(crate) fn release_batch(&mut self) {
        self.batch.clear();
    }

    pub(crate) fn holds_gpu_objects(&self) -> bool {
        self.pipeline.is_some() || self.layout.is_some()
    }
}
