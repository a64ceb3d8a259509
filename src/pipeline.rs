//! Per-node graphics pipeline description.
//!
//! Every node pipeline shares the same fixed-function state: dynamic viewport
//! and scissor, no blending, depth test and write with `LessEqual`, no
//! culling, clockwise front face, the device sample count. Only the vertex
//! layout, vertex shader, topology, polygon mode and line width vary.

use fieldplot_core::mesh::{Dimension, PolygonMode, PrimitiveTopology};

use crate::backend::{
    CompareFunction, CullMode, FrontFace, PipelineLayoutDescriptor, PushConstantRange,
    SampleCount, ShaderModule, ShaderSet, ShaderStages, VertexAttribute, VertexBufferLayout,
    VertexFormat,
};
use crate::scene::CameraUniform;

/// Vertex layout of a batch: position (2 or 3 floats) then RGBA color.
pub fn vertex_layout(dimension: Dimension) -> VertexBufferLayout {
    let position = match dimension {
        Dimension::TwoD => VertexFormat::Float32x2,
        Dimension::ThreeD => VertexFormat::Float32x3,
    };
    let color = VertexFormat::Float32x4;

    VertexBufferLayout {
        array_stride: position.size() + color.size(),
        attributes: vec![
            VertexAttribute {
                location: 0,
                format: position,
                offset: 0,
            },
            VertexAttribute {
                location: 1,
                format: color,
                offset: position.size(),
            },
        ],
    }
}

/// Layout shared by every node pipeline: one vertex-stage push-constant
/// range holding a [`CameraUniform`].
pub fn pipeline_layout_descriptor() -> PipelineLayoutDescriptor {
    PipelineLayoutDescriptor {
        label: Some("node pipeline layout".to_string()),
        push_constant_ranges: vec![PushConstantRange {
            stages: ShaderStages::VERTEX,
            offset: 0,
            size: CameraUniform::SIZE,
        }],
    }
}

/// Depth state of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthState {
    pub test_enabled: bool,
    pub write_enabled: bool,
    pub compare: CompareFunction,
}

/// Immutable description of one node pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDescriptor {
    label: Option<String>,
    vertex_shader: ShaderModule,
    fragment_shader: ShaderModule,
    vertex_layout: VertexBufferLayout,
    topology: PrimitiveTopology,
    polygon_mode: PolygonMode,
    line_width: f32,
    front_face: FrontFace,
    cull_mode: CullMode,
    depth: DepthState,
    blend_enabled: bool,
    sample_count: SampleCount,
}

impl PipelineDescriptor {
    /// Description of a pipeline drawing a batch of `dimension`.
    pub fn for_batch(
        dimension: Dimension,
        topology: PrimitiveTopology,
        polygon_mode: PolygonMode,
        line_width: f32,
        shaders: &ShaderSet,
        sample_count: SampleCount,
    ) -> Self {
        let vertex_shader = match dimension {
            Dimension::TwoD => shaders.vertex_2d,
            Dimension::ThreeD => shaders.vertex_3d,
        };

        Self {
            label: None,
            vertex_shader,
            fragment_shader: shaders.fragment,
            vertex_layout: vertex_layout(dimension),
            topology,
            polygon_mode,
            line_width,
            front_face: FrontFace::Clockwise,
            cull_mode: CullMode::None,
            depth: DepthState {
                test_enabled: true,
                write_enabled: true,
                compare: CompareFunction::LessEqual,
            },
            blend_enabled: false,
            sample_count,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn vertex_shader(&self) -> ShaderModule {
        self.vertex_shader
    }

    pub fn fragment_shader(&self) -> ShaderModule {
        self.fragment_shader
    }

    pub fn vertex_layout(&self) -> &VertexBufferLayout {
        &self.vertex_layout
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    pub fn front_face(&self) -> FrontFace {
        self.front_face
    }

    pub fn cull_mode(&self) -> CullMode {
        self.cull_mode
    }

    pub fn depth(&self) -> DepthState {
        self.depth
    }

    pub fn blend_enabled(&self) -> bool {
        self.blend_enabled
    }

    pub fn sample_count(&self) -> SampleCount {
        self.sample_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_layout_is_six_floats() {
        let layout = vertex_layout(Dimension::TwoD);
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes[0].format, VertexFormat::Float32x2);
        assert_eq!(layout.attributes[1].offset, 8);
    }

    #[test]
    fn spatial_layout_is_seven_floats() {
        let layout = vertex_layout(Dimension::ThreeD);
        assert_eq!(layout.array_stride, 28);
        assert_eq!(layout.attributes[0].format, VertexFormat::Float32x3);
        assert_eq!(layout.attributes[1].offset, 12);
    }

    #[test]
    fn vertex_shader_follows_dimension() {
        let shaders = ShaderSet::dummy();
        let planar = PipelineDescriptor::for_batch(
            Dimension::TwoD,
            PrimitiveTopology::LineList,
            PolygonMode::Line,
            1.0,
            &shaders,
            SampleCount::X4,
        );
        let spatial = PipelineDescriptor::for_batch(
            Dimension::ThreeD,
            PrimitiveTopology::TriangleList,
            PolygonMode::Fill,
            1.0,
            &shaders,
            SampleCount::X4,
        );

        assert_eq!(planar.vertex_shader(), shaders.vertex_2d);
        assert_eq!(spatial.vertex_shader(), shaders.vertex_3d);
        assert_eq!(planar.fragment_shader(), spatial.fragment_shader());
        assert_eq!(planar.depth(), spatial.depth());
        assert_eq!(planar.sample_count(), SampleCount::X4);
        assert!(!planar.blend_enabled());
    }

    #[test]
    fn layout_pushes_camera_to_vertex_stage() {
        let desc = pipeline_layout_descriptor();
        assert_eq!(desc.push_constant_ranges.len(), 1);
        assert_eq!(desc.push_constant_ranges[0].stages, ShaderStages::VERTEX);
        assert_eq!(desc.push_constant_ranges[0].size, CameraUniform::SIZE);
    }
}
