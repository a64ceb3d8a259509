//! Common types shared between backends

use bitflags::bitflags;

bitflags! {
    /// Usage flags for buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer can be used as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Buffer can be used as an index buffer.
        const INDEX = 1 << 1;
        /// Buffer can be used as a uniform buffer.
        const UNIFORM = 1 << 2;
        /// Buffer can be copied from.
        const COPY_SRC = 1 << 3;
        /// Buffer can be copied to.
        const COPY_DST = 1 << 4;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

bitflags! {
    /// Shader stages a resource is visible to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStages: u32 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
    }
}

/// Where a buffer's memory lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryLocation {
    #[default]
    GpuOnly,
    /// Host-visible memory written by the CPU and read by the GPU.
    CpuToGpu,
    GpuToCpu,
}

/// Descriptor for creating a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferDescriptor {
    pub label: Option<String>,
    /// Size in bytes.
    pub size: u64,
    pub usage: BufferUsage,
    pub location: MemoryLocation,
    /// Keep the buffer persistently mapped.
    pub mapped: bool,
}

impl BufferDescriptor {
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
            location: MemoryLocation::GpuOnly,
            mapped: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Place the buffer in `location`; host-visible locations are mapped.
    pub fn with_location(mut self, location: MemoryLocation) -> Self {
        self.location = location;
        self.mapped = location != MemoryLocation::GpuOnly;
        self
    }
}

/// A push-constant block visible to some shader stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PushConstantRange {
    pub stages: ShaderStages,
    pub offset: u32,
    pub size: u32,
}

/// Descriptor for creating a pipeline layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PipelineLayoutDescriptor {
    pub label: Option<String>,
    pub push_constant_ranges: Vec<PushConstantRange>,
}

/// Vertex attribute format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
}

impl VertexFormat {
    pub fn size(&self) -> u32 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }
}

/// Vertex attribute description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: VertexFormat,
    pub offset: u32,
}

/// Vertex buffer layout
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferLayout {
    pub array_stride: u32,
    pub attributes: Vec<VertexAttribute>,
}

/// Front face winding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontFace {
    Clockwise,
    CounterClockwise,
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Rasterization sample count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SampleCount {
    #[default]
    X1,
    X2,
    X4,
    X8,
    X16,
    X32,
    X64,
}

impl SampleCount {
    pub fn count(&self) -> u32 {
        match self {
            SampleCount::X1 => 1,
            SampleCount::X2 => 2,
            SampleCount::X4 => 4,
            SampleCount::X8 => 8,
            SampleCount::X16 => 16,
            SampleCount::X32 => 32,
            SampleCount::X64 => 64,
        }
    }
}

/// A precompiled shader module owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderModule {
    /// Opaque id understood by the dummy backend.
    Dummy(u64),
    #[cfg(all(feature = "vulkan-backend", not(target_arch = "wasm32")))]
    Vulkan(ash::vk::ShaderModule),
}

/// The three shader modules every node pipeline draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderSet {
    /// Vertex stage for 2D batches (`vec2` position).
    pub vertex_2d: ShaderModule,
    /// Vertex stage for 3D batches (`vec3` position).
    pub vertex_3d: ShaderModule,
    pub fragment: ShaderModule,
}

impl ShaderSet {
    pub fn new(vertex_2d: ShaderModule, vertex_3d: ShaderModule, fragment: ShaderModule) -> Self {
        Self {
            vertex_2d,
            vertex_3d,
            fragment,
        }
    }

    /// Shader ids for the dummy backend.
    pub fn dummy() -> Self {
        Self::new(
            ShaderModule::Dummy(0),
            ShaderModule::Dummy(1),
            ShaderModule::Dummy(2),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_visible_location_maps() {
        let desc = BufferDescriptor::new(64, BufferUsage::VERTEX).with_location(MemoryLocation::CpuToGpu);
        assert!(desc.mapped);
        let desc = BufferDescriptor::new(64, BufferUsage::VERTEX).with_location(MemoryLocation::GpuOnly);
        assert!(!desc.mapped);
    }

    #[test]
    fn sample_counts_are_ordered() {
        assert!(SampleCount::X8 > SampleCount::X1);
        assert_eq!(SampleCount::X8.count(), 8);
    }
}
