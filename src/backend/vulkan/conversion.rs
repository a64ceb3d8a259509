//! Type conversions between fieldplot types and Vulkan types.

use ash::vk;
use fieldplot_core::mesh::{PolygonMode, PrimitiveTopology};

use crate::backend::types::{
    BufferUsage, CompareFunction, CullMode, FrontFace, MemoryLocation, SampleCount, ShaderStages,
    VertexFormat,
};

/// Convert BufferUsage flags to Vulkan buffer usage flags.
pub fn convert_buffer_usage(usage: BufferUsage) -> vk::BufferUsageFlags {
    let mut result = vk::BufferUsageFlags::empty();

    if usage.contains(BufferUsage::VERTEX) {
        result |= vk::BufferUsageFlags::VERTEX_BUFFER;
    }
    if usage.contains(BufferUsage::INDEX) {
        result |= vk::BufferUsageFlags::INDEX_BUFFER;
    }
    if usage.contains(BufferUsage::UNIFORM) {
        result |= vk::BufferUsageFlags::UNIFORM_BUFFER;
    }
    if usage.contains(BufferUsage::COPY_SRC) {
        result |= vk::BufferUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(BufferUsage::COPY_DST) {
        result |= vk::BufferUsageFlags::TRANSFER_DST;
    }

    result
}

pub fn convert_memory_location(location: MemoryLocation) -> gpu_allocator::MemoryLocation {
    match location {
        MemoryLocation::GpuOnly => gpu_allocator::MemoryLocation::GpuOnly,
        MemoryLocation::CpuToGpu => gpu_allocator::MemoryLocation::CpuToGpu,
        MemoryLocation::GpuToCpu => gpu_allocator::MemoryLocation::GpuToCpu,
    }
}

pub fn convert_shader_stages(stages: ShaderStages) -> vk::ShaderStageFlags {
    let mut result = vk::ShaderStageFlags::empty();
    if stages.contains(ShaderStages::VERTEX) {
        result |= vk::ShaderStageFlags::VERTEX;
    }
    if stages.contains(ShaderStages::FRAGMENT) {
        result |= vk::ShaderStageFlags::FRAGMENT;
    }
    result
}

pub fn convert_vertex_format(format: VertexFormat) -> vk::Format {
    match format {
        VertexFormat::Float32x2 => vk::Format::R32G32_SFLOAT,
        VertexFormat::Float32x3 => vk::Format::R32G32B32_SFLOAT,
        VertexFormat::Float32x4 => vk::Format::R32G32B32A32_SFLOAT,
    }
}

/// `None` for [`PrimitiveTopology::Undefined`], which cannot be rasterized.
pub fn convert_topology(topology: PrimitiveTopology) -> Option<vk::PrimitiveTopology> {
    match topology {
        PrimitiveTopology::LineList => Some(vk::PrimitiveTopology::LINE_LIST),
        PrimitiveTopology::TriangleList => Some(vk::PrimitiveTopology::TRIANGLE_LIST),
        PrimitiveTopology::Undefined => None,
    }
}

pub fn convert_polygon_mode(mode: PolygonMode) -> vk::PolygonMode {
    match mode {
        PolygonMode::Line => vk::PolygonMode::LINE,
        PolygonMode::Fill => vk::PolygonMode::FILL,
    }
}

pub fn convert_cull_mode(mode: CullMode) -> vk::CullModeFlags {
    match mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
    }
}

pub fn convert_front_face(face: FrontFace) -> vk::FrontFace {
    match face {
        FrontFace::Clockwise => vk::FrontFace::CLOCKWISE,
        FrontFace::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
    }
}

pub fn convert_compare_op(func: CompareFunction) -> vk::CompareOp {
    match func {
        CompareFunction::Never => vk::CompareOp::NEVER,
        CompareFunction::Less => vk::CompareOp::LESS,
        CompareFunction::Equal => vk::CompareOp::EQUAL,
        CompareFunction::LessEqual => vk::CompareOp::LESS_OR_EQUAL,
        CompareFunction::Greater => vk::CompareOp::GREATER,
        CompareFunction::NotEqual => vk::CompareOp::NOT_EQUAL,
        CompareFunction::GreaterEqual => vk::CompareOp::GREATER_OR_EQUAL,
        CompareFunction::Always => vk::CompareOp::ALWAYS,
    }
}

pub fn convert_sample_count(count: SampleCount) -> vk::SampleCountFlags {
    match count {
        SampleCount::X1 => vk::SampleCountFlags::TYPE_1,
        SampleCount::X2 => vk::SampleCountFlags::TYPE_2,
        SampleCount::X4 => vk::SampleCountFlags::TYPE_4,
        SampleCount::X8 => vk::SampleCountFlags::TYPE_8,
        SampleCount::X16 => vk::SampleCountFlags::TYPE_16,
        SampleCount::X32 => vk::SampleCountFlags::TYPE_32,
        SampleCount::X64 => vk::SampleCountFlags::TYPE_64,
    }
}

/// Highest sample count present in `supported`.
pub fn max_sample_count(supported: vk::SampleCountFlags) -> SampleCount {
    [
        SampleCount::X64,
        SampleCount::X32,
        SampleCount::X16,
        SampleCount::X8,
        SampleCount::X4,
        SampleCount::X2,
    ]
    .into_iter()
    .find(|count| supported.contains(convert_sample_count(*count)))
    .unwrap_or(SampleCount::X1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_sample_count_picks_highest() {
        let supported = vk::SampleCountFlags::TYPE_1 | vk::SampleCountFlags::TYPE_2 | vk::SampleCountFlags::TYPE_8;
        assert_eq!(max_sample_count(supported), SampleCount::X8);
        assert_eq!(max_sample_count(vk::SampleCountFlags::TYPE_1), SampleCount::X1);
    }

    #[test]
    fn undefined_topology_has_no_vulkan_equivalent() {
        assert_eq!(convert_topology(PrimitiveTopology::Undefined), None);
        assert_eq!(
            convert_topology(PrimitiveTopology::LineList),
            Some(vk::PrimitiveTopology::LINE_LIST)
        );
    }
}
