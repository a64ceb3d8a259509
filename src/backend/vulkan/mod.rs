//! Vulkan backend implementation using ash
//!
//! Wraps a device created by the caller: instance, device and render pass
//! creation stay outside. Buffer memory comes from gpu-allocator.

mod conversion;

use std::collections::HashMap;
use std::ffi::CStr;
use std::sync::Arc;

use ash::vk;
use gpu_allocator::vulkan::{
    Allocation, AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc,
};
use parking_lot::Mutex;

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::pipeline::PipelineDescriptor;

use conversion::*;

const SHADER_ENTRY: &CStr = c"main";

/// Vulkan backend implementation
pub struct VulkanBackend {
    device: ash::Device,
    render_pass: vk::RenderPass,
    sample_count: SampleCount,
    allocator: Option<Arc<Mutex<Allocator>>>,

    // Resource storage
    buffers: HashMap<u64, VkBuffer>,
    pipelines: HashMap<u64, vk::Pipeline>,
    pipeline_layouts: HashMap<u64, vk::PipelineLayout>,

    next_id: u64,
}

struct VkBuffer {
    buffer: vk::Buffer,
    allocation: Allocation,
    size: u64,
}

impl VulkanBackend {
    /// Wrap an existing device. Pipelines are created for subpass 0 of
    /// `render_pass` with the highest sample count the device supports for
    /// both color and depth framebuffers.
    pub fn new(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        render_pass: vk::RenderPass,
    ) -> BackendResult<Self> {
        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.clone(),
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })
        .map_err(|e| BackendError::InitializationFailed(format!("memory allocator: {e}")))?;

        let limits = unsafe { instance.get_physical_device_properties(physical_device) }.limits;
        let sample_count = max_sample_count(
            limits.framebuffer_color_sample_counts & limits.framebuffer_depth_sample_counts,
        );

        log::info!("Vulkan backend ready, {:?} multisampling", sample_count);

        Ok(Self {
            device,
            render_pass,
            sample_count,
            allocator: Some(Arc::new(Mutex::new(allocator))),
            buffers: HashMap::new(),
            pipelines: HashMap::new(),
            pipeline_layouts: HashMap::new(),
            next_id: 0,
        })
    }

    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    pub fn allocator(&self) -> Option<Arc<Mutex<Allocator>>> {
        self.allocator.clone()
    }

    /// Raw pipeline behind a handle, for binding in the frame loop.
    pub fn vk_pipeline(&self, pipeline: PipelineHandle) -> Option<vk::Pipeline> {
        self.pipelines.get(&pipeline.0).copied()
    }

    pub fn vk_pipeline_layout(&self, layout: PipelineLayoutHandle) -> Option<vk::PipelineLayout> {
        self.pipeline_layouts.get(&layout.0).copied()
    }

    pub fn vk_buffer(&self, buffer: BufferHandle) -> Option<vk::Buffer> {
        self.buffers.get(&buffer.0).map(|b| b.buffer)
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

fn vk_shader_module(module: ShaderModule) -> BackendResult<vk::ShaderModule> {
    match module {
        ShaderModule::Vulkan(module) => Ok(module),
        other => Err(BackendError::PipelineCreationFailed(format!(
            "{other:?} is not a Vulkan shader module"
        ))),
    }
}

impl GraphicsBackend for VulkanBackend {
    fn name(&self) -> &'static str {
        "Vulkan"
    }

    fn sample_count(&self) -> SampleCount {
        self.sample_count
    }

    fn create_pipeline_layout(
        &mut self,
        desc: &PipelineLayoutDescriptor,
    ) -> BackendResult<PipelineLayoutHandle> {
        let ranges: Vec<vk::PushConstantRange> = desc
            .push_constant_ranges
            .iter()
            .map(|range| {
                vk::PushConstantRange::default()
                    .stage_flags(convert_shader_stages(range.stages))
                    .offset(range.offset)
                    .size(range.size)
            })
            .collect();
        let create_info = vk::PipelineLayoutCreateInfo::default().push_constant_ranges(&ranges);

        let layout = unsafe { self.device.create_pipeline_layout(&create_info, None) }
            .map_err(|e| BackendError::PipelineLayoutCreationFailed(format!("{:?}", e)))?;

        let id = self.allocate_id();
        self.pipeline_layouts.insert(id, layout);
        Ok(PipelineLayoutHandle(id))
    }

    fn create_graphics_pipeline(
        &mut self,
        desc: &PipelineDescriptor,
        layout: PipelineLayoutHandle,
    ) -> BackendResult<PipelineHandle> {
        let vk_layout = self
            .vk_pipeline_layout(layout)
            .ok_or_else(|| BackendError::InvalidHandle(format!("pipeline layout {}", layout.0)))?;
        let topology = convert_topology(desc.topology()).ok_or_else(|| {
            BackendError::PipelineCreationFailed("undefined primitive topology".into())
        })?;

        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vk_shader_module(desc.vertex_shader())?)
                .name(SHADER_ENTRY),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(vk_shader_module(desc.fragment_shader())?)
                .name(SHADER_ENTRY),
        ];

        let vertex_layout = desc.vertex_layout();
        let binding_descriptions = [vk::VertexInputBindingDescription::default()
            .binding(0)
            .stride(vertex_layout.array_stride)
            .input_rate(vk::VertexInputRate::VERTEX)];
        let attribute_descriptions: Vec<vk::VertexInputAttributeDescription> = vertex_layout
            .attributes
            .iter()
            .map(|attr| {
                vk::VertexInputAttributeDescription::default()
                    .location(attr.location)
                    .binding(0)
                    .format(convert_vertex_format(attr.format))
                    .offset(attr.offset)
            })
            .collect();

        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&binding_descriptions)
            .vertex_attribute_descriptions(&attribute_descriptions);

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(topology)
            .primitive_restart_enable(false);

        // Dynamic viewport and scissor
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(convert_polygon_mode(desc.polygon_mode()))
            .line_width(desc.line_width())
            .cull_mode(convert_cull_mode(desc.cull_mode()))
            .front_face(convert_front_face(desc.front_face()))
            .depth_bias_enable(false);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .sample_shading_enable(false)
            .rasterization_samples(convert_sample_count(desc.sample_count()));

        let depth = desc.depth();
        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(depth.test_enabled)
            .depth_write_enable(depth.write_enabled)
            .depth_compare_op(convert_compare_op(depth.compare))
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false);

        let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(desc.blend_enabled())];
        let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .multisample_state(&multisample_state)
            .depth_stencil_state(&depth_stencil_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(vk_layout)
            .render_pass(self.render_pass)
            .subpass(0);

        let pipelines = unsafe {
            self.device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
        }
        .map_err(|(_, e)| BackendError::PipelineCreationFailed(format!("{:?}", e)))?;

        let pipeline = pipelines.into_iter().next().ok_or_else(|| {
            BackendError::PipelineCreationFailed("driver returned no pipeline".into())
        })?;

        let id = self.allocate_id();
        self.pipelines.insert(id, pipeline);
        Ok(PipelineHandle(id))
    }

    fn destroy_pipeline(&mut self, pipeline: PipelineHandle) {
        if let Some(vk_pipeline) = self.pipelines.remove(&pipeline.0) {
            unsafe { self.device.destroy_pipeline(vk_pipeline, None) };
        }
    }

    fn destroy_pipeline_layout(&mut self, layout: PipelineLayoutHandle) {
        if let Some(vk_layout) = self.pipeline_layouts.remove(&layout.0) {
            unsafe { self.device.destroy_pipeline_layout(vk_layout, None) };
        }
    }

    fn create_buffer(&mut self, desc: &BufferDescriptor) -> BackendResult<BufferHandle> {
        let buffer_info = vk::BufferCreateInfo {
            size: desc.size,
            usage: convert_buffer_usage(desc.usage),
            sharing_mode: vk::SharingMode::EXCLUSIVE,
            ..Default::default()
        };

        let buffer = unsafe { self.device.create_buffer(&buffer_info, None) }
            .map_err(|e| BackendError::BufferCreationFailed(e.to_string()))?;

        let requirements = unsafe { self.device.get_buffer_memory_requirements(buffer) };

        let allocator = match self.allocator.as_ref() {
            Some(allocator) => allocator,
            None => {
                unsafe { self.device.destroy_buffer(buffer, None) };
                return Err(BackendError::BufferCreationFailed(
                    "Allocator not available".into(),
                ));
            }
        };

        let allocation = allocator.lock().allocate(&AllocationCreateDesc {
            name: desc.label.as_deref().unwrap_or("buffer"),
            requirements,
            location: convert_memory_location(desc.location),
            linear: true,
            allocation_scheme: AllocationScheme::GpuAllocatorManaged,
        });
        let allocation = match allocation {
            Ok(allocation) => allocation,
            Err(e) => {
                unsafe { self.device.destroy_buffer(buffer, None) };
                return Err(BackendError::BufferCreationFailed(e.to_string()));
            }
        };

        if let Err(e) =
            unsafe { self.device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset()) }
        {
            unsafe { self.device.destroy_buffer(buffer, None) };
            let _ = allocator.lock().free(allocation);
            return Err(BackendError::BufferCreationFailed(e.to_string()));
        }

        let id = self.allocate_id();
        self.buffers.insert(
            id,
            VkBuffer {
                buffer,
                allocation,
                size: desc.size,
            },
        );

        Ok(BufferHandle(id))
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> BackendResult<()> {
        let vk_buffer = self
            .buffers
            .get_mut(&buffer.0)
            .ok_or_else(|| BackendError::InvalidHandle(format!("buffer {}", buffer.0)))?;
        let size = vk_buffer.size;
        let mapped = vk_buffer
            .allocation
            .mapped_slice_mut()
            .ok_or_else(|| BackendError::BufferWriteFailed("buffer is not mapped".into()))?;

        let start = offset as usize;
        let end = start + data.len();
        if end as u64 > size || end > mapped.len() {
            return Err(BackendError::BufferWriteFailed(format!(
                "{} bytes at offset {offset} exceed buffer size {size}",
                data.len()
            )));
        }
        mapped[start..end].copy_from_slice(data);
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if let Some(vk_buffer) = self.buffers.remove(&buffer.0) {
            unsafe { self.device.destroy_buffer(vk_buffer.buffer, None) };
            if let Some(ref allocator) = self.allocator {
                let _ = allocator.lock().free(vk_buffer.allocation);
            }
        }
    }

    fn wait_idle(&mut self) -> BackendResult<()> {
        unsafe { self.device.device_wait_idle() }.map_err(|e| match e {
            vk::Result::ERROR_DEVICE_LOST => BackendError::DeviceLost,
            other => BackendError::WaitIdleFailed(format!("{:?}", other)),
        })
    }
}

impl Drop for VulkanBackend {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();

            for (_, pipeline) in self.pipelines.drain() {
                self.device.destroy_pipeline(pipeline, None);
            }
            for (_, layout) in self.pipeline_layouts.drain() {
                self.device.destroy_pipeline_layout(layout, None);
            }

            if let Some(ref allocator) = self.allocator {
                for (_, buffer) in self.buffers.drain() {
                    self.device.destroy_buffer(buffer.buffer, None);
                    let _ = allocator.lock().free(buffer.allocation);
                }
            }

            // The allocator must go before the caller destroys the device
            drop(self.allocator.take());
        }
    }
}
