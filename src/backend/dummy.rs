//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations. It hands out handles,
//! remembers what is alive, counts every create/destroy/wait call and can be
//! told to fail, so resource lifecycles are testable without GPU hardware.

use std::collections::HashMap;

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::pipeline::PipelineDescriptor;

/// Call counters of a [`DummyBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DummyStats {
    pub layouts_created: usize,
    pub layouts_destroyed: usize,
    pub pipelines_created: usize,
    pub pipelines_destroyed: usize,
    pub buffers_created: usize,
    pub buffers_destroyed: usize,
    pub buffer_writes: usize,
    pub wait_idle_calls: usize,
}

impl DummyStats {
    /// Total number of pipeline and layout create/destroy calls.
    pub fn pipeline_operations(&self) -> usize {
        self.layouts_created + self.layouts_destroyed + self.pipelines_created + self.pipelines_destroyed
    }
}

/// Dummy GPU backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    sample_count: SampleCount,
    next_id: u64,
    layouts: HashMap<u64, PipelineLayoutDescriptor>,
    pipelines: HashMap<u64, PipelineDescriptor>,
    buffers: HashMap<u64, BufferDescriptor>,
    stats: DummyStats,
    fail_layouts: bool,
    fail_pipelines: usize,
    fail_buffers: bool,
    fail_wait_idle: bool,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_count(mut self, sample_count: SampleCount) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn stats(&self) -> DummyStats {
        self.stats
    }

    /// Make the next `count` pipeline creations fail.
    pub fn fail_next_pipelines(&mut self, count: usize) {
        self.fail_pipelines = count;
    }

    /// Make every pipeline layout creation fail until reset.
    pub fn set_fail_layouts(&mut self, fail: bool) {
        self.fail_layouts = fail;
    }

    /// Make every buffer creation fail until reset.
    pub fn set_fail_buffers(&mut self, fail: bool) {
        self.fail_buffers = fail;
    }

    /// Make every wait-idle call report a lost device until reset.
    pub fn set_fail_wait_idle(&mut self, fail: bool) {
        self.fail_wait_idle = fail;
    }

    pub fn live_pipelines(&self) -> usize {
        self.pipelines.len()
    }

    pub fn live_layouts(&self) -> usize {
        self.layouts.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Descriptor a live pipeline was created from.
    pub fn pipeline_descriptor(&self, pipeline: PipelineHandle) -> Option<&PipelineDescriptor> {
        self.pipelines.get(&pipeline.0)
    }

    /// Descriptor a live buffer was created from.
    pub fn buffer_descriptor(&self, buffer: BufferHandle) -> Option<&BufferDescriptor> {
        self.buffers.get(&buffer.0)
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl GraphicsBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn sample_count(&self) -> SampleCount {
        self.sample_count
    }

    fn create_pipeline_layout(
        &mut self,
        desc: &PipelineLayoutDescriptor,
    ) -> BackendResult<PipelineLayoutHandle> {
        if self.fail_layouts {
            return Err(BackendError::PipelineLayoutCreationFailed(
                "injected failure".into(),
            ));
        }
        let id = self.allocate_id();
        log::trace!("DummyBackend: creating pipeline layout {id} {:?}", desc.label);
        self.layouts.insert(id, desc.clone());
        self.stats.layouts_created += 1;
        Ok(PipelineLayoutHandle(id))
    }

    fn create_graphics_pipeline(
        &mut self,
        desc: &PipelineDescriptor,
        layout: PipelineLayoutHandle,
    ) -> BackendResult<PipelineHandle> {
        if self.fail_pipelines > 0 {
            self.fail_pipelines -= 1;
            return Err(BackendError::PipelineCreationFailed(
                "injected failure".into(),
            ));
        }
        if !self.layouts.contains_key(&layout.0) {
            return Err(BackendError::InvalidHandle(format!(
                "pipeline layout {}",
                layout.0
            )));
        }
        let id = self.allocate_id();
        log::trace!(
            "DummyBackend: creating pipeline {id} ({:?}, {:?})",
            desc.topology(),
            desc.polygon_mode()
        );
        self.pipelines.insert(id, desc.clone());
        self.stats.pipelines_created += 1;
        Ok(PipelineHandle(id))
    }

    fn destroy_pipeline(&mut self, pipeline: PipelineHandle) {
        if self.pipelines.remove(&pipeline.0).is_some() {
            log::trace!("DummyBackend: destroying pipeline {}", pipeline.0);
            self.stats.pipelines_destroyed += 1;
        }
    }

    fn destroy_pipeline_layout(&mut self, layout: PipelineLayoutHandle) {
        if self.layouts.remove(&layout.0).is_some() {
            log::trace!("DummyBackend: destroying pipeline layout {}", layout.0);
            self.stats.layouts_destroyed += 1;
        }
    }

    fn create_buffer(&mut self, desc: &BufferDescriptor) -> BackendResult<BufferHandle> {
        if self.fail_buffers {
            return Err(BackendError::BufferCreationFailed("injected failure".into()));
        }
        let id = self.allocate_id();
        log::trace!(
            "DummyBackend: creating buffer {:?} (size: {})",
            desc.label,
            desc.size
        );
        self.buffers.insert(id, desc.clone());
        self.stats.buffers_created += 1;
        Ok(BufferHandle(id))
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> BackendResult<()> {
        let desc = self
            .buffers
            .get(&buffer.0)
            .ok_or_else(|| BackendError::InvalidHandle(format!("buffer {}", buffer.0)))?;
        if !desc.mapped {
            return Err(BackendError::BufferWriteFailed("buffer is not mapped".into()));
        }
        if offset + data.len() as u64 > desc.size {
            return Err(BackendError::BufferWriteFailed(format!(
                "{} bytes at offset {offset} exceed buffer size {}",
                data.len(),
                desc.size
            )));
        }
        self.stats.buffer_writes += 1;
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer.0).is_some() {
            log::trace!("DummyBackend: destroying buffer {}", buffer.0);
            self.stats.buffers_destroyed += 1;
        }
    }

    fn wait_idle(&mut self) -> BackendResult<()> {
        log::trace!("DummyBackend: wait idle");
        self.stats.wait_idle_calls += 1;
        if self.fail_wait_idle {
            return Err(BackendError::DeviceLost);
        }
        Ok(())
    }
}
