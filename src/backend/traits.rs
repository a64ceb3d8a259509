//! Core backend abstraction traits
//!
//! The render graph only needs pipeline and buffer lifetime management from
//! a device: everything else (swapchain, command recording) stays with the
//! caller's frame loop.

use crate::backend::types::*;
use crate::pipeline::PipelineDescriptor;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to initialize backend: {0}")]
    InitializationFailed(String),
    #[error("Failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Failed to write buffer: {0}")]
    BufferWriteFailed(String),
    #[error("Failed to create pipeline layout: {0}")]
    PipelineLayoutCreationFailed(String),
    #[error("Failed to create pipeline: {0}")]
    PipelineCreationFailed(String),
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),
    #[error("Failed to wait for device idle: {0}")]
    WaitIdleFailed(String),
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Device lost")]
    DeviceLost,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// Handle to a graphics pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineHandle(pub(crate) u64);

/// Handle to a pipeline layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineLayoutHandle(pub(crate) u64);

impl BufferHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl PipelineHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl PipelineLayoutHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Device operations the render graph relies on.
///
/// Destroy calls with a handle the backend does not know are no-ops.
pub trait GraphicsBackend {
    /// Get the backend name
    fn name(&self) -> &'static str;

    /// Multisample count used by every pipeline
    fn sample_count(&self) -> SampleCount;

    /// Create a pipeline layout
    fn create_pipeline_layout(
        &mut self,
        desc: &PipelineLayoutDescriptor,
    ) -> BackendResult<PipelineLayoutHandle>;

    /// Create a graphics pipeline using `layout`
    fn create_graphics_pipeline(
        &mut self,
        desc: &PipelineDescriptor,
        layout: PipelineLayoutHandle,
    ) -> BackendResult<PipelineHandle>;

    /// Destroy a graphics pipeline
    fn destroy_pipeline(&mut self, pipeline: PipelineHandle);

    /// Destroy a pipeline layout
    fn destroy_pipeline_layout(&mut self, layout: PipelineLayoutHandle);

    /// Create a buffer
    fn create_buffer(&mut self, desc: &BufferDescriptor) -> BackendResult<BufferHandle>;

    /// Write data to a mapped buffer
    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> BackendResult<()>;

    /// Destroy a buffer
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Block until the device has finished all submitted work
    fn wait_idle(&mut self) -> BackendResult<()>;
}
