//! Backend abstraction layer
//!
//! Provides the [`GraphicsBackend`] trait and the types both backends share:
//! - [`DummyBackend`] records every call, for tests and headless runs
//! - `VulkanBackend` drives a caller-owned Vulkan device (native only)

pub mod dummy;
pub mod traits;
pub mod types;

// Vulkan backend is only available on native platforms
#[cfg(all(feature = "vulkan-backend", not(target_arch = "wasm32")))]
pub mod vulkan;

pub use dummy::{DummyBackend, DummyStats};
pub use traits::*;
pub use types::*;
