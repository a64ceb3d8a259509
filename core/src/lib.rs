//! # fieldplot core
//!
//! GPU-agnostic building blocks shared by the importer and the renderer:
//! label coloring, geometry builders, mesh batches, the import queue and
//! cooperative cancellation.

pub mod color;
pub mod compute;
pub mod error;
pub mod label;
pub mod mesh;
pub mod queue;

pub use color::Color;
pub use error::{GeometryError, GeometryResult};
pub use label::{Label, LabelTable};
pub use queue::ThreadSafeQueue;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
