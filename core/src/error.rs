//! Geometry construction errors.

use thiserror::Error;

/// Errors that can occur while building a geometry from raw arrays.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Failed to allocate {count} vertices")]
    AllocationFailed { count: usize },
    #[error("Index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("Missing field sample for vertex {vertex}")]
    MissingSample { vertex: usize },
    #[error("Non-finite field sample for vertex {vertex}")]
    NonFiniteSample { vertex: usize },
    #[error("Degenerate field range [{min}, {max}]")]
    DegenerateRange { min: f32, max: f32 },
}

pub type GeometryResult<T> = Result<T, GeometryError>;
