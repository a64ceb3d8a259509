//! Import errors.

use fieldplot_core::mesh::MeshId;
use thiserror::Error;

/// Errors that can occur while decoding or scheduling a scene import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to decode scene payload: {0}")]
    Decode(String),
    #[error("Failed to encode scene payload: {0}")]
    Encode(String),
    #[error("Failed to start import runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("Import task for mesh {mesh_id} ended without a report")]
    TaskLost { mesh_id: MeshId },
}

pub type ImportResult<T> = Result<T, ImportError>;
