//! CPU-side geometry types and builders.
//!
//! This module provides GPU-agnostic geometry data structures:
//!
//! - [`Vertex`] / [`Geometry`] - Colored vertex arrays with their description
//! - [`ConstructedGeometry`] - A geometry tagged with its plot and mesh
//! - [`MeshBatch`] - Vertex arrays grouped into one upload-ready batch
//! - Builders for plain meshes, scalar overlays and vector glyphs

mod batch;
pub mod builder;
mod data;

pub use batch::MeshBatch;
pub use builder::{
    construct_geometry, construct_iso_mesh, construct_iso_mesh_vector, FieldRange,
    SCALAR_HUE_SPAN, VECTOR_HUE_SPAN,
};
pub use data::{
    ConstructedGeometry, Dimension, Geometry, GeometryDescription, GeometryKind, GeometryRole,
    MeshId, PlotId, PolygonMode, PrimitiveTopology, Vertex,
};
