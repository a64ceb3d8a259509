//! CPU-side geometry data structures.
//!
//! This module provides:
//! - [`PrimitiveTopology`] and [`PolygonMode`] - How vertices are assembled and rasterized
//! - [`GeometryKind`] - The declared kind of a scene object (curve, mesh, volume)
//! - [`Vertex`] - Position + RGBA color, the sole GPU-visible unit
//! - [`Geometry`] - A vertex array with its description
//! - [`ConstructedGeometry`] - A geometry tagged with the plot and mesh it belongs to

use bytemuck::{Pod, Zeroable};

use crate::color::Color;

/// Identifier of a plot (one decoded scene document).
pub type PlotId = u16;

/// Identifier of a mesh inside a plot.
pub type MeshId = u16;

/// Primitive topology describing how vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Every two vertices form a line.
    LineList,
    /// Every three vertices form a triangle.
    TriangleList,
    /// No topology could be derived from the geometry kind.
    #[default]
    Undefined,
}

impl PrimitiveTopology {
    /// Get the number of vertices per primitive.
    pub fn vertices_per_primitive(&self) -> Option<u32> {
        match self {
            Self::LineList => Some(2),
            Self::TriangleList => Some(3),
            Self::Undefined => None,
        }
    }
}

/// Polygon rasterization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    /// Only polygon edges are drawn.
    Line,
    /// Polygons are filled.
    #[default]
    Fill,
}

/// Whether a batch lives in the plane or in space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    TwoD,
    ThreeD,
}

/// Declared kind of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Curve2D,
    Curve3D,
    Mesh2D,
    Mesh3D,
    /// Volumetric data, carried through the pipeline but never rasterized directly.
    Volume,
}

impl GeometryKind {
    /// Parse the kind name used by the scene payload.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Curve2D" => Some(Self::Curve2D),
            "Curve3D" => Some(Self::Curve3D),
            "Mesh2D" => Some(Self::Mesh2D),
            "Mesh3D" => Some(Self::Mesh3D),
            "Volume" => Some(Self::Volume),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Curve2D => "Curve2D",
            Self::Curve3D => "Curve3D",
            Self::Mesh2D => "Mesh2D",
            Self::Mesh3D => "Mesh3D",
            Self::Volume => "Volume",
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Self::Curve2D | Self::Mesh2D => Dimension::TwoD,
            Self::Curve3D | Self::Mesh3D | Self::Volume => Dimension::ThreeD,
        }
    }

    /// Topology of the main surface: curves are lines, meshes are triangles.
    pub fn main_topology(&self) -> PrimitiveTopology {
        match self {
            Self::Curve2D | Self::Curve3D => PrimitiveTopology::LineList,
            Self::Mesh2D | Self::Mesh3D => PrimitiveTopology::TriangleList,
            Self::Volume => PrimitiveTopology::Undefined,
        }
    }

    /// Topology of the border batch: 2D meshes border with lines, 3D meshes
    /// with triangles. Curves and volumes have no border topology.
    pub fn border_topology(&self) -> PrimitiveTopology {
        match self {
            Self::Mesh2D => PrimitiveTopology::LineList,
            Self::Mesh3D => PrimitiveTopology::TriangleList,
            Self::Curve2D | Self::Curve3D | Self::Volume => PrimitiveTopology::Undefined,
        }
    }

    pub fn is_volume(&self) -> bool {
        matches!(self, Self::Volume)
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A colored vertex: 3 position floats followed by 4 color floats.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    /// Size in bytes of one vertex.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(position: [f32; 3], color: Color) -> Self {
        Self {
            position,
            color: color.to_array(),
        }
    }

    pub fn color(&self) -> Color {
        let [r, g, b, a] = self.color;
        Color::rgba(r, g, b, a)
    }
}

/// How a geometry is assembled and rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryDescription {
    pub topology: PrimitiveTopology,
    pub polygon_mode: PolygonMode,
    pub kind: GeometryKind,
}

impl GeometryDescription {
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            topology: PrimitiveTopology::Undefined,
            polygon_mode: PolygonMode::default(),
            kind,
        }
    }

    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_polygon_mode(mut self, polygon_mode: PolygonMode) -> Self {
        self.polygon_mode = polygon_mode;
        self
    }
}

/// A growable vertex array plus its description.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub description: GeometryDescription,
}

impl Geometry {
    pub fn new(vertices: Vec<Vertex>, description: GeometryDescription) -> Self {
        Self {
            vertices,
            description,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Size in bytes of the vertex data.
    pub fn byte_size(&self) -> u64 {
        (self.vertices.len() * Vertex::SIZE) as u64
    }

    /// Raw vertex bytes, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Which branch of an import task produced a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryRole {
    /// The main surface or curve.
    Main,
    /// Scalar isovalue overlay.
    IsoScalar,
    /// Vector isovalue glyphs.
    IsoVector,
    /// Border of a mesh.
    Border,
}

/// A geometry produced by an import task, tagged with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructedGeometry {
    pub plot_id: PlotId,
    pub mesh_id: MeshId,
    pub role: GeometryRole,
    pub geometry: Geometry,
    /// Line width requested by the payload, if any.
    pub line_width: Option<f32>,
}

impl ConstructedGeometry {
    pub fn new(plot_id: PlotId, mesh_id: MeshId, role: GeometryRole, geometry: Geometry) -> Self {
        Self {
            plot_id,
            mesh_id,
            role,
            geometry,
            line_width: None,
        }
    }

    pub fn with_line_width(mut self, line_width: Option<f32>) -> Self {
        self.line_width = line_width;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_seven_floats() {
        assert_eq!(Vertex::SIZE, 7 * std::mem::size_of::<f32>());
    }

    #[test]
    fn kind_names_roundtrip() {
        for kind in [
            GeometryKind::Curve2D,
            GeometryKind::Curve3D,
            GeometryKind::Mesh2D,
            GeometryKind::Mesh3D,
            GeometryKind::Volume,
        ] {
            assert_eq!(GeometryKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(GeometryKind::from_name("Surface"), None);
    }

    #[test]
    fn main_topology_by_kind() {
        assert_eq!(GeometryKind::Curve2D.main_topology(), PrimitiveTopology::LineList);
        assert_eq!(GeometryKind::Curve3D.main_topology(), PrimitiveTopology::LineList);
        assert_eq!(GeometryKind::Mesh2D.main_topology(), PrimitiveTopology::TriangleList);
        assert_eq!(GeometryKind::Mesh3D.main_topology(), PrimitiveTopology::TriangleList);
    }

    #[test]
    fn border_topology_by_kind() {
        assert_eq!(GeometryKind::Mesh2D.border_topology(), PrimitiveTopology::LineList);
        assert_eq!(GeometryKind::Mesh3D.border_topology(), PrimitiveTopology::TriangleList);
        assert_eq!(GeometryKind::Curve2D.border_topology(), PrimitiveTopology::Undefined);
        assert_eq!(GeometryKind::Curve3D.border_topology(), PrimitiveTopology::Undefined);
    }

    #[test]
    fn geometry_bytes_match_vertex_count() {
        let geometry = Geometry::new(
            vec![Vertex::new([1.0, 2.0, 3.0], Color::BLACK); 4],
            GeometryDescription::new(GeometryKind::Mesh3D),
        );
        assert_eq!(geometry.byte_size(), 4 * 28);
        assert_eq!(geometry.as_bytes().len(), 4 * 28);
    }
}
