//! Upload-ready batches of vertex data.

use std::ops::Range;

use super::data::{Dimension, Geometry, PrimitiveTopology, Vertex};

/// CPU-side batch: several vertex arrays packed into one upload.
///
/// Vertices are interleaved per the batch dimension: 2D batches store
/// `x, y, r, g, b, a` (6 floats), 3D batches store `x, y, z, r, g, b, a`
/// (7 floats). A batch remembers where each source array starts so the frame
/// loop can issue one draw per source while binding the buffer once.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBatch {
    data: Vec<f32>,
    ranges: Vec<Range<u32>>,
    topology: PrimitiveTopology,
    dimension: Dimension,
}

impl MeshBatch {
    pub fn new(topology: PrimitiveTopology, dimension: Dimension) -> Self {
        Self {
            data: Vec::new(),
            ranges: Vec::new(),
            topology,
            dimension,
        }
    }

    /// Batch the given vertex arrays in order.
    pub fn from_arrays<'a>(
        arrays: impl IntoIterator<Item = &'a [Vertex]>,
        topology: PrimitiveTopology,
        dimension: Dimension,
    ) -> Self {
        let mut batch = Self::new(topology, dimension);
        for array in arrays {
            batch.push(array);
        }
        batch
    }

    /// Batch a single geometry, taking its topology and dimension.
    pub fn from_geometry(geometry: &Geometry) -> Self {
        let description = geometry.description;
        Self::from_arrays(
            [geometry.vertices.as_slice()],
            description.topology,
            description.kind.dimension(),
        )
    }

    /// Append a vertex array as a new draw range.
    pub fn push(&mut self, vertices: &[Vertex]) {
        let start = self.element_count() as u32;
        self.data.reserve(vertices.len() * self.floats_per_vertex());
        for vertex in vertices {
            let [x, y, z] = vertex.position;
            match self.dimension {
                Dimension::TwoD => self.data.extend_from_slice(&[x, y]),
                Dimension::ThreeD => self.data.extend_from_slice(&[x, y, z]),
            }
            self.data.extend_from_slice(&vertex.color);
        }
        self.ranges.push(start..self.element_count() as u32);
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Floats per packed vertex: 6 in 2D, 7 in 3D.
    pub fn floats_per_vertex(&self) -> usize {
        match self.dimension {
            Dimension::TwoD => 6,
            Dimension::ThreeD => 7,
        }
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Vertex ranges, one per batched array.
    pub fn ranges(&self) -> &[Range<u32>] {
        &self.ranges
    }

    pub fn element_count(&self) -> usize {
        self.data.len() / self.floats_per_vertex()
    }

    pub fn element_size(&self) -> usize {
        self.floats_per_vertex() * std::mem::size_of::<f32>()
    }

    /// Size in bytes of the batched vertex data.
    pub fn byte_size(&self) -> u64 {
        (self.element_count() * self.element_size()) as u64
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Release the vertex data while keeping topology and dimension.
    pub fn clear(&mut self) {
        self.data = Vec::new();
        self.ranges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn arrays_are_concatenated_with_ranges() {
        let a = vec![Vertex::new([0.0; 3], Color::BLACK); 3];
        let b = vec![Vertex::new([1.0; 3], Color::BLACK); 6];

        let batch = MeshBatch::from_arrays(
            [a.as_slice(), b.as_slice()],
            PrimitiveTopology::TriangleList,
            Dimension::ThreeD,
        );

        assert_eq!(batch.element_count(), 9);
        assert_eq!(batch.ranges(), &[0..3, 3..9]);
        assert_eq!(batch.byte_size(), 9 * 28);
        assert_eq!(batch.as_bytes().len(), 9 * 28);
    }

    #[test]
    fn planar_batches_drop_z() {
        let vertex = Vertex::new([1.0, 2.0, 3.0], Color::rgba(0.1, 0.2, 0.3, 1.0));
        let batch = MeshBatch::from_arrays([&[vertex][..]], PrimitiveTopology::LineList, Dimension::TwoD);

        assert_eq!(batch.element_size(), 24);
        assert_eq!(batch.data(), &[1.0, 2.0, 0.1, 0.2, 0.3, 1.0]);
    }

    #[test]
    fn clear_releases_data() {
        let mut batch = MeshBatch::new(PrimitiveTopology::LineList, Dimension::TwoD);
        batch.push(&[Vertex::default(); 2]);
        batch.clear();
        assert!(batch.is_empty());
        assert_eq!(batch.byte_size(), 0);
        assert_eq!(batch.topology(), PrimitiveTopology::LineList);
    }
}
