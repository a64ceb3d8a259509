//! Construction of colored vertex buffers from raw scene arrays.
//!
//! Three builders share the same inputs (flattened `xyz` positions and an
//! index array) and produce a [`Geometry`]:
//!
//! - [`construct_geometry`] - one vertex per index, placeholder color
//! - [`construct_iso_mesh`] - one vertex per index, colored by a scalar field
//! - [`construct_iso_mesh_vector`] - two vertices per input vertex forming a
//!   glyph segment, colored by the vector magnitude
//!
//! Both isovalue builders use [`FieldRange`] for the min/max widening rule and
//! the linear hue mapping, so overlays stay visually comparable.

use crate::color::Color;
use crate::error::{GeometryError, GeometryResult};
use crate::label::{Label, LabelTable};

use super::data::{Geometry, GeometryDescription, Vertex};

/// Hue span in degrees used for scalar fields.
pub const SCALAR_HUE_SPAN: f32 = 330.0;

/// Hue span in degrees used for vector magnitudes.
pub const VECTOR_HUE_SPAN: f32 = 179.0;

/// Value range of a sampled field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f32,
    pub max: f32,
}

impl FieldRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Widen the range so that it covers every sample.
    ///
    /// The range never narrows: a caller-supplied hint stays included.
    pub fn widened(self, samples: impl IntoIterator<Item = f32>) -> Self {
        samples.into_iter().fold(self, |range, value| Self {
            min: range.min.min(value),
            max: range.max.max(value),
        })
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// A range is degenerate when it is empty, inverted or not finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.min.is_finite() && self.max.is_finite() && self.max > self.min)
    }

    /// Map `value` linearly onto `[0, hue_span]`.
    pub fn hue(&self, value: f32, hue_span: f32) -> f32 {
        hue_span * (value - self.min) / self.span()
    }

    /// Fully saturated color for `value`.
    pub fn color(&self, value: f32, hue_span: f32) -> Color {
        Color::from_hsv(self.hue(value, hue_span), 1.0, 1.0)
    }

    fn ensure_usable(self) -> GeometryResult<Self> {
        if self.is_degenerate() {
            return Err(GeometryError::DegenerateRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(self)
    }
}

fn allocate_vertices(count: usize) -> GeometryResult<Vec<Vertex>> {
    let mut vertices = Vec::new();
    vertices
        .try_reserve_exact(count)
        .map_err(|_| GeometryError::AllocationFailed { count })?;
    Ok(vertices)
}

fn position(vertices: &[f32], index: u32) -> GeometryResult<[f32; 3]> {
    let start = index as usize * 3;
    match vertices.get(start..start + 3) {
        Some(&[x, y, z]) => Ok([x, y, z]),
        _ => Err(GeometryError::IndexOutOfRange {
            index,
            vertex_count: vertices.len() / 3,
        }),
    }
}

/// Build the plain mesh for `indices`, registering `labels` into `table`.
///
/// Labels are inserted and the table colors regenerated before any vertex is
/// written. Output vertices are opaque black; label colors are not applied.
pub fn construct_geometry(
    vertices: &[f32],
    indices: &[u32],
    labels: &[Label],
    table: &mut LabelTable,
    description: GeometryDescription,
) -> GeometryResult<Geometry> {
    table.add_labels(labels);
    table.generate_colors();

    let mut out = allocate_vertices(indices.len())?;
    for &index in indices {
        out.push(Vertex::new(position(vertices, index)?, Color::BLACK));
    }

    Ok(Geometry::new(out, description))
}

/// Build a mesh colored by a scalar field sampled per vertex.
///
/// `values` is indexed by vertex id, not through `indices`. NaN or infinite
/// samples are rejected.
pub fn construct_iso_mesh(
    vertices: &[f32],
    indices: &[u32],
    values: &[f32],
    hint: FieldRange,
    description: GeometryDescription,
) -> GeometryResult<Geometry> {
    let samples = indices
        .iter()
        .map(|&index| {
            let vertex = index as usize;
            match values.get(vertex) {
                Some(value) if value.is_finite() => Ok(*value),
                Some(_) => Err(GeometryError::NonFiniteSample { vertex }),
                None => Err(GeometryError::MissingSample { vertex }),
            }
        })
        .collect::<GeometryResult<Vec<f32>>>()?;

    let range = hint.widened(samples.iter().copied()).ensure_usable()?;

    let mut out = allocate_vertices(indices.len())?;
    for (&index, &value) in indices.iter().zip(&samples) {
        let color = range.color(value, SCALAR_HUE_SPAN);
        out.push(Vertex::new(position(vertices, index)?, color));
    }

    Ok(Geometry::new(out, description))
}

/// Build one glyph segment per vertex from a 2-component vector field.
///
/// Vertex `2i` is the base point, vertex `2i + 1` the tip offset by the
/// vector scaled by `1 / max`. Both share the magnitude color. Vectors with
/// a non-finite component are rejected.
pub fn construct_iso_mesh_vector(
    vertices: &[f32],
    values: &[f32],
    hint: FieldRange,
    description: GeometryDescription,
) -> GeometryResult<Geometry> {
    let count = vertices.len() / 3;
    if values.len() < count * 2 {
        return Err(GeometryError::MissingSample {
            vertex: values.len() / 2,
        });
    }

    let field: Vec<[f32; 2]> = values
        .chunks_exact(2)
        .take(count)
        .enumerate()
        .map(|(vertex, v)| match [v[0], v[1]] {
            [x, y] if x.is_finite() && y.is_finite() => Ok([x, y]),
            _ => Err(GeometryError::NonFiniteSample { vertex }),
        })
        .collect::<GeometryResult<_>>()?;
    let magnitudes: Vec<f32> = field.iter().map(|[x, y]| x.hypot(*y)).collect();

    let range = hint.widened(magnitudes.iter().copied()).ensure_usable()?;
    if range.max <= 0.0 {
        return Err(GeometryError::DegenerateRange {
            min: range.min,
            max: range.max,
        });
    }

    let mut out = allocate_vertices(count * 2)?;
    for (i, ([vx, vy], magnitude)) in field.iter().zip(&magnitudes).enumerate() {
        let [x, y, z] = position(vertices, i as u32)?;
        let color = range.color(*magnitude, VECTOR_HUE_SPAN);
        out.push(Vertex::new([x, y, z], color));
        out.push(Vertex::new([x + vx / range.max, y + vy / range.max, z], color));
    }

    Ok(Geometry::new(out, description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::data::{GeometryKind, PrimitiveTopology};

    const EPS: f32 = 1e-3;

    fn description() -> GeometryDescription {
        GeometryDescription::new(GeometryKind::Mesh3D).with_topology(PrimitiveTopology::TriangleList)
    }

    fn grid_vertices() -> Vec<f32> {
        vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            1.0, 1.0, 0.5, //
        ]
    }

    #[test]
    fn plain_mesh_copies_positions_per_index() {
        let vertices = grid_vertices();
        let indices = [0, 1, 2, 2, 1, 3];
        let labels = [1, 1, 1, 2, 2, 2];
        let mut table = LabelTable::new();

        let geometry =
            construct_geometry(&vertices, &indices, &labels, &mut table, description()).unwrap();

        assert_eq!(geometry.vertex_count(), indices.len());
        for (vertex, &index) in geometry.vertices.iter().zip(&indices) {
            let start = index as usize * 3;
            assert_eq!(&vertex.position[..], &vertices[start..start + 3]);
            assert_eq!(vertex.color(), Color::BLACK);
        }
        assert_eq!(table.labels(), &[1, 2]);
        assert_eq!(table.colors().len(), 2);
        assert_eq!(geometry.description, description());
    }

    #[test]
    fn plain_mesh_rejects_out_of_range_index() {
        let mut table = LabelTable::new();
        let err = construct_geometry(&grid_vertices(), &[0, 9], &[], &mut table, description())
            .unwrap_err();
        assert_eq!(
            err,
            GeometryError::IndexOutOfRange {
                index: 9,
                vertex_count: 4
            }
        );
    }

    #[test]
    fn empty_indices_build_empty_geometry() {
        let mut table = LabelTable::new();
        let geometry = construct_geometry(&grid_vertices(), &[], &[], &mut table, description())
            .unwrap();
        assert!(geometry.is_empty());
    }

    #[test]
    fn scalar_hues_follow_tight_range() {
        let vertices = [0.0; 9];
        let geometry = construct_iso_mesh(
            &vertices,
            &[0, 1, 2],
            &[0.0, 1.0, 2.0],
            FieldRange::new(0.0, 2.0),
            description(),
        )
        .unwrap();

        let hues: Vec<f32> = geometry.vertices.iter().map(|v| v.color().hue()).collect();
        assert!((hues[0] - 0.0).abs() < EPS);
        assert!((hues[1] - 165.0).abs() < EPS);
        assert!((hues[2] - 330.0).abs() < EPS);
    }

    #[test]
    fn scalar_hues_are_bounded_and_monotonic() {
        let vertices: Vec<f32> = (0..8).flat_map(|i| [i as f32, 0.0, 0.0]).collect();
        let values = [3.0, -1.5, 0.25, 7.0, 2.0, 2.0, -4.0, 5.5];
        let indices = [6, 1, 2, 0, 4, 5, 7, 3];

        let geometry = construct_iso_mesh(
            &vertices,
            &indices,
            &values,
            FieldRange::new(0.0, 1.0),
            description(),
        )
        .unwrap();

        let mut pairs: Vec<(f32, f32)> = indices
            .iter()
            .zip(&geometry.vertices)
            .map(|(&i, v)| (values[i as usize], v.color().hue()))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        for &(_, hue) in &pairs {
            assert!((0.0..=SCALAR_HUE_SPAN + EPS).contains(&hue));
        }
        for window in pairs.windows(2) {
            assert!(window[1].1 + EPS >= window[0].1);
        }
    }

    #[test]
    fn hint_only_widens_range() {
        let range = FieldRange::new(-10.0, 10.0).widened([1.0, 2.0]);
        assert_eq!(range, FieldRange::new(-10.0, 10.0));

        let range = FieldRange::new(0.0, 1.0).widened([-2.0, 4.0]);
        assert_eq!(range, FieldRange::new(-2.0, 4.0));
    }

    #[test]
    fn scalar_samples_are_indexed_by_vertex() {
        let vertices = grid_vertices();
        let err = construct_iso_mesh(
            &vertices,
            &[0, 3],
            &[0.0, 1.0],
            FieldRange::new(0.0, 1.0),
            description(),
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::MissingSample { vertex: 3 });
    }

    #[test]
    fn constant_field_is_degenerate() {
        let err = construct_iso_mesh(
            &[0.0; 6],
            &[0, 1],
            &[2.0, 2.0],
            FieldRange::new(2.0, 2.0),
            description(),
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::DegenerateRange { .. }));
    }

    #[test]
    fn vector_glyphs_pair_base_and_tip() {
        let vertices = grid_vertices();
        let values = [1.0, 0.0, 0.0, 2.0, 3.0, 4.0, 0.5, -0.5];

        let geometry = construct_iso_mesh_vector(
            &vertices,
            &values,
            FieldRange::new(0.0, 1.0),
            description(),
        )
        .unwrap();

        assert_eq!(geometry.vertex_count(), 2 * 4);
        let max = 5.0;
        for i in 0..4 {
            let base = geometry.vertices[2 * i];
            let tip = geometry.vertices[2 * i + 1];
            assert_eq!(&base.position[..], &vertices[i * 3..i * 3 + 3]);
            assert!((tip.position[0] - (base.position[0] + values[2 * i] / max)).abs() < EPS);
            assert!((tip.position[1] - (base.position[1] + values[2 * i + 1] / max)).abs() < EPS);
            assert_eq!(tip.position[2], base.position[2]);
            assert_eq!(tip.color, base.color);
        }
    }

    #[test]
    fn vector_hues_use_magnitude() {
        let vertices = [0.0; 6];
        let values = [0.0, 0.0, 3.0, 4.0];
        let geometry =
            construct_iso_mesh_vector(&vertices, &values, FieldRange::new(0.0, 0.0), description())
                .unwrap();

        assert!((geometry.vertices[0].color().hue() - 0.0).abs() < EPS);
        assert!((geometry.vertices[2].color().hue() - VECTOR_HUE_SPAN).abs() < EPS);
    }

    #[test]
    fn vector_field_too_short() {
        let err = construct_iso_mesh_vector(
            &grid_vertices(),
            &[1.0, 1.0],
            FieldRange::new(0.0, 1.0),
            description(),
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::MissingSample { .. }));
    }

    #[test]
    fn scalar_rejects_non_finite_samples() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let err = construct_iso_mesh(
                &[0.0; 9],
                &[0, 1, 2],
                &[0.0, bad, 2.0],
                FieldRange::new(0.0, 2.0),
                description(),
            )
            .unwrap_err();
            assert_eq!(err, GeometryError::NonFiniteSample { vertex: 1 });
        }
    }

    #[test]
    fn vector_rejects_non_finite_samples() {
        let err = construct_iso_mesh_vector(
            &[0.0; 9],
            &[1.0, 0.0, 0.0, 1.0, f32::NAN, 0.5],
            FieldRange::new(0.0, 1.0),
            description(),
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::NonFiniteSample { vertex: 2 });

        let err = construct_iso_mesh_vector(
            &[0.0; 6],
            &[f32::INFINITY, 0.0, 1.0, 1.0],
            FieldRange::new(0.0, 1.0),
            description(),
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::NonFiniteSample { vertex: 0 });
    }

    #[test]
    fn wide_vector_hint_is_kept() {
        let vertices = [0.0, 0.0, 0.0, 1.0, 1.0, 0.0];
        let values = [3.0, 4.0, 0.0, 2.0];

        let geometry = construct_iso_mesh_vector(
            &vertices,
            &values,
            FieldRange::new(0.0, 10.0),
            description(),
        )
        .unwrap();

        let tip = geometry.vertices[1];
        assert!((tip.position[0] - 0.3).abs() < EPS);
        assert!((tip.position[1] - 0.4).abs() < EPS);
        let tip = geometry.vertices[3];
        assert!((tip.position[0] - 1.0).abs() < EPS);
        assert!((tip.position[1] - 1.2).abs() < EPS);

        let first = geometry.vertices[0].color().hue();
        let second = geometry.vertices[2].color().hue();
        assert!((first - VECTOR_HUE_SPAN * 5.0 / 10.0).abs() < EPS);
        assert!((second - VECTOR_HUE_SPAN * 2.0 / 10.0).abs() < EPS);
    }

    #[test]
    fn zero_vector_field_is_degenerate() {
        let err = construct_iso_mesh_vector(
            &[0.0; 6],
            &[0.0; 4],
            FieldRange::new(-1.0, 0.0),
            description(),
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::DegenerateRange { .. }));
    }
}
