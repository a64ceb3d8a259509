//! # Fieldplot Demos
//!
//! ## Available Demos
//!
//! - `scene_import` - Import a CBOR scene, build its render graph on the
//!   dummy backend, reload and tear it down

use fieldplot_core::mesh::{GeometryKind, MeshId, PlotId};
use fieldplot_import::{GeometryEntry, SceneDocument};

/// Demos library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A plot of `meshes` labelled triangle fans, alternating plain, scalar and
/// vector overlays so every import branch runs.
pub fn sample_scene(plot: PlotId, meshes: u16) -> SceneDocument {
    (0..meshes).fold(SceneDocument::new(plot), |document, id| {
        document.with_entry(sample_entry(id))
    })
}

fn sample_entry(id: MeshId) -> GeometryEntry {
    const SEGMENTS: u32 = 8;
    let offset = id as f32 * 2.5;

    // Center vertex followed by a ring
    let mut vertices = vec![offset, 0.0, 0.0];
    for i in 0..SEGMENTS {
        let angle = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
        vertices.extend_from_slice(&[offset + angle.cos(), angle.sin(), 0.0]);
    }

    let mut indices = Vec::new();
    let mut labels = Vec::new();
    for i in 0..SEGMENTS {
        indices.extend_from_slice(&[0, 1 + i, 1 + (i + 1) % SEGMENTS]);
        labels.push((i % 3) as i32);
    }
    let border: Vec<u32> = (0..SEGMENTS)
        .flat_map(|i| [1 + i, 1 + (i + 1) % SEGMENTS])
        .collect();

    let vertex_count = vertices.len() / 3;
    let entry = GeometryEntry::new(GeometryKind::Mesh3D, id)
        .with_mesh(vertices.clone(), indices, labels)
        .with_border(border, vec![0; SEGMENTS as usize]);

    match id % 3 {
        0 => entry,
        1 => {
            let samples = vertices.chunks_exact(3).map(|v| v[0] - offset).collect();
            entry.with_scalar_field(samples, -1.0, 1.0)
        }
        _ => {
            let samples = (0..vertex_count)
                .flat_map(|i| [vertices[i * 3 + 1], offset - vertices[i * 3]])
                .collect();
            entry.with_vector_field(samples, 0.0, 1.0).with_line_width(2.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_scene_has_requested_entries() {
        let document = sample_scene(3, 5);
        assert_eq!(document.plot, 3);
        assert_eq!(document.geometry.len(), 5);
        assert!(document.geometry[1].iso_values);
        assert!(document.geometry[2].iso_vector);
        assert_eq!(document.geometry[2].iso_samples.len(), 18);
    }
}
