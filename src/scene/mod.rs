//! Scene layout consumed by the render graph
//!
//! A [`SceneLayout`] is the ordered list of batched objects a
//! [`RenderGraph`](crate::render_graph::RenderGraph) builds one node for.
//! It is usually assembled from the geometries an import pushed to its queue.

mod camera;

pub use camera::*;

use std::collections::HashMap;

use fieldplot_core::mesh::{
    ConstructedGeometry, Dimension, GeometryKind, GeometryRole, MeshBatch, MeshId, PlotId,
    PolygonMode,
};
use fieldplot_core::ThreadSafeQueue;

/// One batched object of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub plot_id: PlotId,
    pub mesh_id: MeshId,
    pub role: GeometryRole,
    pub kind: GeometryKind,
    pub polygon_mode: PolygonMode,
    /// Requested line width; the graph default applies when `None`.
    pub line_width: Option<f32>,
    pub batch: MeshBatch,
}

impl SceneObject {
    pub fn new(kind: GeometryKind, batch: MeshBatch) -> Self {
        Self {
            plot_id: 0,
            mesh_id: 0,
            role: GeometryRole::Main,
            kind,
            polygon_mode: PolygonMode::Line,
            line_width: None,
            batch,
        }
    }

    pub fn with_ids(mut self, plot_id: PlotId, mesh_id: MeshId, role: GeometryRole) -> Self {
        self.plot_id = plot_id;
        self.mesh_id = mesh_id;
        self.role = role;
        self
    }

    pub fn with_polygon_mode(mut self, polygon_mode: PolygonMode) -> Self {
        self.polygon_mode = polygon_mode;
        self
    }

    pub fn with_line_width(mut self, line_width: f32) -> Self {
        self.line_width = Some(line_width);
        self
    }

    pub fn dimension(&self) -> Dimension {
        self.batch.dimension()
    }
}

/// Ordered collection of scene objects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneLayout {
    objects: Vec<SceneObject>,
}

impl SceneLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, object: SceneObject) -> Self {
        self.objects.push(object);
        self
    }

    pub fn push(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    /// Group constructed geometries into one object per (plot, mesh, role).
    ///
    /// Objects keep the order in which their first geometry arrived. Empty
    /// geometries are skipped.
    pub fn from_constructed(items: impl IntoIterator<Item = ConstructedGeometry>) -> Self {
        let mut layout = Self::new();
        let mut slots: HashMap<(PlotId, MeshId, GeometryRole), usize> = HashMap::new();

        for item in items {
            if item.geometry.is_empty() {
                log::debug!(
                    "Skipping empty {:?} geometry of mesh {} in plot {}",
                    item.role,
                    item.mesh_id,
                    item.plot_id
                );
                continue;
            }

            let key = (item.plot_id, item.mesh_id, item.role);
            match slots.get(&key).copied() {
                Some(slot) => layout.objects[slot].batch.push(&item.geometry.vertices),
                None => {
                    let description = item.geometry.description;
                    slots.insert(key, layout.objects.len());
                    layout.objects.push(SceneObject {
                        plot_id: item.plot_id,
                        mesh_id: item.mesh_id,
                        role: item.role,
                        kind: description.kind,
                        polygon_mode: description.polygon_mode,
                        line_width: item.line_width,
                        batch: MeshBatch::from_geometry(&item.geometry),
                    });
                }
            }
        }

        layout
    }

    /// Drain `queue` and group what it held.
    pub fn from_queue(queue: &ThreadSafeQueue<ConstructedGeometry>) -> Self {
        Self::from_constructed(queue.drain())
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
