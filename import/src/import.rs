//! Import of a single geometry entry.

use fieldplot_core::compute::CancellationToken;
use fieldplot_core::mesh::{
    construct_geometry, construct_iso_mesh, construct_iso_mesh_vector, ConstructedGeometry,
    FieldRange, Geometry, GeometryDescription, GeometryKind, GeometryRole, MeshId, PlotId,
    PolygonMode, PrimitiveTopology,
};
use fieldplot_core::{GeometryError, LabelTable, ThreadSafeQueue};

use crate::scene::GeometryEntry;

/// What happened to one branch of an import task.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchOutcome {
    /// The entry did not ask for this branch.
    NotRequested,
    /// The geometry was built and pushed to the queue.
    Enqueued { vertex_count: usize },
    /// The geometry was built but intentionally not pushed.
    Built { vertex_count: usize },
    /// Construction failed; nothing was pushed for this branch.
    Failed(GeometryError),
    /// The job was cancelled before this branch started.
    Cancelled,
}

impl BranchOutcome {
    pub fn is_enqueued(&self) -> bool {
        matches!(self, Self::Enqueued { .. })
    }
}

/// Per-branch outcome of one import task.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub plot_id: PlotId,
    pub mesh_id: MeshId,
    /// `None` when the entry named an unknown kind and was skipped.
    pub kind: Option<GeometryKind>,
    pub main: BranchOutcome,
    pub iso: BranchOutcome,
    pub border: BranchOutcome,
}

impl ImportReport {
    fn new(plot_id: PlotId, mesh_id: MeshId, kind: Option<GeometryKind>) -> Self {
        Self {
            plot_id,
            mesh_id,
            kind,
            main: BranchOutcome::NotRequested,
            iso: BranchOutcome::NotRequested,
            border: BranchOutcome::NotRequested,
        }
    }

    /// Number of geometries this task pushed to the queue.
    pub fn enqueued(&self) -> usize {
        [&self.main, &self.iso, &self.border]
            .into_iter()
            .filter(|outcome| outcome.is_enqueued())
            .count()
    }
}

/// Build every geometry one entry describes and push the results to `queue`.
///
/// Runs three independent branches: the main mesh (always attempted), the
/// isovalue overlay when `IsoValues` is set, and the border when `Borders` is
/// set. A failed branch is logged and skipped without affecting the others.
/// Border geometry is built but never pushed. `cancel` is checked before each
/// branch.
pub fn import_geometry(
    entry: &GeometryEntry,
    queue: &ThreadSafeQueue<ConstructedGeometry>,
    plot_id: PlotId,
    cancel: &CancellationToken,
) -> ImportReport {
    let mesh_id = entry.id;
    let Some(kind) = entry.kind() else {
        log::warn!(
            "Skipping geometry {mesh_id} of plot {plot_id}: unknown kind '{}'",
            entry.kind_name
        );
        return ImportReport::new(plot_id, mesh_id, None);
    };

    let mut report = ImportReport::new(plot_id, mesh_id, Some(kind));
    let mut table = LabelTable::new();
    let push = |role: GeometryRole, geometry: Geometry| {
        let vertex_count = geometry.vertex_count();
        queue.push(
            ConstructedGeometry::new(plot_id, mesh_id, role, geometry)
                .with_line_width(entry.line_width),
        );
        BranchOutcome::Enqueued { vertex_count }
    };

    report.main = match cancel.checkpoint() {
        Err(_) => BranchOutcome::Cancelled,
        Ok(()) => {
            let description = GeometryDescription::new(kind)
                .with_topology(kind.main_topology())
                .with_polygon_mode(PolygonMode::Line);
            match construct_geometry(
                &entry.vertices,
                &entry.mesh_indices,
                &entry.mesh_labels,
                &mut table,
                description,
            ) {
                Ok(geometry) => push(GeometryRole::Main, geometry),
                Err(e) => {
                    log::warn!("Failed to import mesh {mesh_id} of plot {plot_id}: {e}");
                    BranchOutcome::Failed(e)
                }
            }
        }
    };

    if entry.iso_values {
        report.iso = match cancel.checkpoint() {
            Err(_) => BranchOutcome::Cancelled,
            Ok(()) => {
                let (role, result) = build_isovalues(entry, kind);
                match result {
                    Ok(geometry) => push(role, geometry),
                    Err(e) => {
                        log::warn!("Skipping isovalues of mesh {mesh_id} of plot {plot_id}: {e}");
                        BranchOutcome::Failed(e)
                    }
                }
            }
        };
    }

    if entry.borders {
        report.border = match cancel.checkpoint() {
            Err(_) => BranchOutcome::Cancelled,
            Ok(()) => {
                let description = GeometryDescription::new(kind)
                    .with_topology(kind.border_topology())
                    .with_polygon_mode(PolygonMode::Line);
                match construct_geometry(
                    &entry.vertices,
                    &entry.border_indices,
                    &entry.border_labels,
                    &mut table,
                    description,
                ) {
                    // Border rendering is disabled downstream: keep the geometry off the queue.
                    Ok(geometry) => BranchOutcome::Built {
                        vertex_count: geometry.vertex_count(),
                    },
                    Err(e) => {
                        log::warn!("Failed to import border of mesh {mesh_id} of plot {plot_id}: {e}");
                        BranchOutcome::Failed(e)
                    }
                }
            }
        };
    }

    log::debug!(
        "Finished geometry {mesh_id} of plot {plot_id} ({kind}): {} enqueued",
        report.enqueued()
    );
    report
}

fn build_isovalues(
    entry: &GeometryEntry,
    kind: GeometryKind,
) -> (GeometryRole, Result<Geometry, GeometryError>) {
    let hint = FieldRange::new(entry.iso_min, entry.iso_max);
    if entry.iso_vector {
        let description = GeometryDescription::new(kind)
            .with_topology(PrimitiveTopology::LineList)
            .with_polygon_mode(PolygonMode::Line);
        (
            GeometryRole::IsoVector,
            construct_iso_mesh_vector(&entry.vertices, &entry.iso_samples, hint, description),
        )
    } else {
        let description = GeometryDescription::new(kind)
            .with_topology(PrimitiveTopology::TriangleList)
            .with_polygon_mode(PolygonMode::Line);
        (
            GeometryRole::IsoScalar,
            construct_iso_mesh(
                &entry.vertices,
                &entry.mesh_indices,
                &entry.iso_samples,
                hint,
                description,
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> GeometryEntry {
        GeometryEntry::new(GeometryKind::Mesh3D, 1).with_mesh(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0, 1, 2],
            vec![5, 5, 5],
        )
    }

    #[test]
    fn main_mesh_is_enqueued_with_kind_topology() {
        let queue = ThreadSafeQueue::new();
        let report = import_geometry(&triangle(), &queue, 4, &CancellationToken::new());

        assert_eq!(report.main, BranchOutcome::Enqueued { vertex_count: 3 });
        assert_eq!(report.iso, BranchOutcome::NotRequested);
        let items = queue.drain();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].plot_id, 4);
        assert_eq!(items[0].mesh_id, 1);
        assert_eq!(items[0].role, GeometryRole::Main);
        let description = items[0].geometry.description;
        assert_eq!(description.topology, PrimitiveTopology::TriangleList);
        assert_eq!(description.polygon_mode, PolygonMode::Line);
    }

    #[test]
    fn border_is_built_but_not_enqueued() {
        let queue = ThreadSafeQueue::new();
        let entry = triangle().with_border(vec![0, 1, 1, 2], vec![5, 5]);

        let report = import_geometry(&entry, &queue, 0, &CancellationToken::new());

        assert_eq!(report.border, BranchOutcome::Built { vertex_count: 4 });
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn degenerate_overlay_is_skipped() {
        let queue = ThreadSafeQueue::new();
        let entry = triangle().with_scalar_field(vec![1.0, 1.0, 1.0], 1.0, 1.0);

        let report = import_geometry(&entry, &queue, 0, &CancellationToken::new());

        assert!(report.main.is_enqueued());
        assert!(matches!(
            report.iso,
            BranchOutcome::Failed(GeometryError::DegenerateRange { .. })
        ));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn nan_sample_skips_overlay() {
        let queue = ThreadSafeQueue::new();
        let entry = triangle().with_scalar_field(vec![0.0, f32::NAN, 2.0], 0.0, 2.0);

        let report = import_geometry(&entry, &queue, 0, &CancellationToken::new());

        assert!(report.main.is_enqueued());
        assert_eq!(
            report.iso,
            BranchOutcome::Failed(GeometryError::NonFiniteSample { vertex: 1 })
        );
        let items = queue.drain();
        assert_eq!(items.len(), 1);
        assert!(items[0]
            .geometry
            .vertices
            .iter()
            .all(|v| v.color.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn unknown_kind_is_skipped() {
        let queue = ThreadSafeQueue::new();
        let mut entry = triangle();
        entry.kind_name = "Surface".to_string();

        let report = import_geometry(&entry, &queue, 0, &CancellationToken::new());

        assert_eq!(report.kind, None);
        assert_eq!(report.enqueued(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn cancelled_task_builds_nothing() {
        let queue = ThreadSafeQueue::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let entry = triangle().with_scalar_field(vec![0.0, 1.0, 2.0], 0.0, 2.0);

        let report = import_geometry(&entry, &queue, 0, &cancel);

        assert_eq!(report.main, BranchOutcome::Cancelled);
        assert_eq!(report.iso, BranchOutcome::Cancelled);
        assert!(queue.is_empty());
    }
}
