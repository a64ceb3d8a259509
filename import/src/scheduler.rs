//! Concurrent scene import.

use std::sync::Arc;

use fieldplot_core::compute::CancellationToken;
use fieldplot_core::mesh::{ConstructedGeometry, PlotId};
use fieldplot_core::ThreadSafeQueue;

use crate::config::ImportConfig;
use crate::error::ImportResult;
use crate::handle::TaskHandle;
use crate::import::{import_geometry, ImportReport};
use crate::scene::{GeometryEntry, SceneDocument};

/// Runs scene imports on a bounded pool of worker threads.
///
/// Each geometry entry of a payload becomes one blocking task on a dedicated
/// tokio runtime. At most [`ImportConfig::max_workers`] tasks run at once;
/// the rest wait in the runtime's queue.
///
/// # Example
///
/// ```ignore
/// let scheduler = ImportScheduler::new(ImportConfig::default())?;
/// let queue = Arc::new(ThreadSafeQueue::new());
/// let job = scheduler.import(&payload, Arc::clone(&queue))?;
/// for report in job.join() {
///     log::info!("{:?}", report?);
/// }
/// let geometries = queue.drain();
/// ```
pub struct ImportScheduler {
    runtime: tokio::runtime::Runtime,
    config: ImportConfig,
}

impl ImportScheduler {
    pub fn new(config: ImportConfig) -> ImportResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(config.max_workers.max(1))
            .thread_name(config.thread_name.clone())
            .build()?;

        log::info!(
            "Import scheduler started with {} workers",
            config.max_workers
        );

        Ok(Self { runtime, config })
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Decode `payload` and submit one task per geometry entry.
    ///
    /// Returns as soon as every task is submitted. A payload that fails to
    /// decode submits nothing. Results land in `queue` as tasks finish.
    pub fn import(
        &self,
        payload: &[u8],
        queue: Arc<ThreadSafeQueue<ConstructedGeometry>>,
    ) -> ImportResult<ImportJob> {
        let document = SceneDocument::decode(payload)?;
        Ok(self.import_document(document, queue))
    }

    /// Submit one task per entry of an already decoded document.
    pub fn import_document(
        &self,
        document: SceneDocument,
        queue: Arc<ThreadSafeQueue<ConstructedGeometry>>,
    ) -> ImportJob {
        let plot_id = document.plot;
        let cancel = CancellationToken::new();

        log::info!(
            "Importing plot {plot_id}: {} geometries",
            document.geometry.len()
        );

        let tasks = document
            .geometry
            .into_iter()
            .map(|entry| self.spawn(entry, Arc::clone(&queue), plot_id, cancel.clone()))
            .collect();

        ImportJob {
            plot_id,
            tasks,
            cancel,
        }
    }

    fn spawn(
        &self,
        entry: GeometryEntry,
        queue: Arc<ThreadSafeQueue<ConstructedGeometry>>,
        plot_id: PlotId,
        cancel: CancellationToken,
    ) -> TaskHandle<ImportReport> {
        let (sender, receiver) = std::sync::mpsc::channel();
        let mesh_id = entry.id;

        self.runtime.spawn_blocking(move || {
            log::debug!("Import task started: plot {plot_id}, mesh {mesh_id}");
            let report = import_geometry(&entry, &queue, plot_id, &cancel);
            let _ = sender.send(report);
        });

        TaskHandle::new(mesh_id, receiver)
    }
}

impl std::fmt::Debug for ImportScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportScheduler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Tasks submitted for one payload.
///
/// Dropping a job without joining detaches its tasks: they still run to
/// completion and push their results to the queue.
#[derive(Debug)]
pub struct ImportJob {
    plot_id: PlotId,
    tasks: Vec<TaskHandle<ImportReport>>,
    cancel: CancellationToken,
}

impl ImportJob {
    pub fn plot_id(&self) -> PlotId {
        self.plot_id
    }

    /// Number of tasks not yet collected.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_done(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Ask every task to stop before its next branch.
    pub fn cancel(&self) {
        log::info!("Cancelling import of plot {}", self.plot_id);
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Collect the results of tasks that have finished, without blocking.
    pub fn try_collect(&mut self) -> Vec<ImportResult<ImportReport>> {
        let mut finished = Vec::new();
        self.tasks.retain(|task| match task.try_recv() {
            Ok(None) => true,
            Ok(Some(report)) => {
                finished.push(Ok(report));
                false
            }
            Err(e) => {
                finished.push(Err(e));
                false
            }
        });
        finished
    }

    /// Block until every task finishes. Results follow submission order.
    pub fn join(self) -> Vec<ImportResult<ImportReport>> {
        let reports: Vec<_> = self.tasks.into_iter().map(TaskHandle::recv).collect();
        let failed = reports.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            log::warn!("{failed} import tasks of plot {} were lost", self.plot_id);
        }
        reports
    }
}

