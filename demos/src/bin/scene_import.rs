//! # Scene Import Demo
//!
//! Imports a CBOR scene payload on the worker pool, groups the queued
//! geometry into a scene layout and drives a render graph through
//! construct, reload and destroy on the dummy backend.
//!
//! ```text
//! scene_import --generate scene.cbor --meshes 12
//! scene_import scene.cbor --workers 4
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use fieldplot::{Camera, DummyBackend, RenderGraph, SceneLayout, ShaderSet};
use fieldplot_core::ThreadSafeQueue;
use fieldplot_demos::sample_scene;
use fieldplot_import::{ImportConfig, ImportScheduler};

#[derive(Parser, Debug)]
#[command(name = "scene_import", version, about = "Import a CBOR scene and build its render graph")]
struct Args {
    /// Scene payload to import
    payload: PathBuf,

    /// Write a generated sample scene to the payload path first
    #[arg(long)]
    generate: bool,

    /// Meshes in the generated scene
    #[arg(long, default_value_t = 6)]
    meshes: u16,

    /// Maximum concurrent import tasks
    #[arg(long)]
    workers: Option<usize>,

    /// Log level filter (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.generate {
        let payload = sample_scene(1, args.meshes).encode()?;
        std::fs::write(&args.payload, &payload)?;
        log::info!(
            "Wrote {} byte sample scene to {}",
            payload.len(),
            args.payload.display()
        );
    }

    let payload = std::fs::read(&args.payload)?;

    let mut config = ImportConfig::default();
    if let Some(workers) = args.workers {
        config = config.with_max_workers(workers);
    }
    let scheduler = ImportScheduler::new(config)?;
    let queue = Arc::new(ThreadSafeQueue::new());

    let job = scheduler.import(&payload, Arc::clone(&queue))?;
    let plot_id = job.plot_id();
    let mut enqueued = 0;
    for result in job.join() {
        let report = result?;
        enqueued += report.enqueued();
        log::debug!(
            "mesh {}: main {:?}, iso {:?}, border {:?}",
            report.mesh_id,
            report.main,
            report.iso,
            report.border
        );
    }
    log::info!("Plot {plot_id}: {enqueued} geometries queued");

    let layout = SceneLayout::from_queue(&queue);
    let mut backend = DummyBackend::new();
    let shaders = ShaderSet::dummy();

    let mut graph = RenderGraph::construct(&mut backend, &layout, &shaders)?;
    log::info!(
        "{} of {} nodes renderable, {:?} camera",
        graph.renderable_nodes().count(),
        graph.nodes().len(),
        graph.camera_kind()
    );

    let mut camera = Camera::for_kind(graph.camera_kind());
    camera.set_aspect(1280.0, 720.0);
    graph.update_camera(camera.view_projection_matrix());

    for index in 0..graph.nodes().len() {
        graph.upload_node(&mut backend, index)?;
    }

    graph.mark_all_dirty();
    let rebuilt = graph.reload(&mut backend, &shaders);
    log::info!("Reload rebuilt {rebuilt} pipelines");

    graph.destroy(&mut backend);
    log::info!("Backend calls: {:?}", backend.stats());
    Ok(())
}
