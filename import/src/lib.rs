//! # fieldplot import
//!
//! Decodes CBOR scene payloads and builds their geometries concurrently.
//!
//! - [`SceneDocument`] / [`GeometryEntry`] - The decoded payload
//! - [`import_geometry`] - Builds up to three geometries for one entry
//! - [`ImportScheduler`] - Runs one task per entry on a bounded worker pool
//! - [`ImportJob`] - Joinable, cancellable set of tasks for one payload

mod config;
mod error;
mod handle;
mod import;
mod scene;
mod scheduler;

pub use config::{ImportConfig, DEFAULT_THREAD_NAME};
pub use error::{ImportError, ImportResult};
pub use handle::TaskHandle;
pub use import::{import_geometry, BranchOutcome, ImportReport};
pub use scene::{GeometryEntry, SceneDocument};
pub use scheduler::{ImportJob, ImportScheduler};
