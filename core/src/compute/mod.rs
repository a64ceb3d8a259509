//! Cooperative task primitives.
//!
//! - [`CancellationToken`] - Shared flag checked by long-running tasks
//! - [`Cancelled`] - Error returned at a checkpoint after cancellation

mod cancellation;

pub use cancellation::{CancellationToken, Cancelled};
