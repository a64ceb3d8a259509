use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Error returned when a task is cancelled at a checkpoint.
///
/// Import tasks call [`CancellationToken::checkpoint`] between independent
/// branches and propagate this error with `?` to stop early.
///
/// # Example
///
/// ```
/// use fieldplot_core::compute::{CancellationToken, Cancelled};
///
/// fn work(token: &CancellationToken) -> Result<u32, Cancelled> {
///     token.checkpoint()?;
///     Ok(42)
/// }
///
/// let token = CancellationToken::new();
/// assert_eq!(work(&token), Ok(42));
/// token.cancel();
/// assert_eq!(work(&token), Err(Cancelled));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("task cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Token that signals cancellation to cooperative tasks.
///
/// Cloning a token creates another handle to the same cancellation flag.
/// Calling [`cancel()`](CancellationToken::cancel) on any clone affects all.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new cancellation token (not cancelled).
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signals cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Returns `Err(Cancelled)` once cancellation has been signalled.
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_passes_until_cancelled() {
        let token = CancellationToken::new();
        assert_eq!(token.checkpoint(), Ok(()));
        token.cancel();
        assert_eq!(token.checkpoint(), Err(Cancelled));
    }

    #[test]
    fn cancellation_token_clone_shares_state() {
        let token1 = CancellationToken::new();
        let token2 = token1.clone();

        assert!(!token1.is_cancelled());
        assert!(!token2.is_cancelled());

        token2.cancel();

        assert!(token1.is_cancelled());
        assert!(token2.is_cancelled());
    }

    #[test]
    fn cancelled_display() {
        assert_eq!(Cancelled.to_string(), "task cancelled");
    }
}
