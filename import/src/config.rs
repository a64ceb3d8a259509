//! Import scheduler configuration.

/// Default name prefix of import worker threads.
pub const DEFAULT_THREAD_NAME: &str = "fieldplot-import";

/// Configuration of an [`ImportScheduler`](crate::ImportScheduler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Maximum number of import tasks running at once.
    pub max_workers: usize,
    /// Name given to worker threads.
    pub thread_name: String,
}

impl ImportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker cap. Zero is raised to one.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_workers() {
        let config = ImportConfig::default();
        assert!(config.max_workers >= 1);
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn zero_workers_is_clamped() {
        assert_eq!(ImportConfig::new().with_max_workers(0).max_workers, 1);
    }
}
