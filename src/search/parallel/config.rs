//! Configuration for parallel search execution.

use std::time::Duration;

/// Configuration for parallel search execution.
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of worker threads to spawn.
    pub num_workers: usize,
    /// Whether workers tighten their budgets from the best height found so far.
    pub bound_sharing: bool,
    /// Overall timeout for the parallel search.
    pub timeout: Option<Duration>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            bound_sharing: true,
            timeout: None,
        }
    }
}

impl ParallelConfig {
    /// Create a new parallel config with the specified number of workers.
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    /// Enable or disable budget tightening between workers.
    pub fn with_bound_sharing(mut self, enabled: bool) -> Self {
        self.bound_sharing = enabled;
        self
    }

    /// Set the overall timeout for parallel search.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the overall timeout from an Option.
    pub fn with_timeout_option(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Workers actually worth spawning for `tasks` first-level swaps.
    pub fn effective_workers(&self, tasks: usize) -> usize {
        self.num_workers.min(tasks).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParallelConfig::default();
        assert!(config.num_workers >= 1);
        assert!(config.bound_sharing);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ParallelConfig::default()
            .with_workers(4)
            .with_bound_sharing(false)
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.num_workers, 4);
        assert!(!config.bound_sharing);
        assert_eq!(config.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_minimum_workers() {
        let config = ParallelConfig::default().with_workers(0);
        assert_eq!(config.num_workers, 1);
    }

    #[test]
    fn test_effective_workers() {
        let config = ParallelConfig::default().with_workers(8);
        assert_eq!(config.effective_workers(3), 3);
        assert_eq!(config.effective_workers(28), 8);
        assert_eq!(config.effective_workers(0), 1);
    }
}
