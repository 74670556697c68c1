//! Configuration types for network search

use crate::network::Network;
use std::time::Duration;

/// Search driver selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Single-threaded depth-first branch and bound
    #[default]
    Sequential,
    /// First-level swaps split across worker threads
    Parallel,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Sequential => write!(f, "sequential"),
            Algorithm::Parallel => write!(f, "parallel"),
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "seq" | "dfs" => Ok(Algorithm::Sequential),
            "parallel" | "par" => Ok(Algorithm::Parallel),
            _ => Err(format!(
                "Unknown algorithm: '{}'. Valid options: sequential, parallel",
                s
            )),
        }
    }
}

/// Iterations between progress reports when none is configured.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 0xFF_FFFF;

/// Main search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Search driver to use
    pub algorithm: Algorithm,
    /// Total swap budget, prefix included
    pub max_swaps: usize,
    /// Swaps every candidate network must start with
    pub prefix: Network,
    /// Iterations between progress reports (0 disables them)
    pub progress_interval: u64,
    /// Abort once the explored-state table holds this many entries
    pub memo_limit: Option<usize>,
    /// Overall timeout. The sequential finder polls it between calls; the
    /// parallel coordinator owns it and stops every worker once it passes.
    pub timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            max_swaps: 19,
            prefix: Network::new(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            memo_limit: None,
            timeout: None,
        }
    }
}

impl SearchConfig {
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_max_swaps(mut self, max_swaps: usize) -> Self {
        self.max_swaps = max_swaps;
        self
    }

    pub fn with_prefix(mut self, prefix: Network) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_memo_limit(mut self, limit: usize) -> Self {
        self.memo_limit = Some(limit);
        self
    }

    pub fn with_memo_limit_option(mut self, limit: Option<usize>) -> Self {
        self.memo_limit = limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_timeout_option(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Swaps the search may add after the prefix.
    pub fn free_swaps(&self) -> usize {
        self.max_swaps.saturating_sub(self.prefix.len())
    }
}
