//! Search result types and statistics

use crate::network::Network;
use crate::search::config::Algorithm;
use std::time::Duration;

/// Result of a search operation
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Whether a network within the budget was found
    pub success: bool,
    /// The shortest network found, prefix included
    pub network: Option<Network>,
    /// Length of the mandatory prefix
    pub prefix_len: usize,
    /// Swaps added after the prefix (0 on failure)
    pub height: usize,
    /// On failure, the number of swaps after the prefix proven insufficient
    pub failure_height: usize,
    /// Statistics from the search
    pub statistics: SearchStatistics,
}

impl SearchResult {
    /// Create a result for a network found within the budget
    pub fn found(network: Network, prefix_len: usize, statistics: SearchStatistics) -> Self {
        let height = network.len().saturating_sub(prefix_len);
        Self {
            success: true,
            network: Some(network),
            prefix_len,
            height,
            failure_height: 0,
            statistics,
        }
    }

    /// Create a result for an exhausted budget
    pub fn exhausted(prefix_len: usize, failure_height: usize, statistics: SearchStatistics) -> Self {
        Self {
            success: false,
            network: None,
            prefix_len,
            height: 0,
            failure_height,
            statistics,
        }
    }

    /// Fewest swaps after the prefix that could still succeed, when the
    /// search failed.
    pub fn min_swaps_lower_bound(&self) -> Option<usize> {
        (!self.success).then_some(self.failure_height + 1)
    }

    /// Total length of the found network, prefix included
    pub fn total_swaps(&self) -> Option<usize> {
        self.network.as_ref().map(Network::len)
    }
}

/// Statistics from a search operation
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    /// Algorithm used for the search
    pub algorithm: Algorithm,
    /// Reachability-set backend
    pub backend: &'static str,
    /// Total time spent searching
    pub elapsed_time: Duration,
    /// Number of recursive search calls (wraps on overflow)
    pub iterations: u64,
    /// Lookups that found an entry in the explored-state table
    pub memo_hits: u64,
    /// Lookups whose entry cut the branch off
    pub memo_prunes: u64,
    /// Candidate swaps skipped because they would not move any pattern
    pub idle_swaps_skipped: u64,
    /// Entries in the explored-state table at the end of the run
    pub explored_states: usize,
    /// Solved entries among them
    pub solved_states: usize,
    /// Unsolvable entries among them
    pub unsolvable_states: usize,
    /// Progress reports emitted
    pub progress_reports: u64,
}

impl SearchStatistics {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Default::default()
        }
    }

    /// Share of recursive calls answered by the explored-state table
    pub fn memo_hit_rate(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.memo_hits as f64 / self.iterations as f64
        }
    }

    /// Get recursive calls per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.iterations as f64 / secs
        }
    }

    /// Fold another run's counters into this one
    pub fn merge(&mut self, other: &SearchStatistics) {
        self.iterations = self.iterations.wrapping_add(other.iterations);
        self.memo_hits = self.memo_hits.wrapping_add(other.memo_hits);
        self.memo_prunes = self.memo_prunes.wrapping_add(other.memo_prunes);
        self.idle_swaps_skipped = self
            .idle_swaps_skipped
            .wrapping_add(other.idle_swaps_skipped);
        self.explored_states += other.explored_states;
        self.solved_states += other.solved_states;
        self.unsolvable_states += other.unsolvable_states;
        self.progress_reports = self.progress_reports.wrapping_add(other.progress_reports);
        if self.backend.is_empty() {
            self.backend = other.backend;
        }
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Algorithm: {}\n", self.algorithm));
        if !self.backend.is_empty() {
            s.push_str(&format!("Backend: {}\n", self.backend));
        }
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed_time));
        s.push_str(&format!("Iterations: {}\n", self.iterations));
        s.push_str(&format!(
            "Throughput: {:.0} iterations/sec\n",
            self.throughput()
        ));
        s.push_str(&format!(
            "Explored states: {} ({} solved, {} unsolvable)\n",
            self.explored_states, self.solved_states, self.unsolvable_states
        ));
        if self.memo_hits > 0 {
            s.push_str(&format!(
                "Memo hit rate: {:.2}% ({} pruned)\n",
                self.memo_hit_rate() * 100.0,
                self.memo_prunes
            ));
        }
        if self.idle_swaps_skipped > 0 {
            s.push_str(&format!(
                "Idle swaps skipped: {}\n",
                self.idle_swaps_skipped
            ));
        }
        s
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_summary())
    }
}

impl std::fmt::Display for SearchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let (true, Some(network)) = (self.success, &self.network) {
            writeln!(
                f,
                "Network found: {} swaps ({} prefix + {} searched)",
                network.len(),
                self.prefix_len,
                self.height
            )?;
            for (idx, swap) in network.iter().enumerate() {
                let marker = if idx < self.prefix_len { " (prefix)" } else { "" };
                writeln!(f, "  {:>2}: {}{}", idx, swap, marker)?;
            }
        } else {
            writeln!(f, "No network found.")?;
            writeln!(
                f,
                "No solution within {} swaps after the prefix (at least {} needed)",
                self.failure_height,
                self.failure_height + 1
            )?;
        }
        Ok(())
    }
}
