//! Progress reporting for long searches.

use crate::network::Swap;

/// Snapshot handed to the progress hook.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// Search calls so far (wraps on overflow).
    pub iterations: u64,
    /// Entries in the explored-state table.
    pub explored_states: usize,
    /// Current recursion depth, prefix included.
    pub depth: usize,
    /// Swaps on the current path, prefix included.
    pub path: &'a [Swap],
    /// Estimated share of the search tree already covered, in percent.
    pub percent_done: f64,
}

/// Callback invoked every `progress_interval` iterations.
pub type ProgressHook = Box<dyn FnMut(&Progress<'_>) + Send>;

/// Estimates how much of the uniform search tree lies to the left of the
/// current path.
///
/// Each path position after the prefix contributes the pairs ordered before
/// its swap, weighted by the share of the tree one pair covers at that level.
pub fn estimate_percent(path: &[Swap], prefix_len: usize, arity: usize) -> f64 {
    let total_pairs = Swap::pair_count(arity);
    if total_pairs == 0 {
        return 0.0;
    }
    let pair_share = 1.0 / total_pairs as f64;
    let mut done = 0.0;
    for (level, swap) in path.iter().enumerate().skip(prefix_len) {
        let done_pairs = swap.index(arity) as f64;
        done += done_pairs * pair_share.powi((level - prefix_len + 1) as i32);
    }
    (done * 100.0 * 10_000.0).round() / 10_000.0
}
