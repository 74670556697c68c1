//! Memoized branch-and-bound search for the shortest compare-exchange
//! network that makes every reachable pattern pass the goal test.
//!
//! The search state is the reachability set itself, so two different swap
//! sequences that reach the same set share one memo entry. From each state
//! every pair `(i, j)` is tried in lexicographic order. Once a child solves
//! in `h` swaps the bound is tightened so the remaining siblings can only
//! report strictly shorter continuations, and the state is recorded as
//! `Solved` with the best height, or `Unsolvable` within the budget left.

use crate::bits::{BitSet, ReachSet};
use crate::error::SearchError;
use crate::network::{Network, Swap};
use crate::search::config::{Algorithm, SearchConfig};
use crate::search::memo::{Explored, ExploredTable};
use crate::search::progress::{estimate_percent, Progress, ProgressHook};
use crate::search::result::{SearchResult, SearchStatistics};
use crate::search::SearchAlgorithm;
use crate::semantics::{MaskFactory, SwapTransform};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Largest arity any backend is asked to handle; patterns are `u32`.
pub const MAX_ARITY: usize = 24;

/// Outcome of one `find_swaps` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The goal is reachable in `height` more swaps. `first` is `None` only
    /// when the state already passes the goal test.
    Found { height: usize, first: Option<Swap> },
    /// No continuation fits in the bound.
    Exhausted,
}

/// Depth-first network finder over reachability sets of backend `B`.
pub struct NetFinder<B: BitSet = ReachSet> {
    transform: SwapTransform<B>,
    config: SearchConfig,
    pairs: Vec<Swap>,
    memo: ExploredTable<B>,
    /// One reusable child buffer per depth.
    scratch: Vec<Option<B>>,
    path: Vec<Swap>,
    prefix_len: usize,
    stats: SearchStatistics,
    since_report: u64,
    progress: Option<ProgressHook>,
    stop: Option<Arc<AtomicBool>>,
    deadline: Option<Instant>,
}

/// Checks that `arity` fits both the pattern type and the backend.
pub fn check_arity<B: BitSet>(arity: usize) -> Result<(), SearchError> {
    let max = MAX_ARITY.min(B::MAX_LEN.trailing_zeros() as usize);
    if arity == 0 || arity > max {
        return Err(SearchError::UnsupportedArity { arity, max });
    }
    Ok(())
}

impl<B: BitSet> NetFinder<B> {
    /// Creates a finder for `arity` inputs that must avoid every pattern in
    /// `template`.
    pub fn new(arity: usize, template: B, config: SearchConfig) -> Result<Self, SearchError> {
        check_arity::<B>(arity)?;
        Self::with_masks(Arc::new(MaskFactory::new(arity)), template, config)
    }

    /// Creates a finder that shares an existing mask table.
    pub fn with_masks(
        masks: Arc<MaskFactory<B>>,
        template: B,
        config: SearchConfig,
    ) -> Result<Self, SearchError> {
        let arity = masks.arity();
        if template.len() != masks.domain_size() {
            return Err(SearchError::TemplateWidth {
                expected: masks.domain_size(),
                actual: template.len(),
            });
        }
        validate_prefix(&config.prefix, arity)?;

        let mut stats = SearchStatistics::new(Algorithm::Sequential);
        stats.backend = B::BACKEND;
        Ok(Self {
            transform: SwapTransform::new(masks, template),
            pairs: Swap::pairs(arity).collect(),
            memo: ExploredTable::new(config.memo_limit),
            scratch: Vec::new(),
            path: Vec::new(),
            prefix_len: config.prefix.len(),
            stats,
            since_report: 0,
            progress: None,
            stop: None,
            deadline: None,
            config,
        })
    }

    /// Installs a callback run every `progress_interval` iterations.
    pub fn with_progress(mut self, hook: ProgressHook) -> Self {
        self.progress = Some(hook);
        self
    }

    /// Installs a flag that aborts the search with `SearchError::Aborted`
    /// once raised. The configured timeout aborts the same way.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn arity(&self) -> usize {
        self.transform.arity()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn memo(&self) -> &ExploredTable<B> {
        &self.memo
    }

    pub fn transform(&self) -> &SwapTransform<B> {
        &self.transform
    }

    /// Reachability set after applying `prefix` to the full set.
    pub fn root_state(&mut self, prefix: &Network) -> B {
        let mut root = self.transform.full_set();
        for &swap in prefix {
            self.transform.compare_swap(&mut root, swap);
        }
        root
    }

    /// Runs the configured search from scratch: clears the memo table and
    /// statistics, then searches from the configured prefix.
    pub fn find_best(&mut self) -> Result<SearchResult, SearchError> {
        self.memo.clear();
        self.stats = SearchStatistics::new(Algorithm::Sequential);
        self.stats.backend = B::BACKEND;
        let prefix = self.config.prefix.clone();
        let max_swaps = self.config.max_swaps;
        self.search_from(&prefix, max_swaps)
    }

    /// Searches for the shortest continuation of `prefix` with at most
    /// `max_swaps` swaps in total. The memo table is kept, so repeated
    /// calls on one finder reuse everything learned so far.
    pub fn search_from(
        &mut self,
        prefix: &Network,
        max_swaps: usize,
    ) -> Result<SearchResult, SearchError> {
        validate_prefix(prefix, self.arity())?;
        let start = Instant::now();
        self.deadline = self.config.timeout.map(|timeout| start + timeout);
        let root = self.root_state(prefix);
        self.prefix_len = prefix.len();
        self.path.clear();
        self.path.extend(prefix.iter().copied());
        self.since_report = 0;

        debug!(
            arity = self.arity(),
            prefix = %prefix,
            max_swaps,
            backend = B::BACKEND,
            "starting network search"
        );

        let outcome = self.find_swaps(&root, prefix.len(), max_swaps);
        self.stats.elapsed_time += start.elapsed();
        self.refresh_table_stats();
        let outcome = outcome?;

        let result = match outcome {
            Outcome::Found { first, .. } => {
                let network = self.reconstruct(root, prefix, first)?;
                SearchResult::found(network, prefix.len(), self.stats.clone())
            }
            Outcome::Exhausted => {
                let proven = match self.memo.get(&root) {
                    Some(Explored::Unsolvable { within }) => within,
                    _ => max_swaps.saturating_sub(prefix.len()),
                };
                SearchResult::exhausted(prefix.len(), proven, self.stats.clone())
            }
        };

        info!(
            success = result.success,
            swaps = result.total_swaps().unwrap_or(0),
            iterations = self.stats.iterations,
            explored = self.memo.len(),
            "network search finished"
        );
        Ok(result)
    }

    /// Branch-and-bound step: is the goal reachable from `reach`, which sits
    /// at `depth` swaps, using at most `bound` swaps in total?
    ///
    /// The path recorded for depths below `depth` must be current; it is used
    /// to skip repeating the previous swap and for progress reports.
    pub fn find_swaps(
        &mut self,
        reach: &B,
        depth: usize,
        bound: usize,
    ) -> Result<Outcome, SearchError> {
        self.stats.iterations = self.stats.iterations.wrapping_add(1);
        self.tick(depth)?;

        if depth > bound {
            return Ok(Outcome::Exhausted);
        }

        if let Some(entry) = self.memo.get(reach) {
            self.stats.memo_hits = self.stats.memo_hits.wrapping_add(1);
            match entry {
                Explored::Solved { height, first } => {
                    if depth + height > bound {
                        self.stats.memo_prunes = self.stats.memo_prunes.wrapping_add(1);
                        return Ok(Outcome::Exhausted);
                    }
                    return Ok(Outcome::Found {
                        height,
                        first: Some(first),
                    });
                }
                Explored::Unsolvable { within } => {
                    if within >= bound - depth {
                        self.stats.memo_prunes = self.stats.memo_prunes.wrapping_add(1);
                        return Ok(Outcome::Exhausted);
                    }
                }
            }
        }

        if self.transform.is_allowed(reach) {
            return Ok(Outcome::Found {
                height: 0,
                first: None,
            });
        }

        if depth == bound {
            return Ok(Outcome::Exhausted);
        }

        let previous = depth.checked_sub(1).and_then(|d| self.path.get(d).copied());
        let mut child = self.take_scratch(depth);
        let mut bound_left = bound;
        let mut best: Option<(usize, Swap)> = None;

        for idx in 0..self.pairs.len() {
            let swap = self.pairs[idx];
            if Some(swap) == previous {
                continue;
            }
            if !self.transform.will_change(reach, swap) {
                self.stats.idle_swaps_skipped = self.stats.idle_swaps_skipped.wrapping_add(1);
                continue;
            }

            child.copy_from(reach);
            self.transform.compare_swap(&mut child, swap);
            self.path.truncate(depth);
            self.path.push(swap);

            let outcome = self.find_swaps(&child, depth + 1, bound_left)?;
            if let Outcome::Found { height, .. } = outcome {
                let total = height + 1;
                if best.map_or(true, |(h, _)| total < h) {
                    best = Some((total, swap));
                }
                if height == 0 {
                    break;
                }
                bound_left = depth + height;
            }
        }

        self.path.truncate(depth);
        self.scratch[depth] = Some(child);

        match best {
            Some((height, first)) => {
                self.memo.record_success(reach, height, first)?;
                Ok(Outcome::Found {
                    height,
                    first: Some(first),
                })
            }
            None => {
                self.memo.record_failure(reach, bound - depth)?;
                Ok(Outcome::Exhausted)
            }
        }
    }

    /// Rebuilds the network by following solved entries from the root.
    fn reconstruct(
        &mut self,
        root: B,
        prefix: &Network,
        first: Option<Swap>,
    ) -> Result<Network, SearchError> {
        let mut network = prefix.clone();
        let mut state = root;
        let mut next = first;
        while let Some(swap) = next {
            network.push(swap);
            self.transform.compare_swap(&mut state, swap);
            if self.transform.is_allowed(&state) {
                break;
            }
            next = match self.memo.get(&state) {
                Some(Explored::Solved { first, .. }) => Some(first),
                _ => {
                    return Err(SearchError::Reconstruction {
                        depth: network.len(),
                    })
                }
            };
        }
        debug!(network = %network, "reconstructed network");
        Ok(network)
    }

    fn take_scratch(&mut self, depth: usize) -> B {
        if self.scratch.len() <= depth {
            self.scratch.resize_with(depth + 1, || None);
        }
        let domain = self.transform.masks().domain_size();
        self.scratch[depth]
            .take()
            .unwrap_or_else(|| B::zeros(domain))
    }

    fn tick(&mut self, depth: usize) -> Result<(), SearchError> {
        if let Some(stop) = &self.stop {
            if stop.load(Ordering::Relaxed) {
                return Err(SearchError::Aborted);
            }
        }
        if let Some(deadline) = self.deadline {
            if self.stats.iterations & 0xFFF == 0 && Instant::now() >= deadline {
                return Err(SearchError::Aborted);
            }
        }
        let interval = self.config.progress_interval;
        if interval == 0 {
            return Ok(());
        }
        self.since_report += 1;
        if self.since_report >= interval {
            self.since_report = 0;
            self.report_progress(depth);
        }
        Ok(())
    }

    fn report_progress(&mut self, depth: usize) {
        self.stats.progress_reports = self.stats.progress_reports.wrapping_add(1);
        let path_len = depth.min(self.path.len());
        let progress = Progress {
            iterations: self.stats.iterations,
            explored_states: self.memo.len(),
            depth,
            path: &self.path[..path_len],
            percent_done: estimate_percent(&self.path[..path_len], self.prefix_len, self.arity()),
        };
        match self.progress.as_mut() {
            Some(hook) => hook(&progress),
            None => debug!(
                iterations = progress.iterations,
                explored = progress.explored_states,
                depth,
                "explored {:.4}%",
                progress.percent_done
            ),
        }
    }

    fn refresh_table_stats(&mut self) {
        let (solved, unsolvable) = self.memo.entry_counts();
        self.stats.explored_states = self.memo.len();
        self.stats.solved_states = solved;
        self.stats.unsolvable_states = unsolvable;
    }
}

pub(crate) fn validate_prefix(prefix: &Network, arity: usize) -> Result<(), SearchError> {
    prefix.validate(arity).map_err(|_| SearchError::InvalidPrefix {
        swap: prefix
            .iter()
            .find(|s| s.j() as usize >= arity)
            .map(|s| s.to_string())
            .unwrap_or_default(),
        arity,
    })
}

impl<B: BitSet> SearchAlgorithm for NetFinder<B> {
    fn search(&mut self) -> Result<SearchResult, SearchError> {
        self.find_best()
    }

    fn statistics(&self) -> SearchStatistics {
        self.stats.clone()
    }

    fn reset(&mut self) {
        self.memo.clear();
        self.scratch.clear();
        self.path.clear();
        self.stats = SearchStatistics::new(Algorithm::Sequential);
        self.stats.backend = B::BACKEND;
    }
}
