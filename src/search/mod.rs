//! Search for minimal compare-exchange networks
//!
//! This module provides two drivers over the same branch-and-bound core:
//! - Sequential: depth-first search with one explored-state table
//! - Parallel: first-level swaps split across worker threads, each with its
//!   own table and scratch buffers, sharing only the best height found

pub mod candidate;
pub mod config;
pub mod finder;
pub mod memo;
pub mod parallel;
pub mod progress;
pub mod result;

pub use config::{Algorithm, SearchConfig};
pub use finder::{NetFinder, Outcome};
pub use memo::{Explored, ExploredTable};
pub use parallel::{run_parallel_search, ParallelConfig, ParallelResult, ParallelSearch};
pub use progress::{Progress, ProgressHook};
pub use result::{SearchResult, SearchStatistics};

use crate::bits::BitSet;
use crate::error::SearchError;
use finder::check_arity;

/// Trait for search drivers that find the shortest network for a
/// configured problem
pub trait SearchAlgorithm {
    /// Run the search from scratch
    ///
    /// # Returns
    /// A SearchResult with the network found (if any) and statistics, or an
    /// error if the run was aborted
    fn search(&mut self) -> Result<SearchResult, SearchError>;

    /// Get statistics from the most recent search
    fn statistics(&self) -> SearchStatistics;

    /// Reset the search state for a new search
    fn reset(&mut self);
}

/// Builds the driver selected by `config.algorithm`.
///
/// The progress hook is only installed on the sequential finder; parallel
/// workers report through `tracing`.
pub fn create_search<B: BitSet>(
    arity: usize,
    template: B,
    config: SearchConfig,
    parallel_config: ParallelConfig,
    progress: Option<ProgressHook>,
) -> Result<Box<dyn SearchAlgorithm>, SearchError> {
    match config.algorithm {
        Algorithm::Sequential => {
            let mut finder = NetFinder::new(arity, template, config)?;
            if let Some(hook) = progress {
                finder = finder.with_progress(hook);
            }
            Ok(Box::new(finder))
        }
        Algorithm::Parallel => {
            check_arity::<B>(arity)?;
            Ok(Box::new(ParallelSearch::new(
                arity,
                template,
                config,
                parallel_config,
            )))
        }
    }
}
