//! Parallel search coordinator that manages worker threads.

use crate::bits::{BitSet, ReachSet};
use crate::error::SearchError;
use crate::network::Network;
use crate::search::candidate::distinct_children;
use crate::search::config::{Algorithm, SearchConfig};
use crate::search::finder::{check_arity, validate_prefix, NetFinder};
use crate::search::parallel::channel::{
    create_channels, CoordinatorChannels, CoordinatorMessage, SharedBest, Task, WorkerChannels,
    WorkerMessage,
};
use crate::search::parallel::config::ParallelConfig;
use crate::search::result::{SearchResult, SearchStatistics};
use crate::search::SearchAlgorithm;
use crate::semantics::{MaskFactory, SwapTransform};
use crossbeam_channel::RecvTimeoutError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result from parallel search execution.
#[derive(Debug)]
pub struct ParallelResult {
    /// The best result found across all workers.
    pub best_result: SearchResult,
    /// Statistics aggregated from all workers.
    pub total_statistics: SearchStatistics,
    /// Per-worker statistics.
    pub worker_statistics: Vec<(usize, SearchStatistics)>,
    /// Every task ran to the end, so the result is minimal.
    pub complete: bool,
    /// The deadline passed before the workers drained the queue.
    pub timed_out: bool,
    /// Errors reported by workers.
    pub errors: Vec<SearchError>,
}

/// Run parallel search with the given configuration.
///
/// Every distinct first swap after the prefix becomes one task. Workers keep
/// their own explored-state table across tasks and share only the best
/// `(length, task)` found so far, which bounds the budget of later tasks.
pub fn run_parallel_search<B: BitSet>(
    arity: usize,
    template: &B,
    search_config: &SearchConfig,
    parallel_config: &ParallelConfig,
) -> Result<ParallelResult, SearchError> {
    let start_time = Instant::now();
    check_arity::<B>(arity)?;
    let masks = Arc::new(MaskFactory::<B>::new(arity));
    if template.len() != masks.domain_size() {
        return Err(SearchError::TemplateWidth {
            expected: masks.domain_size(),
            actual: template.len(),
        });
    }
    let prefix = &search_config.prefix;
    validate_prefix(prefix, arity)?;

    let mut transform = SwapTransform::new(Arc::clone(&masks), template.clone());
    let mut root = transform.full_set();
    for &swap in prefix {
        transform.compare_swap(&mut root, swap);
    }

    let mut total_stats = SearchStatistics::new(Algorithm::Parallel);
    total_stats.backend = B::BACKEND;

    // Settled without spawning anything
    if prefix.len() <= search_config.max_swaps && transform.is_allowed(&root) {
        total_stats.elapsed_time = start_time.elapsed();
        return Ok(settled(
            SearchResult::found(prefix.clone(), prefix.len(), total_stats.clone()),
            total_stats,
        ));
    }
    if prefix.len() >= search_config.max_swaps {
        total_stats.elapsed_time = start_time.elapsed();
        let proven = search_config.free_swaps();
        return Ok(settled(
            SearchResult::exhausted(prefix.len(), proven, total_stats.clone()),
            total_stats,
        ));
    }

    let tasks: Vec<Task> = distinct_children(&mut transform, &root, prefix.last())
        .into_iter()
        .enumerate()
        .map(|(index, (swap, _))| Task { index, swap })
        .collect();
    let num_workers = parallel_config.effective_workers(tasks.len());
    info!(
        workers = num_workers,
        tasks = tasks.len(),
        max_swaps = search_config.max_swaps,
        "starting parallel network search"
    );

    // Create communication channels
    let (coordinator_channels, worker_channels) = create_channels(num_workers, &tasks);

    // The coordinator owns the deadline; workers are only ever stopped by it
    let timeout = parallel_config.timeout.or(search_config.timeout);
    let parallel_config = &parallel_config.clone().with_timeout_option(timeout);
    let search_config = Arc::new(search_config.clone().with_timeout_option(None));
    let share_bounds = parallel_config.bound_sharing;

    let worker_handles: Vec<_> = worker_channels
        .into_iter()
        .enumerate()
        .map(|(worker_id, channels)| {
            let masks = Arc::clone(&masks);
            let template = template.clone();
            let search_config = Arc::clone(&search_config);

            std::thread::spawn(move || {
                run_worker(
                    worker_id,
                    masks,
                    template,
                    &search_config,
                    share_bounds,
                    channels,
                )
            })
        })
        .collect();

    // Run coordinator loop
    let mut result = run_coordinator(
        coordinator_channels,
        parallel_config,
        num_workers,
        tasks.len(),
        start_time,
    );

    // Wait for all workers to finish
    for handle in worker_handles {
        let _ = handle.join();
    }

    let prefix_len = search_config.prefix.len();
    result.total_statistics.backend = B::BACKEND;
    result.best_result = match result.best_result.network.take() {
        Some(network) => {
            SearchResult::found(network, prefix_len, result.total_statistics.clone())
        }
        None => {
            // An interrupted run proves nothing beyond the prefix itself
            let proven = if result.complete {
                search_config.free_swaps()
            } else {
                0
            };
            SearchResult::exhausted(prefix_len, proven, result.total_statistics.clone())
        }
    };

    info!(
        success = result.best_result.success,
        swaps = result.best_result.total_swaps().unwrap_or(0),
        complete = result.complete,
        "parallel network search finished"
    );
    Ok(result)
}

fn settled(best_result: SearchResult, total_statistics: SearchStatistics) -> ParallelResult {
    ParallelResult {
        best_result,
        total_statistics,
        worker_statistics: Vec::new(),
        complete: true,
        timed_out: false,
        errors: Vec::new(),
    }
}

/// Coordinator loop that receives messages from workers and aggregates results.
///
/// The returned `best_result` only carries the winning network; the caller
/// turns it into a full result once the prefix length is known.
fn run_coordinator(
    channels: CoordinatorChannels,
    config: &ParallelConfig,
    total_workers: usize,
    total_tasks: usize,
    start_time: Instant,
) -> ParallelResult {
    let mut best: Option<(u64, Network)> = None;
    let mut worker_stats: Vec<(usize, SearchStatistics)> = Vec::new();
    let mut errors = Vec::new();
    let mut finished_count = 0;
    let mut tasks_done = 0;
    let mut timed_out = false;

    // Calculate timeout
    let deadline = config.timeout.map(|t| start_time + t);

    loop {
        // Check if we've exceeded timeout
        if !timed_out && deadline.is_some_and(|d| Instant::now() >= d) {
            warn!("parallel search deadline reached, stopping workers");
            timed_out = true;
            channels.shared.signal_stop();
            // Broadcast stop to all workers
            for tx in &channels.to_workers {
                let _ = tx.send(CoordinatorMessage::Stop);
            }
        }

        // Receive with timeout to allow periodic checks
        let recv_timeout = Duration::from_millis(100);
        match channels.from_workers.recv_timeout(recv_timeout) {
            Ok(msg) => match msg {
                WorkerMessage::Improvement {
                    worker_id,
                    task,
                    network,
                } => {
                    let encoded = SharedBest::encode(network.len(), task);
                    channels.shared.try_update(encoded);
                    if best.as_ref().map_or(true, |(current, _)| encoded < *current) {
                        debug!(worker_id, task, swaps = network.len(), "new best network");
                        best = Some((encoded, network));
                    }
                }
                WorkerMessage::TaskDone {
                    worker_id,
                    task,
                    success,
                } => {
                    tasks_done += 1;
                    debug!(worker_id, task, success, tasks_done, "task finished");
                }
                WorkerMessage::Finished {
                    worker_id,
                    statistics,
                } => {
                    finished_count += 1;
                    worker_stats.push((worker_id, statistics));

                    if finished_count >= total_workers {
                        break;
                    }
                }
                WorkerMessage::Error { worker_id, error } => {
                    // Stopped workers report the abort they were asked for
                    if !(timed_out && error == SearchError::Aborted) {
                        warn!(worker_id, %error, "worker failed");
                        errors.push(error);
                    }
                }
            },
            Err(RecvTimeoutError::Timeout) => {
                // Check if all workers finished or we should stop
                if channels.shared.should_stop() && finished_count >= total_workers {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                // All senders dropped, we're done
                break;
            }
        }
    }

    // Build final result
    let mut total_stats = SearchStatistics::new(Algorithm::Parallel);
    worker_stats.sort_by_key(|(id, _)| *id);
    for (_, stats) in &worker_stats {
        total_stats.merge(stats);
    }
    total_stats.elapsed_time = start_time.elapsed();

    let best_result = SearchResult {
        network: best.map(|(_, network)| network),
        ..SearchResult::default()
    };

    ParallelResult {
        best_result,
        total_statistics: total_stats,
        worker_statistics: worker_stats,
        complete: !timed_out && errors.is_empty() && tasks_done == total_tasks,
        timed_out,
        errors,
    }
}

/// Worker function that drains the task queue.
fn run_worker<B: BitSet>(
    worker_id: usize,
    masks: Arc<MaskFactory<B>>,
    template: B,
    search_config: &SearchConfig,
    share_bounds: bool,
    channels: WorkerChannels,
) {
    let max_swaps = search_config.max_swaps;
    let mut finder = match NetFinder::with_masks(masks, template, search_config.clone()) {
        Ok(finder) => finder.with_stop_flag(channels.shared.stop_flag()),
        Err(error) => {
            let _ = channels
                .to_coordinator
                .send(WorkerMessage::Error { worker_id, error });
            let _ = channels.to_coordinator.send(WorkerMessage::Finished {
                worker_id,
                statistics: SearchStatistics::new(Algorithm::Sequential),
            });
            return;
        }
    };

    while let Ok(task) = channels.tasks.recv() {
        if channels.shared.should_stop()
            || channels.from_coordinator.try_recv() == Ok(CoordinatorMessage::Stop)
        {
            break;
        }

        let budget = if share_bounds {
            channels.shared.budget_for(task.index, max_swaps)
        } else {
            max_swaps
        };
        let mut prefix = search_config.prefix.clone();
        prefix.push(task.swap);

        let success = if budget < prefix.len() {
            false
        } else {
            match finder.search_from(&prefix, budget) {
                Ok(result) => match result.network {
                    Some(network) if result.success => {
                        channels
                            .shared
                            .try_update(SharedBest::encode(network.len(), task.index));
                        let _ = channels.to_coordinator.send(WorkerMessage::Improvement {
                            worker_id,
                            task: task.index,
                            network,
                        });
                        true
                    }
                    _ => false,
                },
                Err(error) => {
                    let _ = channels
                        .to_coordinator
                        .send(WorkerMessage::Error { worker_id, error });
                    break;
                }
            }
        };

        let _ = channels.to_coordinator.send(WorkerMessage::TaskDone {
            worker_id,
            task: task.index,
            success,
        });
    }

    let _ = channels.to_coordinator.send(WorkerMessage::Finished {
        worker_id,
        statistics: finder.statistics(),
    });
}

/// Parallel driver behind the `SearchAlgorithm` interface.
pub struct ParallelSearch<B: BitSet = ReachSet> {
    arity: usize,
    template: B,
    search_config: SearchConfig,
    parallel_config: ParallelConfig,
    last_statistics: SearchStatistics,
}

impl<B: BitSet> ParallelSearch<B> {
    pub fn new(
        arity: usize,
        template: B,
        search_config: SearchConfig,
        parallel_config: ParallelConfig,
    ) -> Self {
        Self {
            arity,
            template,
            search_config,
            parallel_config,
            last_statistics: SearchStatistics::new(Algorithm::Parallel),
        }
    }

    /// Run the search and keep the full per-worker report.
    pub fn run(&mut self) -> Result<ParallelResult, SearchError> {
        let result = run_parallel_search(
            self.arity,
            &self.template,
            &self.search_config,
            &self.parallel_config,
        )?;
        self.last_statistics = result.total_statistics.clone();
        Ok(result)
    }
}

impl<B: BitSet> SearchAlgorithm for ParallelSearch<B> {
    fn search(&mut self) -> Result<SearchResult, SearchError> {
        let mut result = self.run()?;
        if !result.best_result.success {
            if !result.errors.is_empty() {
                return Err(result.errors.swap_remove(0));
            }
            if result.timed_out {
                return Err(SearchError::Aborted);
            }
        } else if !result.complete {
            warn!("parallel search stopped early, the network may not be minimal");
        }
        Ok(result.best_result)
    }

    fn statistics(&self) -> SearchStatistics {
        self.last_statistics.clone()
    }

    fn reset(&mut self) {
        self.last_statistics = SearchStatistics::new(Algorithm::Parallel);
    }
}
