//! Task queue and result channels for parallel search workers.

use crate::error::SearchError;
use crate::network::{Network, Swap};
use crate::search::result::SearchStatistics;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// One first-level swap to search below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    /// Position in the task list; ties between equal-length networks go to
    /// the lowest index.
    pub index: usize,
    pub swap: Swap,
}

/// Message sent from workers to the coordinator.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// Worker found a network below its task's swap.
    Improvement {
        worker_id: usize,
        task: usize,
        network: Network,
    },
    /// Worker finished one task.
    TaskDone {
        worker_id: usize,
        task: usize,
        success: bool,
    },
    /// Worker has drained the queue or was stopped.
    Finished {
        worker_id: usize,
        statistics: SearchStatistics,
    },
    /// Worker aborted its search.
    Error { worker_id: usize, error: SearchError },
}

/// Message sent from coordinator to workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorMessage {
    /// Signal workers to stop.
    Stop,
}

/// Shared state for tracking the best network across all workers.
///
/// The best is packed as `(total_swaps << 32) | task_index` so one atomic
/// minimum orders by length first and task second.
#[derive(Debug)]
pub struct SharedBest {
    /// Current best encoding (u64::MAX means no network yet).
    pub best: AtomicU64,
    /// Flag to signal all workers to stop, also polled inside the search.
    pub should_stop: Arc<AtomicBool>,
}

impl Default for SharedBest {
    fn default() -> Self {
        Self {
            best: AtomicU64::new(u64::MAX),
            should_stop: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl SharedBest {
    pub fn encode(total_swaps: usize, task: usize) -> u64 {
        ((total_swaps as u64) << 32) | (task as u64 & 0xFFFF_FFFF)
    }

    /// Try to update the best. Returns true if this is a new best.
    pub fn try_update(&self, encoded: u64) -> bool {
        let mut current = self.best.load(Ordering::SeqCst);
        loop {
            if encoded >= current {
                return false;
            }
            match self.best.compare_exchange_weak(
                current,
                encoded,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(c) => current = c,
            }
        }
    }

    /// Best `(total_swaps, task)` so far.
    pub fn current_best(&self) -> Option<(usize, usize)> {
        match self.best.load(Ordering::SeqCst) {
            u64::MAX => None,
            packed => Some(((packed >> 32) as usize, (packed & 0xFFFF_FFFF) as usize)),
        }
    }

    /// Total swap budget worth spending on `task`: equal length is still
    /// interesting for tasks ahead of the current best, only strictly
    /// shorter networks for the rest.
    pub fn budget_for(&self, task: usize, max_swaps: usize) -> usize {
        match self.current_best() {
            None => max_swaps,
            Some((len, best_task)) if task < best_task => max_swaps.min(len),
            Some((len, _)) => max_swaps.min(len.saturating_sub(1)),
        }
    }

    /// Check if we should stop searching.
    pub fn should_stop(&self) -> bool {
        self.should_stop.load(Ordering::SeqCst)
    }

    /// Signal all workers to stop.
    pub fn signal_stop(&self) {
        self.should_stop.store(true, Ordering::SeqCst);
    }

    /// Handle for the search loop to poll.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.should_stop)
    }
}

/// Channel endpoints for a worker.
pub struct WorkerChannels {
    /// Send messages to coordinator.
    pub to_coordinator: Sender<WorkerMessage>,
    /// Receive messages from coordinator.
    pub from_coordinator: Receiver<CoordinatorMessage>,
    /// Shared task queue.
    pub tasks: Receiver<Task>,
    /// Shared state for fast best-height checking.
    pub shared: Arc<SharedBest>,
}

/// Channel endpoints for the coordinator.
pub struct CoordinatorChannels {
    /// Receive messages from workers.
    pub from_workers: Receiver<WorkerMessage>,
    /// Send messages to workers (one sender per worker).
    pub to_workers: Vec<Sender<CoordinatorMessage>>,
    /// Shared state.
    pub shared: Arc<SharedBest>,
}

/// Create channels for parallel search with the given number of workers and
/// queue every task up front.
pub fn create_channels(
    num_workers: usize,
    tasks: &[Task],
) -> (CoordinatorChannels, Vec<WorkerChannels>) {
    let shared = Arc::new(SharedBest::default());

    // Unbounded channel from workers to coordinator (workers shouldn't block)
    let (worker_tx, coordinator_rx) = unbounded();

    // Every task is queued before any worker starts; dropping the sender lets
    // workers see the end of the queue.
    let (task_tx, task_rx) = unbounded();
    for &task in tasks {
        let _ = task_tx.send(task);
    }
    drop(task_tx);

    let mut to_workers = Vec::with_capacity(num_workers);
    let mut worker_channels = Vec::with_capacity(num_workers);

    for _ in 0..num_workers {
        // Bounded channel to workers (small buffer, workers check between tasks)
        let (coord_tx, worker_rx) = bounded(8);
        to_workers.push(coord_tx);
        worker_channels.push(WorkerChannels {
            to_coordinator: worker_tx.clone(),
            from_coordinator: worker_rx,
            tasks: task_rx.clone(),
            shared: Arc::clone(&shared),
        });
    }

    let coordinator = CoordinatorChannels {
        from_workers: coordinator_rx,
        to_workers,
        shared,
    };

    (coordinator, worker_channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_best_update() {
        let shared = SharedBest::default();
        assert_eq!(shared.current_best(), None);

        // Initial update should succeed
        assert!(shared.try_update(SharedBest::encode(12, 3)));
        assert_eq!(shared.current_best(), Some((12, 3)));

        // Shorter network should succeed
        assert!(shared.try_update(SharedBest::encode(10, 5)));
        assert_eq!(shared.current_best(), Some((10, 5)));

        // Same length from a later task should fail
        assert!(!shared.try_update(SharedBest::encode(10, 6)));

        // Same length from an earlier task wins the tie
        assert!(shared.try_update(SharedBest::encode(10, 1)));
        assert_eq!(shared.current_best(), Some((10, 1)));
    }

    #[test]
    fn test_budget_for() {
        let shared = SharedBest::default();
        assert_eq!(shared.budget_for(4, 17), 17);
        shared.try_update(SharedBest::encode(12, 4));
        assert_eq!(shared.budget_for(2, 17), 12);
        assert_eq!(shared.budget_for(4, 17), 11);
        assert_eq!(shared.budget_for(9, 17), 11);
        assert_eq!(shared.budget_for(2, 10), 10);
    }

    #[test]
    fn test_shared_stop_signal() {
        let shared = SharedBest::default();
        let flag = shared.stop_flag();

        assert!(!shared.should_stop());
        shared.signal_stop();
        assert!(shared.should_stop());
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_create_channels() {
        let tasks = [
            Task {
                index: 0,
                swap: Swap::new(0, 1),
            },
            Task {
                index: 1,
                swap: Swap::new(0, 2),
            },
        ];
        let (coordinator, workers) = create_channels(3, &tasks);

        assert_eq!(workers.len(), 3);
        assert_eq!(coordinator.to_workers.len(), 3);

        // Tasks are shared: two receivers drain one queue
        assert_eq!(workers[0].tasks.recv().unwrap(), tasks[0]);
        assert_eq!(workers[2].tasks.recv().unwrap(), tasks[1]);
        assert!(workers[1].tasks.recv().is_err());

        let msg = WorkerMessage::TaskDone {
            worker_id: 0,
            task: 1,
            success: false,
        };
        workers[0].to_coordinator.send(msg).unwrap();

        match coordinator.from_workers.recv().unwrap() {
            WorkerMessage::TaskDone {
                worker_id, task, ..
            } => {
                assert_eq!(worker_id, 0);
                assert_eq!(task, 1);
            }
            _ => panic!("Unexpected message type"),
        }
    }

    #[test]
    fn test_coordinator_broadcast() {
        let (coordinator, workers) = create_channels(2, &[]);

        for tx in &coordinator.to_workers {
            tx.send(CoordinatorMessage::Stop).unwrap();
        }

        for worker in &workers {
            assert_eq!(worker.from_coordinator.recv().unwrap(), CoordinatorMessage::Stop);
        }
    }
}
