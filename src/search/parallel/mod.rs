//! Parallel network search over the first swap after the prefix.
//!
//! # Architecture
//!
//! The parallel search system consists of:
//! - A **coordinator** that queues one task per distinct first swap, manages
//!   worker threads and aggregates results
//! - Multiple **workers**, each running a `NetFinder` with its own
//!   explored-state table, reused across the tasks it picks up
//! - A **channel system** for communication between workers and coordinator
//! - **Shared state** holding the best `(length, task)` so far, so later tasks
//!   search with a tighter budget and ties go to the earliest first swap
//!
//! # Example
//!
//! ```ignore
//! use swapnet::search::parallel::{ParallelConfig, run_parallel_search};
//!
//! let config = ParallelConfig::default()
//!     .with_workers(4)
//!     .with_timeout(Duration::from_secs(60));
//!
//! let result = run_parallel_search(8, &template, &search_config, &config)?;
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;

pub use config::ParallelConfig;
pub use coordinator::{run_parallel_search, ParallelResult, ParallelSearch};
