//! Synthesis of minimal compare-exchange networks.
//!
//! A network of swaps `(i, j)` with `i < j` moves a set input toward the
//! lower index. The search tracks the set of input patterns still reachable
//! after each swap and looks for the shortest network after which no
//! reachable pattern violates a target, such as a life-like rule evaluated by
//! a two-bit test on the swapped inputs.

pub mod bits;
pub mod error;
pub mod network;
pub mod search;
pub mod semantics;
pub mod validation;

pub use bits::{BitSet, LaneBitVec, ReachSet, WordBitVec};
pub use error::{NetworkParseError, RuleParseError, SearchError};
pub use network::{Network, Swap};
pub use search::{NetFinder, SearchAlgorithm, SearchConfig, SearchResult};
pub use semantics::{LifeRule, Target};
