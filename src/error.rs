//! Error types for the swapnet library.

use thiserror::Error;

/// Errors that abort a search run. Running out of budget is not an error;
/// it is reported through `SearchResult::success`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("explored-state table reached its limit of {limit} entries")]
    MemoLimitExceeded { limit: usize },

    #[error("search aborted by stop request")]
    Aborted,

    #[error("no solved entry recorded for state at depth {depth} while rebuilding the network")]
    Reconstruction { depth: usize },

    #[error("arity {arity} is out of range (1..={max})")]
    UnsupportedArity { arity: usize, max: usize },

    #[error("violation template has {actual} bits, expected {expected} for the given arity")]
    TemplateWidth { expected: usize, actual: usize },

    #[error("prefix swap {swap} is invalid for arity {arity}")]
    InvalidPrefix { swap: String, arity: usize },
}

/// Errors from parsing swaps and networks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkParseError {
    #[error("malformed swap '{0}': expected 'i-j', 'i,j' or '(i, j)'")]
    Malformed(String),

    #[error("invalid index '{0}' in swap")]
    BadIndex(String),

    #[error("swap ({i}, {j}) must have i < j")]
    Unordered { i: usize, j: usize },

    #[error("swap ({i}, {j}) is out of range for arity {arity}")]
    OutOfRange { i: usize, j: usize, arity: usize },
}

/// Errors from parsing life rules and target names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleParseError {
    #[error("unknown target '{0}': expected a rule like 'B3/S23', 'conway', 'conway-classic' or 'evacuate-top'")]
    Unknown(String),

    #[error("rule '{0}' must have the form B<digits>/S<digits>")]
    Malformed(String),

    #[error("neighbour count {count} in rule exceeds arity {arity}")]
    CountOutOfRange { count: usize, arity: usize },

    #[error("target reads {needed} inputs but arity is {arity}")]
    TooFewInputs { needed: usize, arity: usize },
}
