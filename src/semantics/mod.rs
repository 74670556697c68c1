//! Semantics of compare-exchange networks over reachability sets
//!
//! - `masks`: per-arity pattern masks
//! - `transform`: applying a swap to a whole reachability set and the goal test
//! - `rule`: target predicates, life rules and their terminal bit-tests

pub mod masks;
pub mod rule;
pub mod transform;

pub use masks::MaskFactory;
pub use rule::{
    classic_conway_test, template_from_fn, CountSet, CountWindow, LifeRule, Target, TerminalTest,
    CLASSIC_CONWAY_TEST,
};
pub use transform::SwapTransform;
