//! Independent re-verification of synthesized networks

pub mod exhaustive;

pub use exhaustive::{
    format_outputs, network_image, pattern_string, verify_target, verify_template, Counterexample,
    Verification,
};
