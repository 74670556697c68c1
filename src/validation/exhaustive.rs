//! Brute-force replay of a network over every input pattern.

use crate::bits::BitSet;
use crate::network::Network;
use crate::semantics::Target;
use std::fmt;

/// An input the network fails on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample {
    pub arity: usize,
    pub input: u32,
    pub output: u32,
    /// Cell state under which the terminal test disagreed with the rule,
    /// when the failure is specific to one state.
    pub alive: Option<bool>,
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input {} -> output {}",
            pattern_string(self.input, self.arity),
            pattern_string(self.output, self.arity)
        )?;
        if let Some(alive) = self.alive {
            write!(f, " (cell {})", if alive { "alive" } else { "dead" })?;
        }
        Ok(())
    }
}

/// Outcome of an exhaustive check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified { inputs: usize },
    Counterexample(Counterexample),
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified { .. })
    }
}

/// Inputs rendered LSB first, `n0` on the left.
pub fn pattern_string(pattern: u32, arity: usize) -> String {
    (0..arity)
        .map(|i| if (pattern >> i) & 1 == 1 { '1' } else { '0' })
        .collect()
}

fn arity_of<B: BitSet>(set: &B) -> usize {
    assert!(
        set.len().is_power_of_two(),
        "pattern set width {} is not a power of two",
        set.len()
    );
    set.len().trailing_zeros() as usize
}

/// Reachability set computed one input at a time, without the mask algebra.
pub fn network_image<B: BitSet>(network: &Network, arity: usize) -> B {
    let domain = 1usize << arity;
    B::from_indices(
        domain,
        (0..domain).map(|input| network.apply(input as u32) as usize),
    )
}

/// Checks that no input is mapped onto a pattern in `template`.
pub fn verify_template<B: BitSet>(network: &Network, template: &B) -> Verification {
    let arity = arity_of(template);
    let domain = 1u32 << arity;
    for input in 0..domain {
        let output = network.apply(input);
        if template.get(output as usize) {
            return Verification::Counterexample(Counterexample {
                arity,
                input,
                output,
                alive: None,
            });
        }
    }
    Verification::Verified {
        inputs: domain as usize,
    }
}

/// Checks the network against the target for every input. For life targets
/// the terminal test on the output is compared with the rule evaluated on the
/// input's own neighbour count, for both cell states.
pub fn verify_target(network: &Network, target: &Target) -> Verification {
    let arity = target.arity();
    let domain = 1u32 << arity;
    for input in 0..domain {
        let output = network.apply(input);
        match target.rule() {
            Some(rule) => {
                let count = input.count_ones() as usize;
                for alive in [false, true] {
                    if target.read_state(output, alive) != Some(rule.next_state(alive, count)) {
                        return Verification::Counterexample(Counterexample {
                            arity,
                            input,
                            output,
                            alive: Some(alive),
                        });
                    }
                }
            }
            None => {
                if !target.allows(output) {
                    return Verification::Counterexample(Counterexample {
                        arity,
                        input,
                        output,
                        alive: None,
                    });
                }
            }
        }
    }
    Verification::Verified {
        inputs: domain as usize,
    }
}

/// Lists the reachable output patterns, one per line.
pub fn format_outputs<B: BitSet>(reach: &B, arity: usize) -> String {
    let mut s = String::from("Allowed outputs:\n");
    for pattern in reach.ones_iter() {
        s.push('\t');
        s.push_str(&pattern_string(pattern as u32, arity));
        s.push('\n');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::WordBitVec;
    use crate::network::Swap;

    #[test]
    fn test_sorting_network_verifies_conway() {
        let target = Target::parse("conway", 8).unwrap();
        let network = Network::sorting_network_8();
        assert_eq!(
            verify_target(&network, &target),
            Verification::Verified { inputs: 256 }
        );
        let template: WordBitVec = target.violation_template();
        assert!(verify_template(&network, &template).is_verified());
    }

    #[test]
    fn test_truncated_network_fails_conway() {
        let target = Target::parse("conway", 8).unwrap();
        let network = Network::sorting_network_8().truncated(14);
        match verify_target(&network, &target) {
            Verification::Counterexample(cex) => {
                let count = cex.input.count_ones() as usize;
                assert_eq!(cex.output.count_ones() as usize, count);
                assert!(cex.alive.is_some());
            }
            other => panic!("expected a counterexample, got {:?}", other),
        }
    }

    #[test]
    fn test_sorting_network_verifies_classic_conway() {
        let target = Target::parse("conway-classic", 8).unwrap();
        let network = Network::sorting_network_8();
        assert!(verify_target(&network, &target).is_verified());

        // Without swaps a lone neighbour on input 2 reads as a birth.
        match verify_target(&Network::new(), &target) {
            Verification::Counterexample(cex) => {
                assert_eq!(cex.input, 0b100);
                assert_eq!(cex.alive, Some(false));
            }
            other => panic!("expected a counterexample, got {:?}", other),
        }
    }

    #[test]
    fn test_network_image() {
        let network = Network::from_swaps(vec![Swap::new(0, 2)]);
        let image: WordBitVec = network_image(&network, 3);
        assert_eq!(image, WordBitVec::from_indices(8, [0, 1, 2, 3, 5, 7]));

        let empty: WordBitVec = network_image(&Network::new(), 3);
        assert_eq!(empty, WordBitVec::ones(8));
    }

    #[test]
    fn test_verify_template_counterexample() {
        let template = WordBitVec::from_indices(8, [5, 6]);
        let network = Network::from_swaps(vec![Swap::new(0, 2)]);
        match verify_template(&network, &template) {
            Verification::Counterexample(cex) => {
                assert_eq!(cex.input, 5);
                assert_eq!(cex.output, 5);
                assert_eq!(cex.to_string(), "input 101 -> output 101");
            }
            other => panic!("expected a counterexample, got {:?}", other),
        }
    }

    #[test]
    fn test_format_outputs() {
        let reach = WordBitVec::from_indices(4, [0, 1, 3]);
        assert_eq!(
            format_outputs(&reach, 2),
            "Allowed outputs:\n\t00\n\t10\n\t11\n"
        );
    }
}
