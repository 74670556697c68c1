//! Compare-exchange networks over `k` boolean inputs.

mod swap;

pub use swap::Swap;

use crate::error::NetworkParseError;
use std::fmt;
use std::str::FromStr;

/// An ordered sequence of compare-exchange swaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Network {
    swaps: Vec<Swap>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_swaps(swaps: Vec<Swap>) -> Self {
        Self { swaps }
    }

    pub fn push(&mut self, swap: Swap) {
        self.swaps.push(swap);
    }

    pub fn len(&self) -> usize {
        self.swaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty()
    }

    pub fn swaps(&self) -> &[Swap] {
        &self.swaps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Swap> {
        self.swaps.iter()
    }

    pub fn last(&self) -> Option<Swap> {
        self.swaps.last().copied()
    }

    /// Runs every swap over one input pattern.
    pub fn apply(&self, pattern: u32) -> u32 {
        self.swaps.iter().fold(pattern, |p, swap| swap.apply(p))
    }

    /// Checks every swap against `arity`.
    pub fn validate(&self, arity: usize) -> Result<(), NetworkParseError> {
        for swap in &self.swaps {
            Swap::try_new(swap.i() as usize, swap.j() as usize, arity)?;
        }
        Ok(())
    }

    /// The 19-swap sorting network on eight inputs. Sorting moves every set
    /// bit to the low indices, so it reduces any count rule to a bit-test.
    pub fn sorting_network_8() -> Self {
        const PAIRS: [(u8, u8); 19] = [
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
            (0, 2),
            (1, 3),
            (4, 6),
            (5, 7),
            (2, 4),
            (3, 5),
            (0, 1),
            (2, 3),
            (4, 5),
            (6, 7),
            (1, 4),
            (3, 6),
            (1, 2),
            (3, 4),
            (5, 6),
        ];
        Self {
            swaps: PAIRS.iter().map(|&(i, j)| Swap::new(i, j)).collect(),
        }
    }

    /// First `n` swaps of this network.
    pub fn truncated(&self, n: usize) -> Self {
        Self {
            swaps: self.swaps[..n.min(self.swaps.len())].to_vec(),
        }
    }
}

impl<'a> IntoIterator for &'a Network {
    type Item = &'a Swap;
    type IntoIter = std::slice::Iter<'a, Swap>;

    fn into_iter(self) -> Self::IntoIter {
        self.swaps.iter()
    }
}

impl From<Vec<Swap>> for Network {
    fn from(swaps: Vec<Swap>) -> Self {
        Self { swaps }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for swap in &self.swaps {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}", swap)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Network {
    type Err = NetworkParseError;

    /// Accepts `0-4,1-5`, `0-4 1-5`, `0-4;1-5`, `0 - 4, 1 - 5` and the
    /// display form `(0, 4), (1, 5)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Whitespace around a dash stays inside its swap.
        let joined = s.split('-').map(str::trim).collect::<Vec<_>>().join("-");
        let mut swaps = Vec::new();
        let mut rest = joined.trim();
        while !rest.is_empty() {
            let (token, tail) = if rest.starts_with('(') {
                let end = rest
                    .find(')')
                    .ok_or_else(|| NetworkParseError::Malformed(rest.to_string()))?;
                (&rest[..=end], &rest[end + 1..])
            } else {
                let end = rest
                    .find(|c: char| c == ',' || c == ';' || c.is_whitespace())
                    .unwrap_or(rest.len());
                (&rest[..end], &rest[end..])
            };
            swaps.push(token.parse::<Swap>()?);
            rest = tail.trim_start_matches(|c: char| c == ',' || c == ';' || c.is_whitespace());
        }
        Ok(Self { swaps })
    }
}
