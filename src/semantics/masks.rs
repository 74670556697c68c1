//! Precomputed masks over the pattern domain `[0, 2^k)`.

use crate::bits::BitSet;
use crate::network::Swap;

/// Immutable per-arity mask tables, shared read-only between searches.
#[derive(Debug, Clone)]
pub struct MaskFactory<B> {
    arity: usize,
    high: Vec<B>,
    pair: Vec<B>,
    inverted_pair: Vec<B>,
}

impl<B: BitSet> MaskFactory<B> {
    /// Builds every mask for `arity` inputs.
    ///
    /// Panics if the domain `2^arity` does not fit the backend.
    pub fn new(arity: usize) -> Self {
        assert!(
            arity >= 1 && arity < usize::BITS as usize && (1usize << arity) <= B::MAX_LEN,
            "arity {} does not fit the {} backend",
            arity,
            B::BACKEND
        );
        let domain = 1usize << arity;

        let high: Vec<B> = (0..arity)
            .map(|bit| B::from_indices(domain, (0..domain).filter(|p| (p >> bit) & 1 == 1)))
            .collect();

        let mut pair = Vec::with_capacity(Swap::pair_count(arity));
        let mut inverted_pair = Vec::with_capacity(Swap::pair_count(arity));
        for swap in Swap::pairs(arity) {
            let mask = high[swap.i() as usize].complement().intersection(&high[swap.j() as usize]);
            inverted_pair.push(mask.complement());
            pair.push(mask);
        }

        Self {
            arity,
            high,
            pair,
            inverted_pair,
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Number of patterns, `2^arity`.
    pub fn domain_size(&self) -> usize {
        1 << self.arity
    }

    /// Patterns whose input `bit` is set.
    pub fn high_mask(&self, bit: usize) -> &B {
        assert!(bit < self.arity, "input {} out of range for arity {}", bit, self.arity);
        &self.high[bit]
    }

    /// Patterns with input `i` clear and input `j` set: the ones `swap` moves.
    pub fn mask_for_pair(&self, swap: Swap) -> &B {
        &self.pair[self.slot(swap)]
    }

    pub fn inverted_mask_for_pair(&self, swap: Swap) -> &B {
        &self.inverted_pair[self.slot(swap)]
    }

    fn slot(&self, swap: Swap) -> usize {
        assert!(
            (swap.j() as usize) < self.arity,
            "swap {} out of range for arity {}",
            swap,
            self.arity
        );
        swap.index(self.arity)
    }
}
