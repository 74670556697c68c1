//! Whole-set compare-exchange over a reachability set.

use crate::bits::BitSet;
use crate::network::Swap;
use crate::semantics::masks::MaskFactory;
use std::sync::Arc;

/// Applies swaps to every reachable pattern at once and tests the goal.
///
/// Owns one scratch vector so `compare_swap` never allocates.
#[derive(Debug, Clone)]
pub struct SwapTransform<B> {
    masks: Arc<MaskFactory<B>>,
    template: B,
    scratch: B,
}

impl<B: BitSet> SwapTransform<B> {
    /// `template` marks the patterns that must become unreachable.
    pub fn new(masks: Arc<MaskFactory<B>>, template: B) -> Self {
        assert_eq!(
            template.len(),
            masks.domain_size(),
            "violation template width does not match arity {}",
            masks.arity()
        );
        let scratch = B::zeros(masks.domain_size());
        Self {
            masks,
            template,
            scratch,
        }
    }

    pub fn masks(&self) -> &Arc<MaskFactory<B>> {
        &self.masks
    }

    pub fn template(&self) -> &B {
        &self.template
    }

    pub fn arity(&self) -> usize {
        self.masks.arity()
    }

    /// Replaces `reach` with its image under `swap`.
    ///
    /// Patterns with input `i` clear and input `j` set move down by
    /// `2^j - 2^i`, landing on the pattern with those two inputs exchanged.
    /// The moved patterns are then dropped from their old positions.
    pub fn compare_swap(&mut self, reach: &mut B, swap: Swap) {
        reach.and_out(self.masks.mask_for_pair(swap), &mut self.scratch);
        self.scratch.shr_assign(swap.shift_delta());
        reach.or_assign(&self.scratch);
        reach.and_assign(self.masks.inverted_mask_for_pair(swap));
    }

    /// True when `swap` would move at least one reachable pattern.
    #[inline]
    pub fn will_change(&self, reach: &B, swap: Swap) -> bool {
        reach.intersects(self.masks.mask_for_pair(swap))
    }

    /// Goal test: no reachable pattern is a violation.
    #[inline]
    pub fn is_allowed(&self, reach: &B) -> bool {
        !reach.intersects(&self.template)
    }

    /// Full reachability set of the empty network.
    pub fn full_set(&self) -> B {
        B::ones(self.masks.domain_size())
    }
}
