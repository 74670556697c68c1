//! Candidate swap generation for search drivers

use crate::bits::BitSet;
use crate::network::Swap;
use crate::semantics::SwapTransform;

/// Generate the swaps worth trying from `reach`, in lexicographic order.
///
/// Skips the swap just applied (a compare-exchange is idempotent) and swaps
/// that would not move any reachable pattern.
pub fn useful_swaps<B: BitSet>(
    transform: &SwapTransform<B>,
    reach: &B,
    previous: Option<Swap>,
) -> Vec<Swap> {
    Swap::pairs(transform.arity())
        .filter(|&swap| Some(swap) != previous)
        .filter(|&swap| transform.will_change(reach, swap))
        .collect()
}

/// Generate every distinct child state of `reach` together with the swap
/// leading to it. Swaps producing a child already listed are dropped, keeping
/// the first in lexicographic order.
pub fn distinct_children<B: BitSet>(
    transform: &mut SwapTransform<B>,
    reach: &B,
    previous: Option<Swap>,
) -> Vec<(Swap, B)> {
    let mut children: Vec<(Swap, B)> = Vec::new();
    for swap in useful_swaps(transform, reach, previous) {
        let mut child = reach.clone();
        transform.compare_swap(&mut child, swap);
        if children.iter().all(|(_, seen)| *seen != child) {
            children.push((swap, child));
        }
    }
    children
}
