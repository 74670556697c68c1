//! Property-based tests for the bit-vector engine and the swap transform
//!
//! Bit vectors are checked against a naive `Vec<bool>` model, and the mask
//! algebra against replaying networks one input at a time.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use swapnet::bits::{BitSet, LaneBitVec, WordBitVec};
use swapnet::network::{Network, Swap};
use swapnet::semantics::{MaskFactory, SwapTransform};
use swapnet::validation::network_image;

// ============================================================================
// Helper functions
// ============================================================================

fn to_model<B: BitSet>(bits: &B) -> Vec<bool> {
    (0..bits.len()).map(|i| bits.get(i)).collect()
}

fn from_model(model: &[bool]) -> WordBitVec {
    WordBitVec::from_indices(
        model.len(),
        model.iter().enumerate().filter(|(_, b)| **b).map(|(i, _)| i),
    )
}

fn shl_model(model: &[bool], n: usize) -> Vec<bool> {
    (0..model.len())
        .map(|m| m >= n && model[m - n])
        .collect()
}

fn shr_model(model: &[bool], n: usize) -> Vec<bool> {
    (0..model.len())
        .map(|m| m + n < model.len() && model[m + n])
        .collect()
}

fn transform(arity: usize) -> SwapTransform<WordBitVec> {
    SwapTransform::new(
        Arc::new(MaskFactory::new(arity)),
        WordBitVec::zeros(1 << arity),
    )
}

fn swap_strategy(arity: u8) -> impl Strategy<Value = Swap> {
    (0..arity - 1)
        .prop_flat_map(move |i| (Just(i), i + 1..arity))
        .prop_map(|(i, j)| Swap::new(i, j))
}

fn reach_strategy(arity: usize) -> impl Strategy<Value = WordBitVec> {
    prop::collection::vec(any::<bool>(), 1 << arity).prop_map(|model| from_model(&model))
}

// ============================================================================
// Bit-vector properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_shifts_match_model(
        model in prop::collection::vec(any::<bool>(), 1..300),
        n in 0usize..320,
    ) {
        let bits = from_model(&model);

        let mut left = bits.clone();
        left.shl_assign(n);
        prop_assert_eq!(to_model(&left), shl_model(&model, n));

        let mut right = bits.clone();
        right.shr_assign(n);
        prop_assert_eq!(to_model(&right), shr_model(&model, n));
    }

    #[test]
    fn prop_bitwise_ops_match_model(
        pair in (1usize..300).prop_flat_map(|len| (
            prop::collection::vec(any::<bool>(), len),
            prop::collection::vec(any::<bool>(), len),
        )),
    ) {
        let (a, b) = pair;
        let x = from_model(&a);
        let y = from_model(&b);

        let and: Vec<bool> = a.iter().zip(&b).map(|(p, q)| *p && *q).collect();
        let or: Vec<bool> = a.iter().zip(&b).map(|(p, q)| *p || *q).collect();
        let xor: Vec<bool> = a.iter().zip(&b).map(|(p, q)| p != q).collect();
        let not: Vec<bool> = a.iter().map(|p| !p).collect();

        prop_assert_eq!(to_model(&(&x & &y)), and.clone());
        prop_assert_eq!(to_model(&(&x | &y)), or);
        prop_assert_eq!(to_model(&(&x ^ &y)), xor);
        prop_assert_eq!(to_model(&!&x), not);
        prop_assert_eq!(x.intersects(&y), and.iter().any(|&bit| bit));
        prop_assert_eq!(x.count_ones(), a.iter().filter(|&&bit| bit).count());

        let mut scratch = WordBitVec::zeros(a.len());
        x.and_out(&y, &mut scratch);
        prop_assert_eq!(to_model(&scratch), and);
    }

    #[test]
    fn prop_equal_sets_hash_equal(model in prop::collection::vec(any::<bool>(), 1..256)) {
        let words = from_model(&model);
        let lanes = LaneBitVec::from_indices(
            model.len(),
            model.iter().enumerate().filter(|(_, b)| **b).map(|(i, _)| i),
        );
        prop_assert_eq!(words.content_hash(), lanes.content_hash());
        prop_assert_eq!(to_model(&lanes), model);
    }
}

// ============================================================================
// Mask and transform properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_masks_partition_domain(arity in 2usize..=6, raw in any::<(u8, u8)>()) {
        let masks: MaskFactory<WordBitVec> = MaskFactory::new(arity);
        let i = raw.0 % (arity as u8 - 1);
        let j = i + 1 + raw.1 % (arity as u8 - 1 - i);
        let swap = Swap::new(i, j);

        let mask = masks.mask_for_pair(swap);
        let inverted = masks.inverted_mask_for_pair(swap);
        prop_assert!(!mask.intersects(inverted));
        prop_assert_eq!(mask | inverted, WordBitVec::ones(1 << arity));
        for p in 0..(1usize << arity) {
            let expected = (p >> i) & 1 == 0 && (p >> j) & 1 == 1;
            prop_assert_eq!(mask.get(p), expected);
        }
    }

    #[test]
    fn prop_compare_swap_is_idempotent(reach in reach_strategy(4), swap in swap_strategy(4)) {
        let mut t = transform(4);
        let mut once = reach.clone();
        t.compare_swap(&mut once, swap);
        let mut twice = once.clone();
        t.compare_swap(&mut twice, swap);
        prop_assert_eq!(&once, &twice);
        prop_assert!(!t.will_change(&once, swap));
        prop_assert!(once.count_ones() <= reach.count_ones());
    }

    #[test]
    fn prop_transform_matches_scalar_replay(
        swaps in prop::collection::vec(swap_strategy(5), 0..12),
    ) {
        let network = Network::from_swaps(swaps);
        let mut t = transform(5);
        let mut reach = t.full_set();
        for &swap in &network {
            t.compare_swap(&mut reach, swap);
        }
        let image: WordBitVec = network_image(&network, 5);
        prop_assert_eq!(reach, image);
    }
}

// ============================================================================
// Seeded cross-checks between backends
// ============================================================================

#[test]
fn test_backends_agree_on_random_operations() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for _ in 0..200 {
        let len = rng.random_range(1..=256);
        let indices: Vec<usize> = (0..len).filter(|_| rng.random_bool(0.4)).collect();
        let others: Vec<usize> = (0..len).filter(|_| rng.random_bool(0.6)).collect();

        let mut words = WordBitVec::from_indices(len, indices.iter().copied());
        let mut lanes = LaneBitVec::from_indices(len, indices.iter().copied());
        let words_other = WordBitVec::from_indices(len, others.iter().copied());
        let lanes_other = LaneBitVec::from_indices(len, others.iter().copied());

        assert_eq!(words.intersects(&words_other), lanes.intersects(&lanes_other));

        match rng.random_range(0..5) {
            0 => {
                words.and_assign(&words_other);
                lanes.and_assign(&lanes_other);
            }
            1 => {
                words.or_assign(&words_other);
                lanes.or_assign(&lanes_other);
            }
            2 => {
                words.xor_assign(&words_other);
                lanes.xor_assign(&lanes_other);
            }
            3 => {
                let n = rng.random_range(0..len + 8);
                words.shl_assign(n);
                lanes.shl_assign(n);
            }
            _ => {
                let n = rng.random_range(0..len + 8);
                words.shr_assign(n);
                lanes.shr_assign(n);
            }
        }

        assert_eq!(to_model(&words), to_model(&lanes));
        assert_eq!(words.content_hash(), lanes.content_hash());
        assert_eq!(words.none(), lanes.none());
    }
}

#[test]
fn test_random_networks_match_scalar_replay() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let arity = rng.random_range(2..=8usize);
        let length = rng.random_range(0..20);
        let network = Network::from_swaps(
            (0..length)
                .map(|_| {
                    let i = rng.random_range(0..arity - 1) as u8;
                    let j = rng.random_range(i as usize + 1..arity) as u8;
                    Swap::new(i, j)
                })
                .collect(),
        );

        let mut t: SwapTransform<LaneBitVec> = SwapTransform::new(
            Arc::new(MaskFactory::new(arity)),
            LaneBitVec::zeros(1 << arity),
        );
        let mut reach = t.full_set();
        for &swap in &network {
            t.compare_swap(&mut reach, swap);
        }
        let image: LaneBitVec = network_image(&network, arity);
        assert_eq!(reach, image, "network {}", network);
    }
}
