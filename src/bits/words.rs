//! Heap-backed word-chunked bit vector.

use super::{impl_bit_ops, word_count, BitSet};

/// Bit vector stored as `ceil(len / 64)` little-endian `u64` words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBitVec {
    len: usize,
    words: Vec<u64>,
}

impl BitSet for WordBitVec {
    const MAX_LEN: usize = 1 << 24;
    const BACKEND: &'static str = "words";

    fn zeros(len: usize) -> Self {
        assert!(
            len <= Self::MAX_LEN,
            "width {} exceeds the word backend limit of {} bits",
            len,
            Self::MAX_LEN
        );
        Self {
            len,
            words: vec![0; word_count(len)],
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn words(&self) -> &[u64] {
        &self.words
    }

    #[inline]
    fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }
}

impl_bit_ops!(WordBitVec);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_and_ones() {
        let zeros = WordBitVec::zeros(100);
        assert_eq!(zeros.len(), 100);
        assert!(zeros.none());

        let ones = WordBitVec::ones(100);
        assert_eq!(ones.count_ones(), 100);
        assert!(ones.get(99));
        // Tail bits past the width stay clear.
        assert_eq!(ones.words()[1], (1u64 << 36) - 1);
    }

    #[test]
    fn test_get_set_zero() {
        let mut set = WordBitVec::zeros(256);
        set.set(0, true);
        set.set(200, true);
        assert!(set.get(0));
        assert!(set.get(200));
        assert!(!set.get(1));
        set.set(0, false);
        assert!(!set.get(0));
        set.zero();
        assert!(set.none());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range_panics() {
        let set = WordBitVec::zeros(8);
        set.get(8);
    }

    #[test]
    #[should_panic(expected = "width mismatch")]
    fn test_width_mismatch_panics() {
        let mut a = WordBitVec::zeros(8);
        let b = WordBitVec::zeros(16);
        a.and_assign(&b);
    }

    #[test]
    fn test_operators() {
        let a = WordBitVec::from_indices(8, [0, 1, 2]);
        let b = WordBitVec::from_indices(8, [2, 3]);

        assert_eq!(&a & &b, WordBitVec::from_indices(8, [2]));
        assert_eq!(&a | &b, WordBitVec::from_indices(8, [0, 1, 2, 3]));
        assert_eq!(&a ^ &b, WordBitVec::from_indices(8, [0, 1, 3]));
        assert_eq!(!&a, WordBitVec::from_indices(8, [3, 4, 5, 6, 7]));
        assert_eq!(&a << 5, WordBitVec::from_indices(8, [5, 6, 7]));
        assert_eq!(&a >> 1, WordBitVec::from_indices(8, [0, 1]));

        let mut c = a.clone();
        c &= &b;
        c |= &WordBitVec::from_indices(8, [7]);
        c ^= &WordBitVec::from_indices(8, [2]);
        assert_eq!(c, WordBitVec::from_indices(8, [7]));
    }

    #[test]
    fn test_and_out_writes_scratch() {
        let a = WordBitVec::from_indices(130, [1, 64, 129]);
        let b = WordBitVec::from_indices(130, [64, 129]);
        let mut scratch = WordBitVec::ones(130);
        a.and_out(&b, &mut scratch);
        assert_eq!(scratch, WordBitVec::from_indices(130, [64, 129]));
    }

    #[test]
    fn test_ones_iter() {
        let set = WordBitVec::from_indices(300, [3, 64, 65, 299]);
        let collected: Vec<usize> = set.ones_iter().collect();
        assert_eq!(collected, vec![3, 64, 65, 299]);
    }

    #[test]
    fn test_display_groups_lsb_first() {
        let set = WordBitVec::from_indices(16, [0, 9]);
        assert_eq!(set.to_string(), "10000000 01000000");
    }

    #[test]
    fn test_hash_matches_content() {
        let a = WordBitVec::from_indices(64, [1, 5]);
        let mut b = WordBitVec::zeros(64);
        b.set(5, true);
        b.set(1, true);
        assert_eq!(a.content_hash(), b.content_hash());
        b.set(6, true);
        assert_ne!(a.content_hash(), b.content_hash());
    }
}
