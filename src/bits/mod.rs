//! Dense fixed-width bit vectors used as reachability sets.
//!
//! A reachability set over `k` inputs is a vector of `2^k` bits where bit `p`
//! says whether the input pattern `p` can still appear at the output of the
//! network built so far. Two backends implement the same [`BitSet`] contract:
//!
//! - [`WordBitVec`]: heap-allocated `u64` words, any width
//! - [`LaneBitVec`]: one inline 256-bit lane, widths up to 256 (`k <= 8`),
//!   using AVX2 for the bitwise operations when the `simd` feature is on and
//!   the target enables `avx2`
//!
//! The search code is generic over `B: BitSet`; [`ReachSet`] is the backend
//! picked at build time.

pub mod key;
pub mod lanes;
pub mod words;

pub use key::StateKey;
pub use lanes::LaneBitVec;
pub use words::WordBitVec;

use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Backend used by the search engine.
#[cfg(feature = "simd")]
pub type ReachSet = LaneBitVec;

/// Backend used by the search engine.
#[cfg(not(feature = "simd"))]
pub type ReachSet = WordBitVec;

/// Number of `u64` words needed for `len` bits.
pub const fn word_count(len: usize) -> usize {
    (len + 63) / 64
}

/// Mask of the valid bits in the last word of a `len`-bit vector.
pub const fn tail_mask(len: usize) -> u64 {
    match len % 64 {
        0 => u64::MAX,
        r => (1u64 << r) - 1,
    }
}

/// Clears the bits at index `>= len` in the last active word.
pub(crate) fn clear_tail(words: &mut [u64], len: usize) {
    if let Some(last) = words.last_mut() {
        *last &= tail_mask(len);
    }
}

/// Shifts `len` bits toward higher indices: bit `m` moves to `m + n`.
pub(crate) fn shl_words(words: &mut [u64], len: usize, n: usize) {
    if n >= len {
        words.fill(0);
        return;
    }
    let word_shift = n / 64;
    let bit_shift = n % 64;
    for idx in (0..words.len()).rev() {
        let mut value = 0;
        if idx >= word_shift {
            let src = idx - word_shift;
            value = words[src] << bit_shift;
            if bit_shift != 0 && src > 0 {
                value |= words[src - 1] >> (64 - bit_shift);
            }
        }
        words[idx] = value;
    }
    clear_tail(words, len);
}

/// Shifts `len` bits toward lower indices: bit `m` moves to `m - n`.
pub(crate) fn shr_words(words: &mut [u64], len: usize, n: usize) {
    if n >= len {
        words.fill(0);
        return;
    }
    let word_shift = n / 64;
    let bit_shift = n % 64;
    let count = words.len();
    for idx in 0..count {
        let src = idx + word_shift;
        let mut value = 0;
        if src < count {
            value = words[src] >> bit_shift;
            if bit_shift != 0 && src + 1 < count {
                value |= words[src + 1] << (64 - bit_shift);
            }
        }
        words[idx] = value;
    }
}

/// Seed-free hash over the width and the active words. Identical across runs
/// and across backends holding the same content.
pub(crate) fn hash_words(len: usize, words: &[u64]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write_usize(len);
    for &word in words {
        hasher.write_u64(word);
    }
    hasher.finish()
}

/// LSB-first rendering in groups of eight bits.
pub(crate) fn fmt_bits(f: &mut fmt::Formatter<'_>, len: usize, words: &[u64]) -> fmt::Result {
    for index in 0..len {
        if index > 0 && index % 8 == 0 {
            f.write_str(" ")?;
        }
        let bit = (words[index / 64] >> (index % 64)) & 1;
        f.write_str(if bit == 1 { "1" } else { "0" })?;
    }
    Ok(())
}

#[inline]
fn check_width(lhs: usize, rhs: usize) {
    assert_eq!(lhs, rhs, "bit vector width mismatch: {} vs {}", lhs, rhs);
}

/// Capability interface shared by every reachability-set backend.
///
/// Backends only provide storage; the algebra is written once here against
/// the active word slice and may be overridden with vectorized versions.
/// Bits at index `>= len()` are always zero. Operands of binary operations
/// must have equal widths; a mismatch panics.
pub trait BitSet: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Largest width the backend can hold.
    const MAX_LEN: usize;
    /// Short backend name for logs and statistics.
    const BACKEND: &'static str;

    /// All-zero vector of `len` bits.
    fn zeros(len: usize) -> Self;

    /// Width in bits.
    fn len(&self) -> usize;

    /// Active little-endian words (`word_count(len())` of them).
    fn words(&self) -> &[u64];

    fn words_mut(&mut self) -> &mut [u64];

    /// All-one vector of `len` bits.
    fn ones(len: usize) -> Self {
        let mut set = Self::zeros(len);
        set.invert();
        set
    }

    /// Vector with exactly the listed bits set.
    fn from_indices<I: IntoIterator<Item = usize>>(len: usize, indices: I) -> Self {
        let mut set = Self::zeros(len);
        for index in indices {
            set.set(index, true);
        }
        set
    }

    fn get(&self, index: usize) -> bool {
        assert!(
            index < self.len(),
            "bit index {} out of range for width {}",
            index,
            self.len()
        );
        (self.words()[index / 64] >> (index % 64)) & 1 == 1
    }

    fn set(&mut self, index: usize, bit: bool) {
        assert!(
            index < self.len(),
            "bit index {} out of range for width {}",
            index,
            self.len()
        );
        let word = &mut self.words_mut()[index / 64];
        let mask = 1u64 << (index % 64);
        if bit {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Clears every bit.
    fn zero(&mut self) {
        self.words_mut().fill(0);
    }

    /// True when no bit is set.
    fn none(&self) -> bool {
        self.words().iter().all(|&w| w == 0)
    }

    /// True when `self & other` is non-empty.
    fn intersects(&self, other: &Self) -> bool {
        check_width(self.len(), other.len());
        self.words()
            .iter()
            .zip(other.words())
            .any(|(a, b)| a & b != 0)
    }

    fn count_ones(&self) -> usize {
        self.words().iter().map(|w| w.count_ones() as usize).sum()
    }

    fn invert(&mut self) {
        let len = self.len();
        let words = self.words_mut();
        for word in words.iter_mut() {
            *word = !*word;
        }
        clear_tail(words, len);
    }

    fn and_assign(&mut self, other: &Self) {
        check_width(self.len(), other.len());
        for (a, b) in self.words_mut().iter_mut().zip(other.words()) {
            *a &= *b;
        }
    }

    fn or_assign(&mut self, other: &Self) {
        check_width(self.len(), other.len());
        for (a, b) in self.words_mut().iter_mut().zip(other.words()) {
            *a |= *b;
        }
    }

    fn xor_assign(&mut self, other: &Self) {
        check_width(self.len(), other.len());
        for (a, b) in self.words_mut().iter_mut().zip(other.words()) {
            *a ^= *b;
        }
    }

    /// Overwrites `self` with `other` without reallocating.
    fn copy_from(&mut self, other: &Self) {
        check_width(self.len(), other.len());
        self.words_mut().copy_from_slice(other.words());
    }

    /// Writes `self & other` into caller-owned scratch.
    fn and_out(&self, other: &Self, out: &mut Self) {
        check_width(self.len(), other.len());
        check_width(self.len(), out.len());
        for ((o, a), b) in out.words_mut().iter_mut().zip(self.words()).zip(other.words()) {
            *o = *a & *b;
        }
    }

    /// Bit `m` moves to `m + n`; `n >= len()` clears the vector.
    fn shl_assign(&mut self, n: usize) {
        let len = self.len();
        shl_words(self.words_mut(), len, n);
    }

    /// Bit `m` moves to `m - n`; `n >= len()` clears the vector.
    fn shr_assign(&mut self, n: usize) {
        let len = self.len();
        shr_words(self.words_mut(), len, n);
    }

    /// Stable content hash used for memo keys.
    fn content_hash(&self) -> u64 {
        hash_words(self.len(), self.words())
    }

    fn complement(&self) -> Self {
        let mut out = self.clone();
        out.invert();
        out
    }

    fn intersection(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.and_assign(other);
        out
    }

    fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.or_assign(other);
        out
    }

    fn symmetric_difference(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.xor_assign(other);
        out
    }

    /// Indices of the set bits in ascending order.
    fn ones_iter(&self) -> Ones<'_> {
        Ones {
            words: self.words(),
            word_index: 0,
            current: self.words().first().copied().unwrap_or(0),
        }
    }
}

/// Iterator over set bit indices.
pub struct Ones<'a> {
    words: &'a [u64],
    word_index: usize,
    current: u64,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_index * 64 + bit);
            }
            self.word_index += 1;
            if self.word_index >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word_index];
        }
    }
}

/// Operator sugar over the [`BitSet`] algebra for a concrete backend.
macro_rules! impl_bit_ops {
    ($ty:ty) => {
        impl std::ops::Not for &$ty {
            type Output = $ty;
            fn not(self) -> $ty {
                $crate::bits::BitSet::complement(self)
            }
        }

        impl std::ops::Not for $ty {
            type Output = $ty;
            fn not(mut self) -> $ty {
                $crate::bits::BitSet::invert(&mut self);
                self
            }
        }

        impl std::ops::BitAnd for &$ty {
            type Output = $ty;
            fn bitand(self, rhs: &$ty) -> $ty {
                $crate::bits::BitSet::intersection(self, rhs)
            }
        }

        impl std::ops::BitOr for &$ty {
            type Output = $ty;
            fn bitor(self, rhs: &$ty) -> $ty {
                $crate::bits::BitSet::union(self, rhs)
            }
        }

        impl std::ops::BitXor for &$ty {
            type Output = $ty;
            fn bitxor(self, rhs: &$ty) -> $ty {
                $crate::bits::BitSet::symmetric_difference(self, rhs)
            }
        }

        impl std::ops::BitAndAssign<&$ty> for $ty {
            fn bitand_assign(&mut self, rhs: &$ty) {
                $crate::bits::BitSet::and_assign(self, rhs);
            }
        }

        impl std::ops::BitOrAssign<&$ty> for $ty {
            fn bitor_assign(&mut self, rhs: &$ty) {
                $crate::bits::BitSet::or_assign(self, rhs);
            }
        }

        impl std::ops::BitXorAssign<&$ty> for $ty {
            fn bitxor_assign(&mut self, rhs: &$ty) {
                $crate::bits::BitSet::xor_assign(self, rhs);
            }
        }

        impl std::ops::Shl<usize> for &$ty {
            type Output = $ty;
            fn shl(self, n: usize) -> $ty {
                let mut out = self.clone();
                $crate::bits::BitSet::shl_assign(&mut out, n);
                out
            }
        }

        impl std::ops::Shr<usize> for &$ty {
            type Output = $ty;
            fn shr(self, n: usize) -> $ty {
                let mut out = self.clone();
                $crate::bits::BitSet::shr_assign(&mut out, n);
                out
            }
        }

        impl std::ops::ShlAssign<usize> for $ty {
            fn shl_assign(&mut self, n: usize) {
                $crate::bits::BitSet::shl_assign(self, n);
            }
        }

        impl std::ops::ShrAssign<usize> for $ty {
            fn shr_assign(&mut self, n: usize) {
                $crate::bits::BitSet::shr_assign(self, n);
            }
        }

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                state.write_u64($crate::bits::BitSet::content_hash(self));
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                $crate::bits::fmt_bits(
                    f,
                    $crate::bits::BitSet::len(self),
                    $crate::bits::BitSet::words(self),
                )
            }
        }
    };
}

pub(crate) use impl_bit_ops;
