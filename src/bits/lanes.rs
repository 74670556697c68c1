//! Inline 256-bit lane bit vector.
//!
//! Holds up to 256 bits in four words, which covers every reachability set
//! for arity eight or less without touching the heap. When the crate is built
//! with the `simd` feature for an x86_64 target with `avx2` enabled, the
//! bitwise operations run on a single `__m256i`; otherwise they fall back to
//! the word loop.

use super::{clear_tail, impl_bit_ops, word_count, BitSet};

const LANE_WORDS: usize = 4;

/// Bit vector of at most 256 bits stored inline. Words past the active
/// width are kept zero so derived equality compares content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneBitVec {
    len: usize,
    words: [u64; LANE_WORDS],
}

#[cfg(all(feature = "simd", target_arch = "x86_64", target_feature = "avx2"))]
mod lane_ops {
    use core::arch::x86_64::*;

    #[inline]
    pub fn and(dest: &mut [u64; 4], src: &[u64; 4]) {
        // SAFETY: both arrays are exactly 256 bits and the target enables avx2.
        unsafe {
            let a = _mm256_loadu_si256(dest.as_ptr() as *const __m256i);
            let b = _mm256_loadu_si256(src.as_ptr() as *const __m256i);
            _mm256_storeu_si256(dest.as_mut_ptr() as *mut __m256i, _mm256_and_si256(a, b));
        }
    }

    #[inline]
    pub fn or(dest: &mut [u64; 4], src: &[u64; 4]) {
        // SAFETY: as above.
        unsafe {
            let a = _mm256_loadu_si256(dest.as_ptr() as *const __m256i);
            let b = _mm256_loadu_si256(src.as_ptr() as *const __m256i);
            _mm256_storeu_si256(dest.as_mut_ptr() as *mut __m256i, _mm256_or_si256(a, b));
        }
    }

    #[inline]
    pub fn xor(dest: &mut [u64; 4], src: &[u64; 4]) {
        // SAFETY: as above.
        unsafe {
            let a = _mm256_loadu_si256(dest.as_ptr() as *const __m256i);
            let b = _mm256_loadu_si256(src.as_ptr() as *const __m256i);
            _mm256_storeu_si256(dest.as_mut_ptr() as *mut __m256i, _mm256_xor_si256(a, b));
        }
    }

    #[inline]
    pub fn and_into(out: &mut [u64; 4], a: &[u64; 4], b: &[u64; 4]) {
        // SAFETY: as above.
        unsafe {
            let x = _mm256_loadu_si256(a.as_ptr() as *const __m256i);
            let y = _mm256_loadu_si256(b.as_ptr() as *const __m256i);
            _mm256_storeu_si256(out.as_mut_ptr() as *mut __m256i, _mm256_and_si256(x, y));
        }
    }

    #[inline]
    pub fn intersects(a: &[u64; 4], b: &[u64; 4]) -> bool {
        // SAFETY: as above.
        unsafe {
            let x = _mm256_loadu_si256(a.as_ptr() as *const __m256i);
            let y = _mm256_loadu_si256(b.as_ptr() as *const __m256i);
            _mm256_testz_si256(x, y) == 0
        }
    }

    #[inline]
    pub fn is_zero(words: &[u64; 4]) -> bool {
        // SAFETY: as above.
        unsafe {
            let v = _mm256_loadu_si256(words.as_ptr() as *const __m256i);
            _mm256_testz_si256(v, v) == 1
        }
    }
}

#[cfg(not(all(feature = "simd", target_arch = "x86_64", target_feature = "avx2")))]
mod lane_ops {
    #[inline]
    pub fn and(dest: &mut [u64; 4], src: &[u64; 4]) {
        for (a, b) in dest.iter_mut().zip(src) {
            *a &= *b;
        }
    }

    #[inline]
    pub fn or(dest: &mut [u64; 4], src: &[u64; 4]) {
        for (a, b) in dest.iter_mut().zip(src) {
            *a |= *b;
        }
    }

    #[inline]
    pub fn xor(dest: &mut [u64; 4], src: &[u64; 4]) {
        for (a, b) in dest.iter_mut().zip(src) {
            *a ^= *b;
        }
    }

    #[inline]
    pub fn and_into(out: &mut [u64; 4], a: &[u64; 4], b: &[u64; 4]) {
        for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
            *o = x & y;
        }
    }

    #[inline]
    pub fn intersects(a: &[u64; 4], b: &[u64; 4]) -> bool {
        a.iter().zip(b).any(|(x, y)| x & y != 0)
    }

    #[inline]
    pub fn is_zero(words: &[u64; 4]) -> bool {
        words.iter().all(|&w| w == 0)
    }
}

impl LaneBitVec {
    /// True when the AVX2 path is compiled in.
    pub const fn is_vectorized() -> bool {
        cfg!(all(feature = "simd", target_arch = "x86_64", target_feature = "avx2"))
    }

    #[inline]
    fn check_width(&self, other: &Self) {
        assert_eq!(
            self.len, other.len,
            "bit vector width mismatch: {} vs {}",
            self.len, other.len
        );
    }
}

impl BitSet for LaneBitVec {
    const MAX_LEN: usize = 64 * LANE_WORDS;
    const BACKEND: &'static str = "lanes";

    fn zeros(len: usize) -> Self {
        assert!(
            len <= Self::MAX_LEN,
            "width {} exceeds the 256-bit lane backend",
            len
        );
        Self {
            len,
            words: [0; LANE_WORDS],
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn words(&self) -> &[u64] {
        &self.words[..word_count(self.len)]
    }

    #[inline]
    fn words_mut(&mut self) -> &mut [u64] {
        let count = word_count(self.len);
        &mut self.words[..count]
    }

    #[inline]
    fn none(&self) -> bool {
        lane_ops::is_zero(&self.words)
    }

    fn invert(&mut self) {
        let count = word_count(self.len);
        for word in &mut self.words[..count] {
            *word = !*word;
        }
        clear_tail(&mut self.words[..count], self.len);
    }

    #[inline]
    fn and_assign(&mut self, other: &Self) {
        self.check_width(other);
        lane_ops::and(&mut self.words, &other.words);
    }

    #[inline]
    fn or_assign(&mut self, other: &Self) {
        self.check_width(other);
        lane_ops::or(&mut self.words, &other.words);
    }

    #[inline]
    fn xor_assign(&mut self, other: &Self) {
        self.check_width(other);
        lane_ops::xor(&mut self.words, &other.words);
    }

    #[inline]
    fn intersects(&self, other: &Self) -> bool {
        self.check_width(other);
        lane_ops::intersects(&self.words, &other.words)
    }

    #[inline]
    fn copy_from(&mut self, other: &Self) {
        self.check_width(other);
        self.words = other.words;
    }

    #[inline]
    fn and_out(&self, other: &Self, out: &mut Self) {
        self.check_width(other);
        self.check_width(out);
        lane_ops::and_into(&mut out.words, &self.words, &other.words);
    }
}

impl_bit_ops!(LaneBitVec);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::WordBitVec;

    #[test]
    fn test_lane_limits() {
        assert_eq!(LaneBitVec::MAX_LEN, 256);
        let set = LaneBitVec::ones(256);
        assert_eq!(set.count_ones(), 256);
        assert_eq!(set.words().len(), 4);
    }

    #[test]
    #[should_panic(expected = "256-bit lane")]
    fn test_lane_rejects_wide_sets() {
        let _ = LaneBitVec::zeros(512);
    }

    #[test]
    fn test_narrow_lane_keeps_upper_words_clear() {
        let mut set = LaneBitVec::ones(8);
        assert_eq!(set.words(), &[0xff]);
        set.invert();
        assert!(set.none());
        set.invert();
        set.xor_assign(&LaneBitVec::ones(8));
        assert!(set.none());
    }

    #[test]
    fn test_matches_word_backend() {
        let indices = [0usize, 3, 63, 64, 100, 128, 200, 255];
        let mut lane = LaneBitVec::from_indices(256, indices);
        let mut word = WordBitVec::from_indices(256, indices);
        assert_eq!(lane.words(), word.words());
        assert_eq!(lane.content_hash(), word.content_hash());
        assert_eq!(lane.to_string(), word.to_string());

        lane.shl_assign(37);
        word.shl_assign(37);
        assert_eq!(lane.words(), word.words());

        lane.shr_assign(101);
        word.shr_assign(101);
        assert_eq!(lane.words(), word.words());
        assert_eq!(lane.content_hash(), word.content_hash());
    }

    #[test]
    fn test_and_out_and_copy() {
        let a = LaneBitVec::from_indices(128, [1, 70, 127]);
        let b = LaneBitVec::from_indices(128, [70, 127]);
        let mut scratch = LaneBitVec::zeros(128);
        a.and_out(&b, &mut scratch);
        assert_eq!(scratch, b);

        let mut copy = LaneBitVec::zeros(128);
        copy.copy_from(&a);
        assert_eq!(copy, a);
    }
}
