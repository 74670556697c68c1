//! Memo-table key with cached hash and canonical form.

use super::BitSet;
use std::borrow::Borrow;
use std::cell::OnceCell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An owned reachability set wrapped for use as a hash-table key.
///
/// The content hash is computed on first use and reused whenever the table
/// rehashes. The canonical byte form (LSB-first packed bytes, exactly
/// `ceil(len / 8)` of them) is only built when ordering or printing asks for
/// it, so equality and hashing stay on the fast word representation.
pub struct StateKey<B> {
    bits: B,
    hash: OnceCell<u64>,
    canonical: OnceCell<Box<[u8]>>,
}

impl<B: BitSet> StateKey<B> {
    pub fn new(bits: B) -> Self {
        Self {
            bits,
            hash: OnceCell::new(),
            canonical: OnceCell::new(),
        }
    }

    /// Cached content hash.
    pub fn hash_value(&self) -> u64 {
        *self.hash.get_or_init(|| self.bits.content_hash())
    }

    /// Cached canonical byte form.
    pub fn canonical(&self) -> &[u8] {
        self.canonical.get_or_init(|| canonical_bytes(&self.bits))
    }

    /// True once the canonical form has been materialized.
    pub fn has_canonical(&self) -> bool {
        self.canonical.get().is_some()
    }
}

/// Packs a bit vector into LSB-first bytes, independent of the backend's
/// word layout.
pub fn canonical_bytes<B: BitSet>(bits: &B) -> Box<[u8]> {
    let byte_len = (bits.len() + 7) / 8;
    bits.words()
        .iter()
        .flat_map(|word| word.to_le_bytes())
        .take(byte_len)
        .collect()
}

impl<B: BitSet> Clone for StateKey<B> {
    fn clone(&self) -> Self {
        Self {
            bits: self.bits.clone(),
            hash: self.hash.clone(),
            canonical: self.canonical.clone(),
        }
    }
}

impl<B: BitSet> PartialEq for StateKey<B> {
    fn eq(&self, other: &Self) -> bool {
        if self.hash_value() != other.hash_value() {
            return false;
        }
        self.bits == other.bits
    }
}

impl<B: BitSet> Eq for StateKey<B> {}

// Must agree with `B: Hash` so lookups through `Borrow<B>` land in the same
// bucket.
impl<B: BitSet> Hash for StateKey<B> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl<B: BitSet> Borrow<B> for StateKey<B> {
    fn borrow(&self) -> &B {
        &self.bits
    }
}

impl<B: BitSet> PartialOrd for StateKey<B> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<B: BitSet> Ord for StateKey<B> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bits
            .len()
            .cmp(&other.bits.len())
            .then_with(|| self.canonical().cmp(other.canonical()))
    }
}

impl<B: BitSet> fmt::Debug for StateKey<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateKey")
            .field("len", &self.bits.len())
            .field("hash", &format_args!("{:#018x}", self.hash_value()))
            .finish()
    }
}

impl<B: BitSet> fmt::Display for StateKey<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.canonical() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
