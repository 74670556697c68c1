//! Explored-state table shared by every branch of one search run.

use crate::bits::{BitSet, StateKey};
use crate::error::SearchError;
use crate::network::Swap;
use rustc_hash::FxHashMap;

/// What is known about a reachability set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Explored {
    /// `height` more swaps reach the goal and no fewer do; `first` starts
    /// one such continuation.
    Solved { height: usize, first: Swap },
    /// No continuation of at most `within` swaps reaches the goal.
    Unsolvable { within: usize },
}

/// Memo table keyed by reachability-set value.
///
/// Entries only ever get stronger: a solved height is never replaced by a
/// larger one and an unsolvable bound is never lowered.
pub struct ExploredTable<B: BitSet> {
    entries: FxHashMap<StateKey<B>, Explored>,
    limit: Option<usize>,
}

impl<B: BitSet> ExploredTable<B> {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            entries: FxHashMap::default(),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn get(&self, reach: &B) -> Option<Explored> {
        self.entries.get(reach).copied()
    }

    /// Records that `reach` solves in `height` swaps starting with `first`.
    pub fn record_success(
        &mut self,
        reach: &B,
        height: usize,
        first: Swap,
    ) -> Result<(), SearchError> {
        let solved = Explored::Solved { height, first };
        match self.entries.get_mut(reach) {
            Some(Explored::Solved { height: known, .. }) if *known <= height => {}
            Some(entry) => *entry = solved,
            None => self.insert(reach, solved)?,
        }
        Ok(())
    }

    /// Records that `reach` has no solution within `within` swaps, keeping
    /// the larger bound when one is already known.
    pub fn record_failure(&mut self, reach: &B, within: usize) -> Result<(), SearchError> {
        match self.entries.get_mut(reach) {
            Some(Explored::Unsolvable { within: known }) => {
                *known = (*known).max(within);
            }
            Some(Explored::Solved { .. }) => {}
            None => self.insert(reach, Explored::Unsolvable { within })?,
        }
        Ok(())
    }

    fn insert(&mut self, reach: &B, entry: Explored) -> Result<(), SearchError> {
        if let Some(limit) = self.limit {
            if self.entries.len() >= limit {
                return Err(SearchError::MemoLimitExceeded { limit });
            }
        }
        self.entries.insert(StateKey::new(reach.clone()), entry);
        Ok(())
    }

    /// Counts of solved and unsolvable entries.
    pub fn entry_counts(&self) -> (usize, usize) {
        self.entries
            .values()
            .fold((0, 0), |(solved, unsolvable), entry| match entry {
                Explored::Solved { .. } => (solved + 1, unsolvable),
                Explored::Unsolvable { .. } => (solved, unsolvable + 1),
            })
    }

    /// Entries in canonical key order, comparable across backends and runs.
    pub fn snapshot(&self) -> Vec<(Vec<u8>, Explored)> {
        let mut entries: Vec<(&StateKey<B>, &Explored)> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
            .into_iter()
            .map(|(key, entry)| (key.canonical().to_vec(), *entry))
            .collect()
    }
}

impl<B: BitSet> std::fmt::Debug for ExploredTable<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExploredTable")
            .field("len", &self.entries.len())
            .field("limit", &self.limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::WordBitVec;

    fn state(indices: &[usize]) -> WordBitVec {
        WordBitVec::from_indices(16, indices.iter().copied())
    }

    #[test]
    fn test_failure_bound_only_rises() {
        let mut table = ExploredTable::new(None);
        let reach = state(&[1, 2]);
        table.record_failure(&reach, 3).unwrap();
        table.record_failure(&reach, 1).unwrap();
        assert_eq!(table.get(&reach), Some(Explored::Unsolvable { within: 3 }));
        table.record_failure(&reach, 5).unwrap();
        assert_eq!(table.get(&reach), Some(Explored::Unsolvable { within: 5 }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_success_keeps_smallest_height() {
        let mut table = ExploredTable::new(None);
        let reach = state(&[3]);
        table.record_success(&reach, 4, Swap::new(0, 1)).unwrap();
        table.record_success(&reach, 6, Swap::new(1, 2)).unwrap();
        assert_eq!(
            table.get(&reach),
            Some(Explored::Solved {
                height: 4,
                first: Swap::new(0, 1)
            })
        );
        table.record_success(&reach, 2, Swap::new(2, 3)).unwrap();
        assert_eq!(
            table.get(&reach),
            Some(Explored::Solved {
                height: 2,
                first: Swap::new(2, 3)
            })
        );
    }

    #[test]
    fn test_success_replaces_failure_but_not_the_reverse() {
        let mut table = ExploredTable::new(None);
        let reach = state(&[0, 15]);
        table.record_failure(&reach, 2).unwrap();
        table.record_success(&reach, 3, Swap::new(0, 3)).unwrap();
        table.record_failure(&reach, 7).unwrap();
        assert!(matches!(
            table.get(&reach),
            Some(Explored::Solved { height: 3, .. })
        ));
        assert_eq!(table.entry_counts(), (1, 0));
    }

    #[test]
    fn test_limit_aborts_insertion() {
        let mut table = ExploredTable::new(Some(1));
        table.record_failure(&state(&[1]), 1).unwrap();
        // Updating an existing entry is always allowed.
        table.record_failure(&state(&[1]), 2).unwrap();
        assert_eq!(
            table.record_failure(&state(&[2]), 1),
            Err(SearchError::MemoLimitExceeded { limit: 1 })
        );
    }

    #[test]
    fn test_snapshot_is_ordered() {
        let mut table = ExploredTable::new(None);
        table.record_failure(&state(&[9]), 1).unwrap();
        table.record_failure(&state(&[0]), 2).unwrap();
        table.record_success(&state(&[4]), 1, Swap::new(0, 1)).unwrap();
        let snapshot = table.snapshot();
        let keys: Vec<Vec<u8>> = snapshot.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![vec![0x00, 0x02], vec![0x01, 0x00], vec![0x10, 0x00]]);
    }
}
