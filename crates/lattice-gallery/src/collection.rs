//! Ordered slot storage with unrealized placeholders.
//!
//! [`IndexedCollection`] is the storage behind both the top-level group list
//! and every group's child list. A slot is either realized (holds a key) or
//! unrealized (created by [`IndexedCollection::set_count`] and filled later).
//! Positions are dense: inserting shifts later slots right, removing shifts
//! them left.
//!
//! `index_of` remembers the last position it resolved. Painting and keyboard
//! navigation tend to look up neighbors of the previous item, so the cached
//! position and its two neighbors are checked before a linear scan that
//! starts from whichever end is closer to the cached position.

use std::cell::Cell;

use lattice_gallery_core::logging::targets;

use crate::error::{GalleryError, Result};

/// The state of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<K> {
    /// Placeholder awaiting materialization.
    Unrealized,
    /// Slot holding a realized key.
    Realized(K),
}

impl<K: Copy> Slot<K> {
    /// The realized key, if any.
    pub fn key(self) -> Option<K> {
        match self {
            Slot::Realized(key) => Some(key),
            Slot::Unrealized => None,
        }
    }
}

/// Ordered slots with shift-based insert/remove and a last-index cache.
#[derive(Debug, Clone)]
pub struct IndexedCollection<K> {
    slots: Vec<Option<K>>,
    last_index: Cell<usize>,
}

impl<K> Default for IndexedCollection<K> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            last_index: Cell::new(0),
        }
    }
}

impl<K: Copy + Eq> IndexedCollection<K> {
    /// Collection with no slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots, realized or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// No slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of realized slots.
    pub fn realized_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Resize to `count` slots.
    ///
    /// Existing entries keep their positions; new slots are unrealized.
    /// Returns the keys that fell off the end so the caller can dispose them.
    pub fn set_count(&mut self, count: usize) -> Vec<K> {
        if count == 0 {
            return self.clear();
        }
        let dropped = if count < self.slots.len() {
            self.slots.drain(count..).flatten().collect()
        } else {
            Vec::new()
        };
        self.slots.resize(count, None);
        tracing::trace!(target: targets::COLLECTION, count, dropped = dropped.len(), "set slot count");
        dropped
    }

    /// Remove every slot, returning the realized keys.
    pub fn clear(&mut self) -> Vec<K> {
        let keys = std::mem::take(&mut self.slots).into_iter().flatten().collect();
        self.last_index.set(0);
        keys
    }

    /// Turn every slot back into an unrealized placeholder, keeping the count.
    pub fn reset(&mut self) -> Vec<K> {
        let keys = self.slots.iter_mut().filter_map(Option::take).collect();
        self.last_index.set(0);
        keys
    }

    /// Insert `key` at `position`, or append when `position` is `None`.
    ///
    /// Returns the position the key landed at.
    pub fn insert(&mut self, key: K, position: Option<usize>) -> Result<usize> {
        let count = self.slots.len();
        let position = position.unwrap_or(count);
        if position > count {
            return Err(GalleryError::InvalidRange { position, count });
        }
        self.slots.insert(position, Some(key));
        self.last_index.set(position);
        Ok(position)
    }

    /// Remove the slot at `position`, returning its key if it was realized.
    pub fn remove_at(&mut self, position: usize) -> Result<Option<K>> {
        let count = self.slots.len();
        if position >= count {
            return Err(GalleryError::InvalidRange { position, count });
        }
        if count == 1 {
            let key = self.slots[0];
            self.slots = Vec::new();
            self.last_index.set(0);
            return Ok(key);
        }
        Ok(self.slots.remove(position))
    }

    /// Slot state at `position`, or `None` when out of range.
    pub fn get(&self, position: usize) -> Option<Slot<K>> {
        self.slots.get(position).map(|slot| match slot {
            Some(key) => Slot::Realized(*key),
            None => Slot::Unrealized,
        })
    }

    /// Realized key at `position`.
    pub fn key_at(&self, position: usize) -> Option<K> {
        self.slots.get(position).copied().flatten()
    }

    /// Fill an unrealized slot, or replace a realized one.
    ///
    /// Returns the key previously stored there.
    pub fn set(&mut self, position: usize, key: K) -> Result<Option<K>> {
        let count = self.slots.len();
        let slot = self
            .slots
            .get_mut(position)
            .ok_or(GalleryError::InvalidRange { position, count })?;
        Ok(slot.replace(key))
    }

    /// Turn the slot at `position` back into a placeholder.
    pub fn unrealize(&mut self, position: usize) -> Option<K> {
        self.slots.get_mut(position).and_then(Option::take)
    }

    /// Position of `key`, or `None` when it is not stored here.
    pub fn index_of(&self, key: K) -> Option<usize> {
        let count = self.slots.len();
        if count == 0 {
            return None;
        }
        let last = self.last_index.get();

        if last >= 1 && last + 1 < count {
            for candidate in [last, last + 1, last - 1] {
                if self.slots[candidate] == Some(key) {
                    self.last_index.set(candidate);
                    return Some(candidate);
                }
            }
        }

        let found = if last < count / 2 {
            self.slots.iter().position(|slot| *slot == Some(key))
        } else {
            self.slots.iter().rposition(|slot| *slot == Some(key))
        };
        if let Some(index) = found {
            self.last_index.set(index);
        }
        found
    }

    /// Iterate over slots in order.
    pub fn iter(&self) -> impl Iterator<Item = Slot<K>> + '_ {
        self.slots.iter().map(|slot| match slot {
            Some(key) => Slot::Realized(*key),
            None => Slot::Unrealized,
        })
    }

    /// Iterate over realized keys with their positions.
    pub fn realized(&self) -> impl Iterator<Item = (usize, K)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|key| (index, key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(keys: &[u32]) -> IndexedCollection<u32> {
        let mut collection = IndexedCollection::new();
        for &key in keys {
            collection.insert(key, None).unwrap();
        }
        collection
    }

    #[test]
    fn test_insert_at_front_shifts() {
        let mut collection = filled(&[1, 2, 3]);
        assert_eq!(collection.insert(9, Some(0)), Ok(0));
        let keys: Vec<_> = collection.iter().filter_map(Slot::key).collect();
        assert_eq!(keys, vec![9, 1, 2, 3]);
        assert_eq!(collection.index_of(1), Some(1));
        assert_eq!(collection.index_of(3), Some(3));
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut collection = filled(&[1, 2]);
        assert_eq!(
            collection.insert(5, Some(3)),
            Err(GalleryError::InvalidRange { position: 3, count: 2 })
        );
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_remove_only_element_empties() {
        let mut collection = filled(&[7]);
        assert_eq!(collection.remove_at(0), Ok(Some(7)));
        assert!(collection.is_empty());
        assert_eq!(collection.index_of(7), None);
    }

    #[test]
    fn test_remove_shifts_left() {
        let mut collection = filled(&[1, 2, 3, 4]);
        assert_eq!(collection.remove_at(1), Ok(Some(2)));
        assert_eq!(collection.index_of(3), Some(1));
        assert_eq!(collection.index_of(4), Some(2));
        assert!(collection.remove_at(3).is_err());
    }

    #[test]
    fn test_set_count_preserves_and_drops() {
        let mut collection = filled(&[1, 2, 3]);
        let dropped = collection.set_count(5);
        assert!(dropped.is_empty());
        assert_eq!(collection.get(4), Some(Slot::Unrealized));
        assert_eq!(collection.get(0), Some(Slot::Realized(1)));
        assert_eq!(collection.get(5), None);

        let dropped = collection.set_count(2);
        assert_eq!(dropped, vec![3]);
        assert_eq!(collection.len(), 2);

        let dropped = collection.set_count(0);
        assert_eq!(dropped, vec![1, 2]);
        assert!(collection.is_empty());
    }

    #[test]
    fn test_materialize_slot() {
        let mut collection = IndexedCollection::new();
        collection.set_count(3);
        assert_eq!(collection.realized_count(), 0);
        assert_eq!(collection.set(1, 42u32), Ok(None));
        assert_eq!(collection.key_at(1), Some(42));
        assert_eq!(collection.index_of(42), Some(1));
        assert_eq!(collection.unrealize(1), Some(42));
        assert_eq!(collection.get(1), Some(Slot::Unrealized));
    }

    #[test]
    fn test_index_of_uses_neighbors() {
        let collection = filled(&[10, 11, 12, 13, 14, 15]);
        assert_eq!(collection.index_of(13), Some(3));
        assert_eq!(collection.index_of(14), Some(4));
        assert_eq!(collection.index_of(12), Some(2));
        assert_eq!(collection.index_of(10), Some(0));
        assert_eq!(collection.index_of(15), Some(5));
        assert_eq!(collection.index_of(99), None);
    }

    #[test]
    fn test_reset_keeps_count() {
        let mut collection = filled(&[1, 2, 3]);
        assert_eq!(collection.reset(), vec![1, 2, 3]);
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.realized_count(), 0);
    }
}
