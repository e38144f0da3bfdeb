//! Bounded unit inventories for containers and grabbers.
//!
//! Items are stored as per-type counts rather than slots; capacity bounds the
//! total number of units. Iteration order over types is the declaration order
//! of [`ItemType`], which makes take operations deterministic.

use gridgrab_core::ItemType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counted multiset of items with a fixed unit capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    counts: BTreeMap<ItemType, u32>,
    capacity: u32,
}

impl Inventory {
    /// Create an empty inventory holding at most `capacity` units.
    pub fn new(capacity: u32) -> Self {
        Self {
            counts: BTreeMap::new(),
            capacity,
        }
    }

    /// Maximum number of units this inventory can hold.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Total units across all item types.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Units of a specific item type.
    pub fn count_of(&self, item: ItemType) -> u32 {
        self.counts.get(&item).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.total() >= self.capacity
    }

    /// Try to add one unit. Returns `false` (and leaves the inventory
    /// unchanged) when at capacity.
    pub fn add_one(&mut self, item: ItemType) -> bool {
        if self.is_full() {
            return false;
        }
        *self.counts.entry(item).or_insert(0) += 1;
        true
    }

    /// Remove and return one unit of the lowest-ordered item type present.
    pub fn take_first(&mut self) -> Option<ItemType> {
        let item = *self.counts.keys().next()?;
        let count = self.counts.get_mut(&item)?;
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&item);
        }
        Some(item)
    }

    /// Add up to `count` units, returning how many actually fit.
    pub fn add_many(&mut self, item: ItemType, count: u32) -> u32 {
        let space = self.capacity.saturating_sub(self.total());
        let added = count.min(space);
        if added > 0 {
            *self.counts.entry(item).or_insert(0) += added;
        }
        added
    }

    /// Iterate over `(item, count)` pairs in take-priority order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemType, u32)> + '_ {
        self.counts.iter().map(|(item, count)| (*item, *count))
    }
}
