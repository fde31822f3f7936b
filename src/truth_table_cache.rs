// SPDX-License-Identifier: Apache-2.0

//! Deduplicating store for truth tables.
//!
//! Functions are normalized on insertion: a function whose value on the
//! all-zeros assignment is `1` is stored complemented, so a function and its
//! complement share one entry. The returned handle encodes the entry index in
//! its upper bits and the complement flag in bit 0.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::truth_table::TruthTable;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TtHandle(pub u32);

impl TtHandle {
    /// Handle of the zero-variable constant-0 function; every cache created
    /// with `TruthTableCache::new` holds it.
    pub const CONST0: TtHandle = TtHandle(0);

    pub fn index(self) -> usize {
        (self.0 >> 1) as usize
    }

    pub fn is_complemented(self) -> bool {
        self.0 & 1 != 0
    }

    #[must_use]
    pub fn negate(self) -> Self {
        TtHandle(self.0 ^ 1)
    }
}

#[derive(Debug, Clone)]
pub struct TruthTableCache {
    entries: Vec<TruthTable>,
    index_of: AHashMap<TruthTable, u32>,
}

impl Default for TruthTableCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TruthTableCache {
    pub fn new() -> Self {
        let mut cache = Self {
            entries: Vec::new(),
            index_of: AHashMap::new(),
        };
        let zero = cache.insert(&TruthTable::const0(0));
        debug_assert_eq!(zero, TtHandle::CONST0);
        cache
    }

    pub fn insert(&mut self, tt: &TruthTable) -> TtHandle {
        let complemented = tt.get_bit(0);
        let normalized = tt.negate_if(complemented);
        let index = match self.index_of.get(&normalized) {
            Some(index) => *index,
            None => {
                let index = self.entries.len() as u32;
                self.entries.push(normalized.clone());
                self.index_of.insert(normalized, index);
                index
            }
        };
        TtHandle((index << 1) | complemented as u32)
    }

    pub fn get(&self, handle: TtHandle) -> TruthTable {
        self.entries[handle.index()].negate_if(handle.is_complemented())
    }

    /// Number of distinct normalized functions stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
