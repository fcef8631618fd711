// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

/// A lookup key is distinct from the ID type. This allows the lookup key
/// to not require ownership of the underlying ID data, which could require
/// allocations.
pub(crate) trait LookupKey<ID> {
    fn eq(&self, other: &ID) -> bool;
    fn to_id(self) -> ID;
}

/// An entry in the cache.
#[derive(Debug)]
pub(crate) struct Entry<ID, T> {
    pub(crate) epoch: u64,
    pub(crate) id: ID,
    pub(crate) data: T,
}

/// A least-recently-used cache. This cache uses a linear scan of its entries
/// to find a given entry, so it is meant for a low number of entries. Keep
/// `max_entries` in the order of tens.
#[derive(Debug)]
pub(crate) struct LruCache<ID, T> {
    entries: Vec<Entry<ID, T>>,
    epoch: u64,
    max_entries: usize,
}

impl<ID, T> LruCache<ID, T> {
    pub(crate) fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            epoch: 0,
            max_entries: max_entries.max(1),
        }
    }

    /// Returns a reference to the entry with the given ID. If the entry is not
    /// found, it is created using `make_data`, evicting the least recently
    /// used entry when the cache is full.
    pub(crate) fn entry(&mut self, id: impl LookupKey<ID>, make_data: impl FnOnce() -> T) -> &T {
        let (_, index) = self.find_entry(id, make_data);
        self.epoch += 1;
        let entry = &mut self.entries[index];
        entry.epoch = self.epoch;
        &entry.data
    }

    /// Number of cached entries.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drops every entry.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.epoch = 0;
    }

    fn find_entry(&mut self, id: impl LookupKey<ID>, make_data: impl FnOnce() -> T) -> (bool, usize) {
        let epoch = self.epoch;
        let mut lowest_serial = u64::MAX;
        let mut lowest_index = 0;
        for (i, entry) in self.entries.iter().enumerate() {
            if id.eq(&entry.id) {
                return (true, i);
            }
            if entry.epoch < lowest_serial {
                lowest_serial = entry.epoch;
                lowest_index = i;
            }
        }
        if self.entries.len() < self.max_entries {
            lowest_index = self.entries.len();
            self.entries.push(Entry {
                epoch,
                id: id.to_id(),
                data: make_data(),
            });
        } else {
            let entry = &mut self.entries[lowest_index];
            entry.epoch = epoch;
            entry.id = id.to_id();
            entry.data = make_data();
        }
        (false, lowest_index)
    }
}
