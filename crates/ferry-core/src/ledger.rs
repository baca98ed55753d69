//! Append-only ledgers of received records.

use std::{collections::VecDeque, num::NonZeroUsize};

use crate::{ids::RecordId, record::Record};

/// Ordered collection of received records.
///
/// Records are only ever appended. With a capacity set, appending to a full
/// ledger evicts the oldest record and hands it back so the caller can release
/// what it holds.
///
/// # Invariants
///
/// - Records are in arrival order.
/// - `len() <= capacity` when a capacity is set.
#[derive(Debug, Clone)]
pub struct Ledger<T> {
    records: VecDeque<T>,
    capacity: Option<NonZeroUsize>,
}

impl<T> Default for Ledger<T> {
    fn default() -> Self {
        Self { records: VecDeque::new(), capacity: None }
    }
}

impl<T: Record> Ledger<T> {
    /// Ledger holding at most `capacity` records. `None` means unbounded.
    pub fn with_capacity(capacity: Option<NonZeroUsize>) -> Self {
        Self { records: VecDeque::new(), capacity }
    }

    /// Append a record. Returns the evicted oldest record if the ledger was
    /// full.
    pub fn append(&mut self, record: T) -> Option<T> {
        let evicted = match self.capacity {
            Some(capacity) if self.records.len() >= capacity.get() => self.records.pop_front(),
            _ => None,
        };
        self.records.push_back(record);
        evicted
    }

    /// Record with the given identifier.
    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// Remove a record ahead of its eviction.
    pub fn remove(&mut self, id: RecordId) -> Option<T> {
        let index = self.records.iter().position(|record| record.id() == id)?;
        self.records.remove(index)
    }

    /// Remove every record, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.records.drain(..)
    }

    /// Records in arrival order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.records.iter()
    }

    /// Most recent record.
    pub fn latest(&self) -> Option<&T> {
        self.records.back()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// No records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
