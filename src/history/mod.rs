//! Bounded in-memory snapshot history and the queries served from it.

pub mod query;

use std::collections::VecDeque;

use crate::telemetry::SystemSnapshot;

pub use query::{BatteryHistoryEntry, HistoryView, Statistics, StatusSummary};

/// Default number of snapshots retained.
pub const DEFAULT_CAPACITY: usize = 100;

/// FIFO ring buffer of snapshots, oldest first.
///
/// Appending past capacity evicts exactly one entry, the oldest. State is
/// lost on process restart.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<SystemSnapshot>,
    capacity: usize,
}

impl History {
    /// Creates an empty history holding at most `capacity` snapshots.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends a snapshot, evicting the oldest entry when over capacity.
    pub fn append(&mut self, snapshot: SystemSnapshot) {
        self.entries.push_back(snapshot);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Returns the last `limit` snapshots, oldest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &SystemSnapshot> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip)
    }

    /// Most recently appended snapshot.
    pub fn latest(&self) -> Option<&SystemSnapshot> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SystemSnapshot> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
