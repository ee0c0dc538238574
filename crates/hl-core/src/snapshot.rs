//! Whole-state persistence contract.

use std::collections::BTreeMap;
use std::convert::Infallible;

use chrono_tz::Tz;

use crate::entry::ActivityEntry;
use crate::types::UserId;

/// Everything the tracker persists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Entries in insertion order.
    pub entries: Vec<ActivityEntry>,
    pub preferences: BTreeMap<UserId, Tz>,
}

/// A persistence collaborator that round-trips whole snapshots.
///
/// `save` followed by `load` must return every entry field and every
/// preference unchanged.
pub trait SnapshotStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load(&self) -> Result<Snapshot, Self::Error>;

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error>;
}

/// Keeps the snapshot in memory. Useful for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Snapshot,
    saves: usize,
}

impl MemoryStore {
    pub const fn new(snapshot: Snapshot) -> Self {
        Self { snapshot, saves: 0 }
    }

    /// Number of successful saves so far.
    pub const fn saves(&self) -> usize {
        self.saves
    }
}

impl SnapshotStore for MemoryStore {
    type Error = Infallible;

    fn load(&self) -> Result<Snapshot, Self::Error> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        self.snapshot = snapshot.clone();
        self.saves += 1;
        Ok(())
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &mut S {
    type Error = S::Error;

    fn load(&self) -> Result<Snapshot, Self::Error> {
        (**self).load()
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        (**self).save(snapshot)
    }
}
