//! Journaled in-memory state store.

use std::collections::BTreeMap;

use tracing::trace;

use crate::errors::StoreError;
use crate::ports::{SnapshotId, StateStore};

/// Previous value of a key before a journaled write.
#[derive(Debug, Clone)]
struct JournalEntry {
    key: Vec<u8>,
    previous: Option<Vec<u8>>,
}

/// In-memory [`StateStore`] backed by an ordered map and an undo journal.
///
/// Writes are journaled only while at least one snapshot is open, so
/// restoring a snapshot pops journal entries back to the length recorded
/// when the snapshot was taken.
#[derive(Debug, Default)]
pub struct VersionedStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    journal: Vec<JournalEntry>,
    /// Open snapshots as (id, journal length), ascending by id.
    snapshots: Vec<(SnapshotId, usize)>,
    next_snapshot: SnapshotId,
}

impl VersionedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all open snapshots and the journal, making every write final.
    pub fn commit(&mut self) {
        self.journal.clear();
        self.snapshots.clear();
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of open snapshots.
    pub fn open_snapshots(&self) -> usize {
        self.snapshots.len()
    }

    fn record(&mut self, key: Vec<u8>, previous: Option<Vec<u8>>) {
        if !self.snapshots.is_empty() {
            self.journal.push(JournalEntry { key, previous });
        }
    }
}

impl StateStore for VersionedStore {
    fn get_opt(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.get(key).cloned()
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        let previous = self.data.insert(key.clone(), value);
        self.record(key, previous);
    }

    fn del(&mut self, key: &[u8]) {
        if let Some(previous) = self.data.remove(key) {
            self.record(key.to_vec(), Some(previous));
        }
    }

    fn iterate_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.data
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    fn create_snapshot(&mut self) -> SnapshotId {
        let id = self.next_snapshot;
        self.next_snapshot += 1;
        self.snapshots.push((id, self.journal.len()));
        id
    }

    fn restore_snapshot(&mut self, id: SnapshotId) -> Result<(), StoreError> {
        let position = self
            .snapshots
            .iter()
            .position(|(snapshot, _)| *snapshot == id)
            .ok_or(StoreError::UnknownSnapshot(id))?;
        let mark = self.snapshots[position].1;

        let reverted = self.journal.len() - mark;
        while self.journal.len() > mark {
            let Some(entry) = self.journal.pop() else {
                break;
            };
            match entry.previous {
                Some(value) => {
                    self.data.insert(entry.key, value);
                }
                None => {
                    self.data.remove(&entry.key);
                }
            }
        }
        self.snapshots.truncate(position + 1);

        trace!(snapshot = id, reverted, "[ic-store] Snapshot restored");
        Ok(())
    }
}
