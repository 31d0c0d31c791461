//! Append-only block event log with snapshot/restore.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::codec;
use crate::errors::{CodecError, StoreError};
use crate::ports::SnapshotId;

/// A logged event. `data` is canonically encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Emitting module
    pub module: String,
    /// Event name
    pub name: String,
    /// Indexed topics
    pub topics: Vec<Vec<u8>>,
    /// Encoded payload
    pub data: Vec<u8>,
    /// Survives snapshot restores
    pub unrevertible: bool,
}

impl Event {
    /// Decode the payload.
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        codec::decode(&self.data)
    }

    /// Whether the event was emitted by `module` under `name`.
    pub fn is(&self, module: &str, name: &str) -> bool {
        self.module == module && self.name == name
    }
}

/// Event log for one block.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
    snapshots: Vec<(SnapshotId, usize)>,
    next_snapshot: SnapshotId,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a revertible event.
    pub fn add<T: Serialize>(
        &mut self,
        module: &str,
        name: &str,
        data: &T,
        topics: Vec<Vec<u8>>,
    ) -> Result<(), StoreError> {
        self.push(module, name, data, topics, false)
    }

    /// Log an event that survives every snapshot restore.
    pub fn add_unrevertible<T: Serialize>(
        &mut self,
        module: &str,
        name: &str,
        data: &T,
        topics: Vec<Vec<u8>>,
    ) -> Result<(), StoreError> {
        self.push(module, name, data, topics, true)
    }

    fn push<T: Serialize>(
        &mut self,
        module: &str,
        name: &str,
        data: &T,
        topics: Vec<Vec<u8>>,
        unrevertible: bool,
    ) -> Result<(), StoreError> {
        let data = codec::encode(data)?;
        self.events.push(Event {
            module: module.to_string(),
            name: name.to_string(),
            topics,
            data,
            unrevertible,
        });
        Ok(())
    }

    /// Open a snapshot.
    pub fn create_snapshot(&mut self) -> SnapshotId {
        let id = self.next_snapshot;
        self.next_snapshot += 1;
        self.snapshots.push((id, self.events.len()));
        id
    }

    /// Drop revertible events logged after `id`, keeping unrevertible ones.
    pub fn restore_snapshot(&mut self, id: SnapshotId) -> Result<(), StoreError> {
        let position = self
            .snapshots
            .iter()
            .position(|(snapshot, _)| *snapshot == id)
            .ok_or(StoreError::UnknownSnapshot(id))?;
        let mark = self.snapshots[position].1;

        let tail = self.events.split_off(mark);
        let dropped = tail.iter().filter(|event| !event.unrevertible).count();
        self.events
            .extend(tail.into_iter().filter(|event| event.unrevertible));
        self.snapshots.truncate(position + 1);

        trace!(snapshot = id, dropped, "[ic-store] Event snapshot restored");
        Ok(())
    }

    /// All events in emission order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events emitted by `module` under `name`.
    pub fn find<'a>(&'a self, module: &'a str, name: &'a str) -> impl Iterator<Item = &'a Event> {
        self.events.iter().filter(move |event| event.is(module, name))
    }

    /// Number of logged events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event has been logged.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every event, closing all snapshots.
    pub fn drain(&mut self) -> Vec<Event> {
        self.snapshots.clear();
        std::mem::take(&mut self.events)
    }
}
