//! Store port.

use crate::errors::StoreError;

/// Identifier of a store or event-log snapshot. Ids are issued in strictly
/// increasing order.
pub type SnapshotId = u64;

/// Versioned key-value store with nested snapshot isolation.
pub trait StateStore: Send + Sync {
    /// Value stored under `key`, if any.
    fn get_opt(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Store `value` under `key`.
    fn set(&mut self, key: Vec<u8>, value: Vec<u8>);

    /// Remove `key`. Removing a missing key is a no-op.
    fn del(&mut self, key: &[u8]);

    /// All entries whose key starts with `prefix`, in key order.
    fn iterate_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;

    /// Open a snapshot covering every later write.
    fn create_snapshot(&mut self) -> SnapshotId;

    /// Revert every write made after `id`. Snapshots opened after `id`
    /// become invalid; `id` itself stays usable.
    fn restore_snapshot(&mut self, id: SnapshotId) -> Result<(), StoreError>;

    /// Value stored under `key`, or the typed not-found error.
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.get_opt(key).ok_or_else(|| StoreError::not_found(key))
    }

    /// Whether a value is stored under `key`.
    fn has(&self, key: &[u8]) -> bool {
        self.get_opt(key).is_some()
    }
}
