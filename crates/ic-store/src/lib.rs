//! # ic-store
//!
//! Versioned state storage for the interoperability core.
//!
//! ## Role in System
//!
//! - **State store**: byte-keyed records with nested, monotonic snapshots.
//!   Restoring a snapshot truncates an undo journal, discarding every write
//!   made after it while keeping everything earlier.
//! - **Event log**: append-only block events with the same snapshot model.
//!   Events flagged unrevertible survive a restore.
//! - **Substores**: typed views over a `module prefix ‖ substore prefix`
//!   key space, encoded with the canonical codec.
//!
//! ## Module Structure
//!
//! ```text
//! ic-store/
//! ├── codec.rs          # Canonical binary encoding (bincode, fixint)
//! ├── errors.rs         # StoreError, CodecError
//! ├── events.rs         # Event, EventLog
//! ├── substore.rs       # Substore<T>, store_prefix
//! ├── ports/            # StateStore trait
//! └── adapters/         # VersionedStore (in-memory, journaled)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod codec;
pub mod errors;
pub mod events;
pub mod ports;
pub mod substore;

pub use adapters::VersionedStore;
pub use codec::{decode, decode_with_limit, encode};
pub use errors::{CodecError, StoreError};
pub use events::{Event, EventLog};
pub use ports::{SnapshotId, StateStore};
pub use substore::{store_prefix, Substore, STORE_PREFIX_LENGTH, SUBSTORE_PREFIX_LENGTH};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
