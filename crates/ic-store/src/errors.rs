//! Store error types.

use thiserror::Error;

/// Canonical encoding or decoding failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Codec error: {0}")]
pub struct CodecError(pub String);

impl From<bincode::Error> for CodecError {
    fn from(e: bincode::Error) -> Self {
        CodecError(e.to_string())
    }
}

/// Errors raised by the state store and its typed views.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No value stored under the key (hex encoded).
    #[error("Key not found: {key}")]
    NotFound {
        /// Hex encoded key
        key: String,
    },

    /// A stored value could not be decoded, or a value could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The snapshot id was never issued or has been invalidated by a restore.
    #[error("Unknown snapshot: {0}")]
    UnknownSnapshot(u64),
}

impl StoreError {
    /// Build a `NotFound` error for a raw key.
    pub fn not_found(key: &[u8]) -> Self {
        StoreError::NotFound {
            key: hex::encode(key),
        }
    }

    /// Whether this is the typed not-found signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
