//! Canonical binary encoding.
//!
//! Fixed-width little-endian integers, `u64` length prefixes for byte
//! strings and sequences, fields in declaration order, `u32` enum variant
//! indices. Trailing bytes are rejected so every value has exactly one
//! accepted encoding.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CodecError;

/// Upper bound applied when decoding untrusted input.
pub const DEFAULT_DECODE_LIMIT: u64 = 4 * 1024 * 1024;

fn canonical() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode a value canonically.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    Ok(canonical().serialize(value)?)
}

/// Decode a value, rejecting trailing bytes and inputs above
/// [`DEFAULT_DECODE_LIMIT`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    decode_with_limit(bytes, DEFAULT_DECODE_LIMIT)
}

/// Decode a value with an explicit size limit.
pub fn decode_with_limit<T: DeserializeOwned>(bytes: &[u8], limit: u64) -> Result<T, CodecError> {
    if bytes.len() as u64 > limit {
        return Err(CodecError(format!(
            "input of {} bytes exceeds limit of {}",
            bytes.len(),
            limit
        )));
    }
    Ok(canonical().with_limit(limit).deserialize(bytes)?)
}
