//! Static invariants checked before any state is touched.

use std::collections::HashSet;

use super::constants::{BLS_PUBLIC_KEY_LENGTH, CHAIN_NAME_ALPHABET, MAX_CHAIN_NAME_LENGTH};
use super::entities::ActiveValidator;
use super::errors::InteropError;
use super::params::{InboxUpdate, StoreEntry};
use crate::algorithms::validators::{is_strictly_sorted, total_weight};

/// Name is 1..=40 characters from the chain-name alphabet.
pub fn invariant_chain_name(name: &str) -> Result<(), InteropError> {
    if name.is_empty()
        || name.len() > MAX_CHAIN_NAME_LENGTH
        || !name.chars().all(|c| CHAIN_NAME_ALPHABET.contains(c))
    {
        return Err(InteropError::InvalidChainName(name.to_string()));
    }
    Ok(())
}

/// Validator list is non-empty, at most `max` long, strictly sorted by
/// 48-byte key, with positive weights summing without overflow. Returns the
/// total weight.
pub fn invariant_validators(
    validators: &[ActiveValidator],
    max: usize,
) -> Result<u64, InteropError> {
    if validators.is_empty() || validators.len() > max {
        return Err(InteropError::InvalidValidators(format!(
            "{} validators outside 1..={max}",
            validators.len()
        )));
    }
    if let Some(bad) = validators
        .iter()
        .find(|v| v.bls_key.len() != BLS_PUBLIC_KEY_LENGTH)
    {
        return Err(InteropError::InvalidValidators(format!(
            "BLS key of {} bytes",
            bad.bls_key.len()
        )));
    }
    if validators.iter().any(|v| v.bft_weight == 0) {
        return Err(InteropError::InvalidValidators("zero weight".into()));
    }
    let keys: Vec<&[u8]> = validators.iter().map(|v| v.bls_key.as_slice()).collect();
    if !is_strictly_sorted(&keys) {
        return Err(InteropError::InvalidValidators(
            "keys not strictly ascending".into(),
        ));
    }
    total_weight(validators)
        .ok_or_else(|| InteropError::InvalidValidators("total weight overflows".into()))
}

/// Threshold lies in `[floor(total/3)+1, total]`.
pub fn invariant_certificate_threshold(threshold: u64, total: u64) -> Result<(), InteropError> {
    let min = total / 3 + 1;
    if threshold < min || threshold > total {
        return Err(InteropError::InvalidCertificateThreshold {
            threshold,
            min,
            max: total,
        });
    }
    Ok(())
}

/// Outbox root witness fields are jointly empty or jointly set, and set only
/// together with a certificate.
pub fn invariant_outbox_root_witness(
    inbox_update: &InboxUpdate,
    has_certificate: bool,
) -> Result<(), InteropError> {
    let witness = &inbox_update.outbox_root_witness;
    if witness.bitmap.is_empty() != witness.sibling_hashes.is_empty() {
        return Err(InteropError::InvalidInboxUpdate(
            "bitmap and sibling hashes must be both empty or both set".into(),
        ));
    }
    if !witness.is_empty() && !has_certificate {
        return Err(InteropError::InvalidInboxUpdate(
            "outbox root witness without certificate".into(),
        ));
    }
    if witness.is_empty() && has_certificate && !inbox_update.is_empty() {
        return Err(InteropError::InvalidInboxUpdate(
            "certificate with inbox update requires an outbox root witness".into(),
        ));
    }
    Ok(())
}

/// No two entries share (substore prefix, store key).
pub fn invariant_distinct_store_entries(entries: &[StoreEntry]) -> Result<(), InteropError> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert((entry.substore_prefix.as_slice(), entry.store_key.as_slice())) {
            return Err(InteropError::DuplicateStoreEntry);
        }
    }
    Ok(())
}
