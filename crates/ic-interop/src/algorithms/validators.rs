//! Validator-set arithmetic: weight sums, update merging, hashing.

use std::cmp::Ordering;

use serde::Serialize;

use super::merkle_tree::sha256;
use crate::domain::{ActiveValidator, Hash, InteropError};

/// Canonical preimage of a validators hash.
#[derive(Serialize)]
struct ValidatorsHashInput<'a> {
    active_validators: &'a [ActiveValidator],
    certificate_threshold: u64,
}

/// Deterministic hash of a validator set and its certificate threshold.
pub fn compute_validators_hash(
    active_validators: &[ActiveValidator],
    certificate_threshold: u64,
) -> Result<Hash, InteropError> {
    let bytes = ic_store::encode(&ValidatorsHashInput {
        active_validators,
        certificate_threshold,
    })?;
    Ok(sha256(&bytes))
}

/// Sum of weights, `None` on overflow.
pub fn total_weight(validators: &[ActiveValidator]) -> Option<u64> {
    validators
        .iter()
        .try_fold(0u64, |sum, validator| sum.checked_add(validator.bft_weight))
}

/// Whether bit `index` of an update bitmap is set. Bit 0 is the least
/// significant bit of the last byte.
pub fn update_bitmap_bit(bitmap: &[u8], index: usize) -> bool {
    let from_end = index / 8;
    if from_end >= bitmap.len() {
        return false;
    }
    bitmap[bitmap.len() - 1 - from_end] & (1 << (index % 8)) != 0
}

/// Whether bit `index` of an aggregation bitmap is set. Bit 0 is the least
/// significant bit of the first byte.
pub fn aggregation_bit(aggregation_bits: &[u8], index: usize) -> bool {
    aggregation_bits
        .get(index / 8)
        .is_some_and(|byte| byte & (1 << (index % 8)) != 0)
}

/// Total weight of the validators selected by `aggregation_bits`. `None` if
/// the bitmap has the wrong length, selects nobody, or the sum overflows.
pub fn signed_weight(validators: &[ActiveValidator], aggregation_bits: &[u8]) -> Option<u64> {
    if aggregation_bits.len() != validators.len().div_ceil(8) {
        return None;
    }
    let mut selected = 0usize;
    let mut weight = 0u64;
    for (index, validator) in validators.iter().enumerate() {
        if aggregation_bit(aggregation_bits, index) {
            selected += 1;
            weight = weight.checked_add(validator.bft_weight)?;
        }
    }
    // Bits beyond the validator count must be clear.
    let stray = (validators.len()..aggregation_bits.len() * 8)
        .any(|index| aggregation_bit(aggregation_bits, index));
    if selected == 0 || stray {
        return None;
    }
    Some(weight)
}

/// Merge a validator update into the active set.
///
/// The new keys are merged into the sorted key list; bit `i` of `bitmap`
/// marks that key `i` of the merged list takes the next weight from
/// `bft_weights_update`. Validators whose resulting weight is zero are
/// dropped. Fails if a key without an existing weight is not updated, or
/// if the weights run out.
pub fn calculate_new_active_validators(
    active_validators: &[ActiveValidator],
    bls_keys_update: &[Vec<u8>],
    bft_weights_update: &[u64],
    bitmap: &[u8],
) -> Result<Vec<ActiveValidator>, InteropError> {
    let mut keys: Vec<&Vec<u8>> = active_validators
        .iter()
        .map(|validator| &validator.bls_key)
        .chain(bls_keys_update.iter())
        .collect();
    keys.sort();

    let mut weights = bft_weights_update.iter();
    let mut result = Vec::with_capacity(keys.len());
    for (index, key) in keys.into_iter().enumerate() {
        let weight = if update_bitmap_bit(bitmap, index) {
            *weights.next().ok_or_else(|| {
                InteropError::InvalidValidators("bitmap selects more keys than weights".into())
            })?
        } else {
            active_validators
                .binary_search_by(|validator| validator.bls_key.as_slice().cmp(key.as_slice()))
                .map(|position| active_validators[position].bft_weight)
                .map_err(|_| {
                    InteropError::InvalidValidators(format!(
                        "new key {} has no weight",
                        hex::encode(key)
                    ))
                })?
        };
        if weight > 0 {
            result.push(ActiveValidator {
                bls_key: key.clone(),
                bft_weight: weight,
            });
        }
    }
    if weights.next().is_some() {
        return Err(InteropError::InvalidValidators(
            "more weights than selected keys".into(),
        ));
    }
    Ok(result)
}

/// Whether `keys` is strictly ascending.
pub fn is_strictly_sorted<K: AsRef<[u8]>>(keys: &[K]) -> bool {
    keys.windows(2)
        .all(|pair| pair[0].as_ref().cmp(pair[1].as_ref()) == Ordering::Less)
}
