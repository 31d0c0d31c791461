//! # BLS12-381 Aggregate Verification
//!
//! [`BlsVerifier`] over `blst` in the `min_pk` variant: 48-byte public keys
//! on G1, 96-byte signatures on G2. The signers selected by the aggregation
//! bits all sign `tag ‖ chain_id ‖ message`, so their keys are aggregated
//! and checked with a single pairing.

use blst::min_pk::{AggregatePublicKey, PublicKey, Signature};
use blst::BLST_ERROR;
use tracing::debug;

use crate::algorithms::validators::aggregation_bit;
use crate::ports::{AggregateSignatureCheck, BlsVerifier};

/// Domain separation tag (proof-of-possession scheme).
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// Production verifier.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlstVerifier;

impl BlstVerifier {
    /// New verifier.
    pub fn new() -> Self {
        Self
    }

    fn aggregate_signers(check: &AggregateSignatureCheck<'_>) -> Option<PublicKey> {
        let keys: Vec<PublicKey> = check
            .validators
            .iter()
            .enumerate()
            .filter(|(index, _)| aggregation_bit(check.aggregation_bits, *index))
            .map(|(_, validator)| PublicKey::from_bytes(&validator.bls_key).ok())
            .collect::<Option<_>>()?;
        if keys.is_empty() {
            return None;
        }
        let refs: Vec<&PublicKey> = keys.iter().collect();
        AggregatePublicKey::aggregate(&refs, true)
            .ok()
            .map(|aggregate| aggregate.to_public_key())
    }
}

impl BlsVerifier for BlstVerifier {
    fn verify_weighted_aggregate(&self, check: &AggregateSignatureCheck<'_>) -> bool {
        if !check.meets_threshold() {
            debug!(chain_id = %check.chain_id, "[ic-interop] Signers below threshold");
            return false;
        }
        let Ok(signature) = Signature::from_bytes(check.signature) else {
            return false;
        };
        let Some(public_key) = Self::aggregate_signers(check) else {
            return false;
        };
        let message = check.tagged_message();
        signature.verify(true, &message, DST, &[], &public_key, true) == BLST_ERROR::BLST_SUCCESS
    }
}
