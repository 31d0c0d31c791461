//! Outbound ports: services the core depends on.

use ic_store::StateStore;

use crate::algorithms::validators::signed_weight;
use crate::domain::{ActiveValidator, ChainId, ChainValidators, InteropError};

/// A weighted aggregate-signature check.
///
/// The signed message is `tag ‖ chain_id ‖ message`. The signers selected
/// by `aggregation_bits` must carry at least `threshold` weight.
#[derive(Clone, Copy, Debug)]
pub struct AggregateSignatureCheck<'a> {
    /// Validator set, ascending by key
    pub validators: &'a [ActiveValidator],
    /// Signers
    pub aggregation_bits: &'a [u8],
    /// Aggregate signature
    pub signature: &'a [u8],
    /// Domain separation tag
    pub tag: &'a [u8],
    /// Chain the signature belongs to
    pub chain_id: ChainId,
    /// Required weight
    pub threshold: u64,
    /// Signed payload
    pub message: &'a [u8],
}

impl AggregateSignatureCheck<'_> {
    /// Whether the signers reach the threshold.
    pub fn meets_threshold(&self) -> bool {
        signed_weight(self.validators, self.aggregation_bits)
            .is_some_and(|weight| weight >= self.threshold)
    }

    /// `tag ‖ chain_id ‖ message`.
    pub fn tagged_message(&self) -> Vec<u8> {
        let mut tagged = Vec::with_capacity(self.tag.len() + 4 + self.message.len());
        tagged.extend_from_slice(self.tag);
        tagged.extend_from_slice(self.chain_id.as_bytes());
        tagged.extend_from_slice(self.message);
        tagged
    }
}

/// Aggregate BLS verification.
pub trait BlsVerifier: Send + Sync {
    /// Whether the aggregate signature is valid and meets the threshold.
    fn verify_weighted_aggregate(&self, check: &AggregateSignatureCheck<'_>) -> bool;
}

/// Source of the own chain's current BFT validator set.
pub trait BftValidatorSource: Send + Sync {
    /// Own validators and certificate threshold.
    fn own_validators(&self, store: &dyn StateStore) -> Result<ChainValidators, InteropError>;
}

/// Fixed own validator set.
#[derive(Clone, Debug)]
pub struct StaticBftValidators(pub ChainValidators);

impl BftValidatorSource for StaticBftValidators {
    fn own_validators(&self, _store: &dyn StateStore) -> Result<ChainValidators, InteropError> {
        Ok(self.0.clone())
    }
}

/// Verifier for tests: enforces the weight threshold and otherwise accepts
/// or rejects every signature.
#[derive(Clone, Copy, Debug)]
pub struct MockBlsVerifier {
    accept: bool,
}

impl MockBlsVerifier {
    /// Accept every signature meeting the threshold.
    pub fn accepting() -> Self {
        Self { accept: true }
    }

    /// Reject every signature.
    pub fn rejecting() -> Self {
        Self { accept: false }
    }
}

impl BlsVerifier for MockBlsVerifier {
    fn verify_weighted_aggregate(&self, check: &AggregateSignatureCheck<'_>) -> bool {
        self.accept && check.meets_threshold()
    }
}
