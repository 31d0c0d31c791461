//! Persisted records of the interoperability module.

use serde::{Deserialize, Serialize};

use super::constants::{EMPTY_HASH, TOKEN_ID_LENGTH};
use super::errors::Hash;
use super::value_objects::{ChainId, ChainStatus};
use crate::algorithms::merkle_tree::MerkleAccumulator;

/// Header commitment of the last accepted certificate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastCertificate {
    /// Certified height
    pub height: u64,
    /// Certified block timestamp
    pub timestamp: u64,
    /// Certified state root
    pub state_root: Hash,
    /// Certified validators hash
    pub validators_hash: Hash,
}

/// A partner chain as seen by this chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAccount {
    /// Registered name
    pub name: String,
    /// Last accepted certificate
    pub last_certificate: LastCertificate,
    /// Lifecycle status
    pub status: ChainStatus,
}

/// Inbox/outbox pairing with a partner chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelData {
    /// Messages received from the partner
    pub inbox: MerkleAccumulator,
    /// Messages sent to the partner
    pub outbox: MerkleAccumulator,
    /// Partner's outbox root as last proven
    pub partner_chain_outbox_root: Hash,
    /// Token in which message fees are paid
    pub message_fee_token_id: [u8; TOKEN_ID_LENGTH],
    /// Fee per byte required to bounce a message back
    pub min_return_fee_per_byte: u64,
}

impl ChannelData {
    /// Fresh channel with empty trees.
    pub fn new(message_fee_token_id: [u8; TOKEN_ID_LENGTH], min_return_fee_per_byte: u64) -> Self {
        Self {
            inbox: MerkleAccumulator::new(),
            outbox: MerkleAccumulator::new(),
            partner_chain_outbox_root: EMPTY_HASH,
            message_fee_token_id,
            min_return_fee_per_byte,
        }
    }
}

/// A validator of a partner chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveValidator {
    /// Compressed BLS public key (48 bytes)
    pub bls_key: Vec<u8>,
    /// Voting weight
    pub bft_weight: u64,
}

/// Validator set of a partner chain, sorted by BLS key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainValidators {
    /// Validators, ascending by key
    pub active_validators: Vec<ActiveValidator>,
    /// Weight required on a certificate
    pub certificate_threshold: u64,
}

/// This chain's own identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnChainAccount {
    /// Own name
    pub name: String,
    /// Own chain ID
    pub chain_id: ChainId,
    /// Nonce of the next outbound CCM
    pub nonce: u64,
}

/// Frozen state of a terminated chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminatedStateAccount {
    /// State root recovery proofs are checked against
    pub state_root: Hash,
    /// Mainchain state root used to initialize the account (sidechains)
    pub mainchain_state_root: Hash,
    /// Whether `state_root` is set
    pub initialized: bool,
}

/// Frozen outbox of a terminated chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminatedOutboxAccount {
    /// Outbox root at termination
    pub outbox_root: Hash,
    /// Outbox size at termination
    pub outbox_size: u64,
    /// Inbox size of the partner, as last proven
    pub partner_chain_inbox_size: u64,
}

/// Mirror of a channel's outbox root, proven against the state root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxRoot {
    /// Outbox root
    pub root: Hash,
}

/// Chain registered under a name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredName {
    /// Owner of the name
    pub chain_id: ChainId,
}
