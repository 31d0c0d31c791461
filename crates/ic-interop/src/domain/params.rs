//! Command and cross-chain command params.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::constants::TOKEN_ID_LENGTH;
use super::entities::ActiveValidator;
use super::errors::{Hash, InteropError};
use super::value_objects::ChainId;

/// Decode untrusted params bytes.
pub fn decode_params<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, InteropError> {
    ic_store::decode(bytes).map_err(InteropError::params)
}

/// Validator-set change carried in a CCU.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveValidatorsUpdate {
    /// Keys joining the set, ascending
    pub bls_keys_update: Vec<Vec<u8>>,
    /// New weights, in merged-key order
    pub bft_weights_update: Vec<u64>,
    /// Bit `i` marks merged key `i` as receiving a new weight
    pub bft_weights_update_bitmap: Vec<u8>,
}

impl ActiveValidatorsUpdate {
    /// No keys, weights or bitmap.
    pub fn is_empty(&self) -> bool {
        self.bls_keys_update.is_empty()
            && self.bft_weights_update.is_empty()
            && self.bft_weights_update_bitmap.is_empty()
    }
}

/// SMT witness of the partner's outbox root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxRootWitness {
    /// Encoded sibling bitmap
    pub bitmap: Vec<u8>,
    /// Sibling hashes
    pub sibling_hashes: Vec<Hash>,
}

impl OutboxRootWitness {
    /// Neither bitmap nor siblings.
    pub fn is_empty(&self) -> bool {
        self.bitmap.is_empty() && self.sibling_hashes.is_empty()
    }
}

/// Messages delivered by a CCU.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxUpdate {
    /// Encoded CCMs, in outbox order
    pub cross_chain_messages: Vec<Vec<u8>>,
    /// Right witness completing the partner's outbox
    pub message_witness_hashes: Vec<Hash>,
    /// Proof of the partner's outbox root
    pub outbox_root_witness: OutboxRootWitness,
}

impl InboxUpdate {
    /// No messages and no witnesses.
    pub fn is_empty(&self) -> bool {
        self.cross_chain_messages.is_empty()
            && self.message_witness_hashes.is_empty()
            && self.outbox_root_witness.is_empty()
    }
}

/// Params of the CCU transaction command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainUpdateParams {
    /// Chain whose messages are delivered
    pub sending_chain_id: ChainId,
    /// Encoded certificate, empty if none
    pub certificate: Vec<u8>,
    /// Validator-set change
    pub active_validators_update: ActiveValidatorsUpdate,
    /// New certificate threshold
    pub certificate_threshold: u64,
    /// Delivered messages
    pub inbox_update: InboxUpdate,
}

/// One store entry recovered from a terminated chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEntry {
    /// Substore prefix within the module
    pub substore_prefix: Vec<u8>,
    /// Key within the substore
    pub store_key: Vec<u8>,
    /// Stored value
    pub store_value: Vec<u8>,
    /// SMT bitmap of the entry
    pub bitmap: Vec<u8>,
}

/// Params of `recoverState`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecoveryParams {
    /// Terminated chain
    pub chain_id: ChainId,
    /// Module owning the entries
    pub module: String,
    /// Recovered entries
    pub store_entries: Vec<StoreEntry>,
    /// SMT siblings of the multi-proof
    pub sibling_hashes: Vec<Hash>,
}

/// Params of `initializeStateRecovery`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecoveryInitParams {
    /// Terminated sidechain
    pub chain_id: ChainId,
    /// Encoded `ChainAccount` of the sidechain as stored on the mainchain
    pub sidechain_account: Vec<u8>,
    /// SMT bitmap
    pub bitmap: Vec<u8>,
    /// SMT siblings
    pub sibling_hashes: Vec<Hash>,
}

/// Params of `registerSidechain`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidechainRegistrationParams {
    /// Requested chain ID
    pub chain_id: ChainId,
    /// Requested name
    pub name: String,
    /// Initial validators, ascending by key
    pub sidechain_validators: Vec<ActiveValidator>,
    /// Initial certificate threshold
    pub sidechain_certificate_threshold: u64,
}

/// Params of `registerMainchain`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainchainRegistrationParams {
    /// Own chain ID
    pub own_chain_id: ChainId,
    /// Own name as registered on the mainchain
    pub own_name: String,
    /// Mainchain validators, ascending by key
    pub mainchain_validators: Vec<ActiveValidator>,
    /// Mainchain certificate threshold
    pub mainchain_certificate_threshold: u64,
    /// Aggregate signature of the own validators
    pub signature: Vec<u8>,
    /// Signers
    pub aggregation_bits: Vec<u8>,
}

/// Message signed by the own validators to register the mainchain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSignatureMessage {
    /// Own chain ID
    pub own_chain_id: ChainId,
    /// Own name
    pub own_name: String,
    /// Mainchain validators
    pub mainchain_validators: Vec<ActiveValidator>,
    /// Mainchain certificate threshold
    pub mainchain_certificate_threshold: u64,
}

impl From<&MainchainRegistrationParams> for RegistrationSignatureMessage {
    fn from(params: &MainchainRegistrationParams) -> Self {
        Self {
            own_chain_id: params.own_chain_id,
            own_name: params.own_name.clone(),
            mainchain_validators: params.mainchain_validators.clone(),
            mainchain_certificate_threshold: params.mainchain_certificate_threshold,
        }
    }
}

/// Params of `terminateSidechainForLiveness`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminateSidechainForLivenessParams {
    /// Chain to terminate
    pub chain_id: ChainId,
}

/// Params of the `registration` cross-chain command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCcmParams {
    /// Receiving chain's name
    pub name: String,
    /// Receiving chain's ID
    pub chain_id: ChainId,
    /// Channel fee token
    pub message_fee_token_id: [u8; TOKEN_ID_LENGTH],
    /// Channel return fee
    pub min_return_fee_per_byte: u64,
}

/// Params of the `sidechainTerminated` cross-chain command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidechainTerminatedCcmParams {
    /// Terminated chain
    pub chain_id: ChainId,
    /// Its frozen state root
    pub state_root: Hash,
}
