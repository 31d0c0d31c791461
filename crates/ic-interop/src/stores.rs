//! Substores of the interoperability module and state-proof keys.

use ic_store::{store_prefix, Substore};

use crate::algorithms::merkle_tree::sha256;
use crate::domain::{
    ChainAccount, ChainId, ChainValidators, ChannelData, Hash, OutboxRoot, OwnChainAccount,
    RegisteredName, TerminatedOutboxAccount, TerminatedStateAccount, MODULE_NAME_INTEROPERABILITY,
    SUBSTORE_PREFIX_CHAIN_ACCOUNT, SUBSTORE_PREFIX_CHAIN_VALIDATORS, SUBSTORE_PREFIX_CHANNEL,
    SUBSTORE_PREFIX_OUTBOX_ROOT, SUBSTORE_PREFIX_OWN_CHAIN, SUBSTORE_PREFIX_REGISTERED_NAMES,
    SUBSTORE_PREFIX_TERMINATED_OUTBOX, SUBSTORE_PREFIX_TERMINATED_STATE,
};

/// Key of the own chain account singleton.
pub const OWN_CHAIN_KEY: &[u8] = &[];

/// Typed views over every record the module persists. Records are keyed
/// by chain ID, names by their UTF-8 bytes.
#[derive(Clone, Debug)]
pub struct InteropStores {
    /// Outbox root mirror, proven against the state root by partners
    pub outbox_root: Substore<OutboxRoot>,
    /// Partner chain accounts
    pub chain_account: Substore<ChainAccount>,
    /// Own chain account
    pub own_chain: Substore<OwnChainAccount>,
    /// Channels
    pub channel: Substore<ChannelData>,
    /// Partner validator sets
    pub chain_validators: Substore<ChainValidators>,
    /// Terminated-state accounts
    pub terminated_state: Substore<TerminatedStateAccount>,
    /// Terminated-outbox accounts
    pub terminated_outbox: Substore<TerminatedOutboxAccount>,
    /// Name registry
    pub registered_names: Substore<RegisteredName>,
}

impl Default for InteropStores {
    fn default() -> Self {
        Self::new()
    }
}

impl InteropStores {
    /// Substores under the interoperability module prefix.
    pub fn new() -> Self {
        let module = MODULE_NAME_INTEROPERABILITY;
        Self {
            outbox_root: Substore::new(module, SUBSTORE_PREFIX_OUTBOX_ROOT),
            chain_account: Substore::new(module, SUBSTORE_PREFIX_CHAIN_ACCOUNT),
            own_chain: Substore::new(module, SUBSTORE_PREFIX_OWN_CHAIN),
            channel: Substore::new(module, SUBSTORE_PREFIX_CHANNEL),
            chain_validators: Substore::new(module, SUBSTORE_PREFIX_CHAIN_VALIDATORS),
            terminated_state: Substore::new(module, SUBSTORE_PREFIX_TERMINATED_STATE),
            terminated_outbox: Substore::new(module, SUBSTORE_PREFIX_TERMINATED_OUTBOX),
            registered_names: Substore::new(module, SUBSTORE_PREFIX_REGISTERED_NAMES),
        }
    }
}

/// Sparse Merkle key of a store entry in a chain's state tree:
/// `SHA-256(store_prefix(module) ‖ substore_prefix ‖ store_key)`.
pub fn proof_key(module: &str, substore_prefix: &[u8], store_key: &[u8]) -> Hash {
    let mut preimage = store_prefix(module).to_vec();
    preimage.extend_from_slice(substore_prefix);
    preimage.extend_from_slice(store_key);
    sha256(&preimage)
}

/// Sparse Merkle key of the partner's outbox root for its channel with
/// `chain_id`.
pub fn outbox_root_proof_key(chain_id: ChainId) -> Hash {
    proof_key(
        MODULE_NAME_INTEROPERABILITY,
        &SUBSTORE_PREFIX_OUTBOX_ROOT,
        chain_id.as_bytes(),
    )
}

/// Sparse Merkle key of a chain account on the mainchain.
pub fn chain_account_proof_key(chain_id: ChainId) -> Hash {
    proof_key(
        MODULE_NAME_INTEROPERABILITY,
        &SUBSTORE_PREFIX_CHAIN_ACCOUNT,
        chain_id.as_bytes(),
    )
}
