//! # Read Endpoint
//!
//! JSON read access to interoperability state. Chain IDs, hashes and keys
//! travel as lowercase hex.
//!
//! | Method                       | Params            |
//! |------------------------------|-------------------|
//! | `getChainAccount`            | `{chainID}`       |
//! | `getAllChainAccounts`        | `{}`              |
//! | `getChannel`                 | `{chainID}`       |
//! | `getOwnChainAccount`         | `{}`              |
//! | `getTerminatedStateAccount`  | `{chainID}`       |
//! | `getTerminatedOutboxAccount` | `{chainID}`       |
//! | `getChainValidators`         | `{chainID}`       |
//! | `isChainIDAvailable`         | `{chainID}`       |
//! | `isChainNameAvailable`       | `{name}`          |
//! | `getMinReturnFeePerByte`     | `{chainID}`       |

use ic_store::StateStore;
use serde_json::{json, Value};
use thiserror::Error;

use crate::algorithms::merkle_tree::MerkleAccumulator;
use crate::domain::{
    invariant_chain_name, ChainAccount, ChainId, ChainValidators, ChannelData, InteropError,
    OwnChainAccount, TerminatedOutboxAccount, TerminatedStateAccount,
};
use crate::methods::InternalMethods;

/// Endpoint failures.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// No such method.
    #[error("Unknown endpoint method: {0}")]
    UnknownMethod(String),

    /// Params missing or malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// State access failed.
    #[error(transparent)]
    Interop(#[from] InteropError),
}

/// Read-only query surface over a state store.
#[derive(Clone, Debug)]
pub struct InteropEndpoint {
    methods: InternalMethods,
}

impl InteropEndpoint {
    /// Endpoint reading through `methods`.
    pub fn new(methods: InternalMethods) -> Self {
        Self { methods }
    }

    /// Dispatch a JSON request.
    pub fn handle(
        &self,
        store: &dyn StateStore,
        method: &str,
        params: &Value,
    ) -> Result<Value, EndpointError> {
        match method {
            "getChainAccount" => {
                let chain_id = chain_id_param(params)?;
                let account = self.methods.chain_account(store, chain_id).map_err(not_found)?;
                Ok(chain_account_json(chain_id, &account))
            }
            "getAllChainAccounts" => {
                let accounts = self
                    .methods
                    .stores()
                    .chain_account
                    .iter(store)
                    .map_err(InteropError::from)?
                    .into_iter()
                    .map(|(key, account)| {
                        Ok(chain_account_json(ChainId::from_slice(&key)?, &account))
                    })
                    .collect::<Result<Vec<_>, InteropError>>()?;
                Ok(json!({ "chains": accounts }))
            }
            "getChannel" => {
                let chain_id = chain_id_param(params)?;
                let channel = self.methods.channel(store, chain_id).map_err(not_found)?;
                Ok(channel_json(&channel))
            }
            "getOwnChainAccount" => {
                let own = self.methods.own_chain_account(store).map_err(not_found)?;
                Ok(own_chain_json(&own))
            }
            "getTerminatedStateAccount" => {
                let chain_id = chain_id_param(params)?;
                let account = self
                    .methods
                    .stores()
                    .terminated_state
                    .get_opt(store, chain_id.as_bytes())
                    .map_err(InteropError::from)?
                    .ok_or_else(|| {
                        EndpointError::NotFound(format!("terminated state of {chain_id}"))
                    })?;
                Ok(terminated_state_json(&account))
            }
            "getTerminatedOutboxAccount" => {
                let chain_id = chain_id_param(params)?;
                let account = self
                    .methods
                    .stores()
                    .terminated_outbox
                    .get_opt(store, chain_id.as_bytes())
                    .map_err(InteropError::from)?
                    .ok_or_else(|| {
                        EndpointError::NotFound(format!("terminated outbox of {chain_id}"))
                    })?;
                Ok(terminated_outbox_json(&account))
            }
            "getChainValidators" => {
                let chain_id = chain_id_param(params)?;
                let validators = self.methods.chain_validators(store, chain_id).map_err(not_found)?;
                Ok(chain_validators_json(&validators))
            }
            "isChainIDAvailable" => {
                let chain_id = chain_id_param(params)?;
                let own = self.methods.own_chain_id();
                let available = chain_id.network() == own.network()
                    && !chain_id.is_mainchain()
                    && !self.methods.is_chain_id_registered(store, chain_id);
                Ok(json!({ "result": available }))
            }
            "isChainNameAvailable" => {
                let name = params
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| EndpointError::InvalidRequest("missing name".into()))?;
                invariant_chain_name(name)
                    .map_err(|e| EndpointError::InvalidRequest(e.to_string()))?;
                Ok(json!({ "result": !self.methods.is_name_registered(store, name) }))
            }
            "getMinReturnFeePerByte" => {
                let chain_id = chain_id_param(params)?;
                let fee = self
                    .methods
                    .get_min_return_fee_per_byte(store, chain_id)
                    .map_err(not_found)?;
                Ok(json!({ "minReturnFeePerByte": fee.to_string() }))
            }
            other => Err(EndpointError::UnknownMethod(other.to_string())),
        }
    }
}

fn not_found(e: InteropError) -> EndpointError {
    match e {
        InteropError::ChainNotFound(_)
        | InteropError::ChannelNotFound(_)
        | InteropError::OwnChainNotFound => EndpointError::NotFound(e.to_string()),
        other => EndpointError::Interop(other),
    }
}

fn chain_id_param(params: &Value) -> Result<ChainId, EndpointError> {
    let text = params
        .get("chainID")
        .and_then(Value::as_str)
        .ok_or_else(|| EndpointError::InvalidRequest("missing chainID".into()))?;
    let bytes =
        hex::decode(text).map_err(|e| EndpointError::InvalidRequest(format!("chainID: {e}")))?;
    ChainId::from_slice(&bytes).map_err(|e| EndpointError::InvalidRequest(e.to_string()))
}

fn chain_account_json(chain_id: ChainId, account: &ChainAccount) -> Value {
    let cert = &account.last_certificate;
    json!({
        "chainID": chain_id.to_hex(),
        "name": account.name,
        "status": account.status.as_str(),
        "lastCertificate": {
            "height": cert.height,
            "timestamp": cert.timestamp,
            "stateRoot": hex::encode(cert.state_root),
            "validatorsHash": hex::encode(cert.validators_hash),
        },
    })
}

fn tree_json(tree: &MerkleAccumulator) -> Value {
    json!({
        "root": hex::encode(tree.root),
        "size": tree.size,
        "appendPath": tree.append_path.iter().map(hex::encode).collect::<Vec<_>>(),
    })
}

fn channel_json(channel: &ChannelData) -> Value {
    json!({
        "inbox": tree_json(&channel.inbox),
        "outbox": tree_json(&channel.outbox),
        "partnerChainOutboxRoot": hex::encode(channel.partner_chain_outbox_root),
        "messageFeeTokenID": hex::encode(channel.message_fee_token_id),
        "minReturnFeePerByte": channel.min_return_fee_per_byte.to_string(),
    })
}

fn own_chain_json(own: &OwnChainAccount) -> Value {
    json!({
        "name": own.name,
        "chainID": own.chain_id.to_hex(),
        "nonce": own.nonce.to_string(),
    })
}

fn terminated_state_json(account: &TerminatedStateAccount) -> Value {
    json!({
        "stateRoot": hex::encode(account.state_root),
        "mainchainStateRoot": hex::encode(account.mainchain_state_root),
        "initialized": account.initialized,
    })
}

fn terminated_outbox_json(account: &TerminatedOutboxAccount) -> Value {
    json!({
        "outboxRoot": hex::encode(account.outbox_root),
        "outboxSize": account.outbox_size,
        "partnerChainInboxSize": account.partner_chain_inbox_size,
    })
}

fn chain_validators_json(validators: &ChainValidators) -> Value {
    json!({
        "activeValidators": validators
            .active_validators
            .iter()
            .map(|v| {
                json!({
                    "blsKey": hex::encode(&v.bls_key),
                    "bftWeight": v.bft_weight.to_string(),
                })
            })
            .collect::<Vec<_>>(),
        "certificateThreshold": validators.certificate_threshold.to_string(),
    })
}
