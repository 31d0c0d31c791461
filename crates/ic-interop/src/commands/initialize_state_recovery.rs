//! `initializeStateRecovery`: prove a terminated sidechain's account
//! against the mainchain state and freeze its state root for recovery.

use tracing::{info, warn};

use crate::algorithms::merkle_tree::sha256;
use crate::algorithms::sparse_merkle::{calculate_root, QueryProof};
use crate::context::MethodContext;
use crate::domain::{
    decode_params, ChainAccount, ChainRole, ChainStatus, Hash, InteropError,
    StateRecoveryInitParams, COMMAND_INITIALIZE_STATE_RECOVERY, EMPTY_HASH,
    EVENT_INVALID_SMT_VERIFICATION,
};
use crate::methods::{events, InternalMethods};
use crate::ports::InteropCommand;
use crate::stores::chain_account_proof_key;

use super::require_role;

/// Initialize the terminated-state account of a sidechain from a proof of
/// its mainchain record.
#[derive(Clone, Debug)]
pub struct InitializeStateRecoveryCommand {
    methods: InternalMethods,
}

impl InitializeStateRecoveryCommand {
    /// Command over `methods`.
    pub fn new(methods: InternalMethods) -> Self {
        Self { methods }
    }

    /// Root the proof is checked against: the mainchain root recorded when
    /// the chain was seen terminated, or the last certified mainchain root.
    fn proof_root(
        &self,
        store: &dyn ic_store::StateStore,
        params: &StateRecoveryInitParams,
    ) -> Result<Hash, InteropError> {
        if let Some(terminated) = self
            .methods
            .stores()
            .terminated_state
            .get_opt(store, params.chain_id.as_bytes())?
        {
            return Ok(terminated.mainchain_state_root);
        }
        let mainchain_id = self.methods.own_chain_id().mainchain_id();
        Ok(self
            .methods
            .chain_account(store, mainchain_id)?
            .last_certificate
            .state_root)
    }
}

impl InteropCommand for InitializeStateRecoveryCommand {
    fn name(&self) -> &'static str {
        COMMAND_INITIALIZE_STATE_RECOVERY
    }

    fn verify(&self, ctx: &MethodContext<'_>, params: &[u8]) -> Result<(), InteropError> {
        require_role(
            &self.methods,
            ChainRole::Sidechain,
            COMMAND_INITIALIZE_STATE_RECOVERY,
        )?;
        let params: StateRecoveryInitParams = decode_params(params)?;
        let store = &*ctx.store;
        let chain_id = params.chain_id;
        let own = self.methods.own_chain_id();

        if chain_id == own || chain_id == own.mainchain_id() {
            return Err(InteropError::InvalidChainId(chain_id, "not a recoverable sidechain"));
        }
        if let Some(terminated) = self
            .methods
            .stores()
            .terminated_state
            .get_opt(store, chain_id.as_bytes())?
        {
            if terminated.initialized {
                return Err(InteropError::TerminatedStateAlreadyInitialized(chain_id));
            }
        }

        let sidechain: ChainAccount = decode_params(&params.sidechain_account)?;
        let mainchain = self.methods.chain_account(store, own.mainchain_id())?;
        let inactive_for = mainchain
            .last_certificate
            .timestamp
            .saturating_sub(sidechain.last_certificate.timestamp);
        if sidechain.status != ChainStatus::Terminated
            && inactive_for <= self.methods.config().liveness_limit_secs
        {
            return Err(InteropError::ChainStillLive(chain_id));
        }
        Ok(())
    }

    fn execute(&self, ctx: &mut MethodContext<'_>, params: &[u8]) -> Result<(), InteropError> {
        let params: StateRecoveryInitParams = decode_params(params)?;
        let chain_id = params.chain_id;
        let root = self.proof_root(&*ctx.store, &params)?;

        let query = QueryProof {
            key: chain_account_proof_key(chain_id),
            value: sha256(&params.sidechain_account),
            bitmap: params.bitmap.clone(),
        };
        let proven = calculate_root(&params.sibling_hashes, std::slice::from_ref(&query));
        if !matches!(proven, Ok(computed) if computed == root) {
            warn!(
                chain_id = %chain_id,
                "[ic-interop] Sidechain account proof does not match the mainchain state root"
            );
            events::failure(ctx.events, EVENT_INVALID_SMT_VERIFICATION, chain_id, true)?;
            return Err(InteropError::InvalidStateProof(
                "sidechain account not included in the mainchain state".into(),
            ));
        }

        let sidechain: ChainAccount = decode_params(&params.sidechain_account)?;
        let state_root = sidechain.last_certificate.state_root;
        let stores = self.methods.stores();
        match stores.terminated_state.get_opt(&*ctx.store, chain_id.as_bytes())? {
            Some(mut terminated) => {
                terminated.state_root = state_root;
                terminated.mainchain_state_root = EMPTY_HASH;
                terminated.initialized = true;
                stores
                    .terminated_state
                    .set(ctx.store, chain_id.as_bytes(), &terminated)?;
            }
            None => {
                self.methods
                    .create_terminated_state_account(ctx, chain_id, Some(state_root))?;
            }
        }
        info!(
            chain_id = %chain_id,
            state_root = %hex::encode(state_root),
            "[ic-interop] State recovery initialized"
        );
        Ok(())
    }
}
