//! `recoverState`: hand store entries of a terminated chain back to the
//! module that owns them.
//!
//! The entries are proven against the frozen state root. Once recovered,
//! each entry's leaf is replaced by [`RECOVERED_STORE_VALUE`] and the root
//! recomputed with the same siblings, so a second proof of the same entry
//! fails.

use std::sync::Arc;

use tracing::{info, warn};

use crate::algorithms::merkle_tree::sha256;
use crate::algorithms::sparse_merkle::{calculate_root, QueryProof};
use crate::context::{MethodContext, RecoverContext};
use crate::domain::{
    decode_params, invariant_distinct_store_entries, InteropError, StateRecoveryParams,
    TerminatedStateAccount, COMMAND_RECOVER_STATE, EVENT_INVALID_SMT_VERIFICATION,
    RECOVERED_STORE_VALUE,
};
use crate::methods::{events, InternalMethods};
use crate::ports::InteropCommand;
use crate::registry::ModuleRegistry;
use crate::stores::proof_key;

/// Recover module state of a terminated chain.
#[derive(Clone, Debug)]
pub struct RecoverStateCommand {
    methods: InternalMethods,
    registry: Arc<ModuleRegistry>,
}

impl RecoverStateCommand {
    /// Command dispatching to the modules of `registry`.
    pub fn new(methods: InternalMethods, registry: Arc<ModuleRegistry>) -> Self {
        Self { methods, registry }
    }

    fn terminated_state(
        &self,
        store: &dyn ic_store::StateStore,
        params: &StateRecoveryParams,
    ) -> Result<TerminatedStateAccount, InteropError> {
        let account = self
            .methods
            .stores()
            .terminated_state
            .get_opt(store, params.chain_id.as_bytes())?
            .ok_or(InteropError::TerminatedStateNotFound(params.chain_id))?;
        if !account.initialized {
            return Err(InteropError::TerminatedStateNotInitialized(params.chain_id));
        }
        Ok(account)
    }
}

fn queries(params: &StateRecoveryParams, recovered: bool) -> Vec<QueryProof> {
    params
        .store_entries
        .iter()
        .map(|entry| QueryProof {
            key: proof_key(&params.module, &entry.substore_prefix, &entry.store_key),
            value: if recovered {
                RECOVERED_STORE_VALUE
            } else {
                sha256(&entry.store_value)
            },
            bitmap: entry.bitmap.clone(),
        })
        .collect()
}

impl InteropCommand for RecoverStateCommand {
    fn name(&self) -> &'static str {
        COMMAND_RECOVER_STATE
    }

    fn verify(&self, ctx: &MethodContext<'_>, params: &[u8]) -> Result<(), InteropError> {
        let params: StateRecoveryParams = decode_params(params)?;
        self.terminated_state(&*ctx.store, &params)?;

        let module = self
            .registry
            .module(&params.module)
            .ok_or_else(|| InteropError::ModuleNotRegistered(params.module.clone()))?;
        if !module.supports_recovery() {
            return Err(InteropError::RecoveryNotSupported(params.module));
        }
        if params.store_entries.is_empty() {
            return Err(InteropError::InvalidParams("no store entries".into()));
        }
        invariant_distinct_store_entries(&params.store_entries)
    }

    fn execute(&self, ctx: &mut MethodContext<'_>, params: &[u8]) -> Result<(), InteropError> {
        let params: StateRecoveryParams = decode_params(params)?;
        let chain_id = params.chain_id;
        let mut terminated = self.terminated_state(&*ctx.store, &params)?;

        let proven = calculate_root(&params.sibling_hashes, &queries(&params, false));
        if !matches!(proven, Ok(root) if root == terminated.state_root) {
            warn!(
                chain_id = %chain_id,
                module = %params.module,
                "[ic-interop] Recovery proof does not match the terminated state root"
            );
            events::failure(ctx.events, EVENT_INVALID_SMT_VERIFICATION, chain_id, true)?;
            return Err(InteropError::InvalidStateProof(
                "store entries not included in the terminated state".into(),
            ));
        }

        let module = self
            .registry
            .module(&params.module)
            .ok_or_else(|| InteropError::ModuleNotRegistered(params.module.clone()))?;
        for entry in &params.store_entries {
            let mut recover_ctx = RecoverContext {
                store: &mut *ctx.store,
                events: &mut *ctx.events,
                block: ctx.block,
                terminated_chain_id: chain_id,
                substore_prefix: entry.substore_prefix.clone(),
                store_key: entry.store_key.clone(),
                store_value: entry.store_value.clone(),
            };
            module
                .recover(&mut recover_ctx)
                .map_err(|source| InteropError::Hook {
                    module: params.module.clone(),
                    hook: "recover",
                    source,
                })?;
        }

        terminated.state_root = calculate_root(&params.sibling_hashes, &queries(&params, true))?;
        self.methods
            .stores()
            .terminated_state
            .set(ctx.store, chain_id.as_bytes(), &terminated)?;

        info!(
            chain_id = %chain_id,
            module = %params.module,
            entries = params.store_entries.len(),
            "[ic-interop] State recovered"
        );
        Ok(())
    }
}
