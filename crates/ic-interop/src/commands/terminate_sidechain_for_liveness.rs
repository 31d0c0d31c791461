//! `terminateSidechainForLiveness`: anyone may terminate a sidechain that
//! stopped posting certificates.

use crate::context::MethodContext;
use crate::domain::{
    decode_params, ChainRole, ChainStatus, InteropError, TerminateSidechainForLivenessParams,
    COMMAND_TERMINATE_SIDECHAIN_FOR_LIVENESS,
};
use crate::methods::InternalMethods;
use crate::ports::InteropCommand;

use super::require_role;

/// Terminate an active sidechain past its liveness limit.
#[derive(Clone, Debug)]
pub struct TerminateSidechainForLivenessCommand {
    methods: InternalMethods,
}

impl TerminateSidechainForLivenessCommand {
    /// Command over `methods`.
    pub fn new(methods: InternalMethods) -> Self {
        Self { methods }
    }
}

impl InteropCommand for TerminateSidechainForLivenessCommand {
    fn name(&self) -> &'static str {
        COMMAND_TERMINATE_SIDECHAIN_FOR_LIVENESS
    }

    fn verify(&self, ctx: &MethodContext<'_>, params: &[u8]) -> Result<(), InteropError> {
        require_role(
            &self.methods,
            ChainRole::Mainchain,
            COMMAND_TERMINATE_SIDECHAIN_FOR_LIVENESS,
        )?;
        let TerminateSidechainForLivenessParams { chain_id } = decode_params(params)?;
        let store = &*ctx.store;

        let account = self.methods.chain_account(store, chain_id)?;
        match account.status {
            ChainStatus::Terminated => return Err(InteropError::ChainTerminated(chain_id)),
            ChainStatus::Registered => return Err(InteropError::ChainNotActive(chain_id)),
            ChainStatus::Active => {}
        }
        if self.methods.is_live(store, chain_id, ctx.block.timestamp)? {
            return Err(InteropError::ChainStillLive(chain_id));
        }
        Ok(())
    }

    fn execute(&self, ctx: &mut MethodContext<'_>, params: &[u8]) -> Result<(), InteropError> {
        let TerminateSidechainForLivenessParams { chain_id } = decode_params(params)?;
        self.methods.terminate_chain_internal(ctx, chain_id)
    }
}
