//! Cross-chain commands of the interoperability module itself.

use std::sync::Arc;

use tracing::{debug, info};

use crate::context::CcmContext;
use crate::domain::{
    decode_params, CcmStatusCode, HookError, RegistrationCcmParams, SidechainTerminatedCcmParams,
    CROSS_CHAIN_COMMAND_CHANNEL_TERMINATED, CROSS_CHAIN_COMMAND_REGISTRATION,
    CROSS_CHAIN_COMMAND_SIDECHAIN_TERMINATED, EMPTY_HASH, MODULE_NAME_INTEROPERABILITY,
};
use crate::methods::InternalMethods;
use crate::ports::{CrossChainCommand, CrossChainModule};

/// The interoperability module as a cross-chain module.
#[derive(Clone, Debug)]
pub struct InteroperabilityModule {
    methods: InternalMethods,
}

impl InteroperabilityModule {
    /// Module backed by `methods`.
    pub fn new(methods: InternalMethods) -> Self {
        Self { methods }
    }
}

impl CrossChainModule for InteroperabilityModule {
    fn name(&self) -> &str {
        MODULE_NAME_INTEROPERABILITY
    }

    fn cross_chain_commands(&self) -> Vec<Arc<dyn CrossChainCommand>> {
        vec![
            Arc::new(RegistrationCommand {
                methods: self.methods.clone(),
            }),
            Arc::new(ChannelTerminatedCommand {
                methods: self.methods.clone(),
            }),
            Arc::new(SidechainTerminatedCommand {
                methods: self.methods.clone(),
            }),
        ]
    }
}

/// First message on a new channel. Confirms both sides agree on the
/// channel parameters.
#[derive(Debug)]
pub struct RegistrationCommand {
    methods: InternalMethods,
}

impl CrossChainCommand for RegistrationCommand {
    fn name(&self) -> &str {
        CROSS_CHAIN_COMMAND_REGISTRATION
    }

    fn validate_params(&self, params: &[u8]) -> Result<(), HookError> {
        decode_params::<RegistrationCcmParams>(params)?;
        Ok(())
    }

    fn verify(&self, ctx: &CcmContext<'_>) -> Result<(), HookError> {
        let ccm = &ctx.ccm;
        let params: RegistrationCcmParams = decode_params(&ccm.params)?;
        let store = &*ctx.store;

        if ccm.sending_chain_id != ctx.transaction_sending_chain_id {
            return Err(HookError::Rejected(
                "registration must come from the direct partner".into(),
            ));
        }
        if ccm.status != CcmStatusCode::Ok.code() {
            return Err(HookError::Rejected("registration with non-OK status".into()));
        }

        let own = self.methods.own_chain_account(store)?;
        if own.chain_id != ccm.receiving_chain_id || own.chain_id != params.chain_id {
            return Err(HookError::Rejected("registration for another chain".into()));
        }
        if own.name != params.name {
            return Err(HookError::Rejected(format!(
                "registration names {:?}, own name is {:?}",
                params.name, own.name
            )));
        }

        let channel = self.methods.channel(store, ccm.sending_chain_id)?;
        if channel.message_fee_token_id != params.message_fee_token_id
            || channel.min_return_fee_per_byte != params.min_return_fee_per_byte
        {
            return Err(HookError::Rejected("channel fee parameters differ".into()));
        }
        if channel.inbox.size != 1 {
            return Err(HookError::Rejected(
                "registration is not the first message of the channel".into(),
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &mut CcmContext<'_>) -> Result<(), HookError> {
        debug!(
            sending_chain_id = %ctx.ccm.sending_chain_id,
            "[ic-interop] Channel registration confirmed"
        );
        Ok(())
    }
}

/// The partner terminated its channel with this chain.
#[derive(Debug)]
pub struct ChannelTerminatedCommand {
    methods: InternalMethods,
}

impl CrossChainCommand for ChannelTerminatedCommand {
    fn name(&self) -> &str {
        CROSS_CHAIN_COMMAND_CHANNEL_TERMINATED
    }

    fn validate_params(&self, params: &[u8]) -> Result<(), HookError> {
        if !params.is_empty() {
            return Err(HookError::InvalidParams(
                "channelTerminated carries no params".into(),
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &mut CcmContext<'_>) -> Result<(), HookError> {
        let sending = ctx.ccm.sending_chain_id;
        if self
            .methods
            .stores()
            .terminated_state
            .has(&*ctx.store, sending.as_bytes())
        {
            return Ok(());
        }
        self.methods
            .create_terminated_state_account(&mut ctx.method_context(), sending, None)?;
        info!(chain_id = %sending, "[ic-interop] Partner terminated its channel");
        Ok(())
    }
}

/// The mainchain reports a terminated sidechain and its frozen state root.
#[derive(Debug)]
pub struct SidechainTerminatedCommand {
    methods: InternalMethods,
}

impl CrossChainCommand for SidechainTerminatedCommand {
    fn name(&self) -> &str {
        CROSS_CHAIN_COMMAND_SIDECHAIN_TERMINATED
    }

    fn validate_params(&self, params: &[u8]) -> Result<(), HookError> {
        decode_params::<SidechainTerminatedCcmParams>(params)?;
        Ok(())
    }

    fn verify(&self, ctx: &CcmContext<'_>) -> Result<(), HookError> {
        let mainchain_id = self.methods.own_chain_id().mainchain_id();
        if ctx.ccm.sending_chain_id != mainchain_id || self.methods.own_chain_id() == mainchain_id {
            return Err(HookError::Rejected(
                "sidechainTerminated is only accepted from the mainchain".into(),
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &mut CcmContext<'_>) -> Result<(), HookError> {
        let params: SidechainTerminatedCcmParams = decode_params(&ctx.ccm.params)?;
        let stores = self.methods.stores();
        let key = params.chain_id.as_bytes();

        match stores.terminated_state.get_opt(&*ctx.store, key)? {
            Some(account) if account.initialized => {}
            Some(mut account) => {
                account.state_root = params.state_root;
                account.mainchain_state_root = EMPTY_HASH;
                account.initialized = true;
                stores.terminated_state.set(ctx.store, key, &account)?;
            }
            None => {
                self.methods.create_terminated_state_account(
                    &mut ctx.method_context(),
                    params.chain_id,
                    Some(params.state_root),
                )?;
            }
        }
        info!(chain_id = %params.chain_id, "[ic-interop] Sidechain terminated on the mainchain");
        Ok(())
    }
}
