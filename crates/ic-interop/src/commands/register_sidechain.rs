//! `registerSidechain`: open a channel to a new sidechain.

use crate::context::MethodContext;
use crate::domain::{
    decode_params, invariant_certificate_threshold, invariant_chain_name, invariant_validators,
    ChainRole, ChannelData, InteropError, RegistrationCcmParams, SidechainRegistrationParams,
    COMMAND_REGISTER_SIDECHAIN, CROSS_CHAIN_COMMAND_REGISTRATION, MODULE_NAME_INTEROPERABILITY,
};
use crate::methods::{InternalMethods, OutboundMessage};
use crate::ports::InteropCommand;

use super::require_role;

/// Register a sidechain on the mainchain.
#[derive(Clone, Debug)]
pub struct RegisterSidechainCommand {
    methods: InternalMethods,
}

impl RegisterSidechainCommand {
    /// Command over `methods`.
    pub fn new(methods: InternalMethods) -> Self {
        Self { methods }
    }
}

impl InteropCommand for RegisterSidechainCommand {
    fn name(&self) -> &'static str {
        COMMAND_REGISTER_SIDECHAIN
    }

    fn verify(&self, ctx: &MethodContext<'_>, params: &[u8]) -> Result<(), InteropError> {
        require_role(
            &self.methods,
            ChainRole::Mainchain,
            COMMAND_REGISTER_SIDECHAIN,
        )?;
        let params: SidechainRegistrationParams = decode_params(params)?;
        let store = &*ctx.store;

        invariant_chain_name(&params.name)?;
        if self.methods.is_name_registered(store, &params.name) {
            return Err(InteropError::NameAlreadyRegistered(params.name));
        }

        let chain_id = params.chain_id;
        let own = self.methods.own_chain_id();
        if chain_id.network() != own.network() {
            return Err(InteropError::InvalidChainId(chain_id, "belongs to another network"));
        }
        if chain_id.is_mainchain() {
            return Err(InteropError::InvalidChainId(chain_id, "reserved for the mainchain"));
        }
        if self.methods.is_chain_id_registered(store, chain_id) {
            return Err(InteropError::ChainAlreadyRegistered(chain_id));
        }

        let total = invariant_validators(
            &params.sidechain_validators,
            self.methods.config().max_num_validators,
        )?;
        invariant_certificate_threshold(params.sidechain_certificate_threshold, total)
    }

    fn execute(&self, ctx: &mut MethodContext<'_>, params: &[u8]) -> Result<(), InteropError> {
        let params: SidechainRegistrationParams = decode_params(params)?;
        let config = self.methods.config();
        let channel = ChannelData::new(config.message_fee_token_id, config.min_return_fee_per_byte);
        let registration = RegistrationCcmParams {
            name: params.name.clone(),
            chain_id: params.chain_id,
            message_fee_token_id: channel.message_fee_token_id,
            min_return_fee_per_byte: channel.min_return_fee_per_byte,
        };

        self.methods.register_chain(
            ctx,
            params.chain_id,
            &params.name,
            params.sidechain_validators,
            params.sidechain_certificate_threshold,
            channel,
        )?;
        self.methods.send_internal(
            ctx,
            OutboundMessage {
                module: MODULE_NAME_INTEROPERABILITY.to_string(),
                cross_chain_command: CROSS_CHAIN_COMMAND_REGISTRATION.to_string(),
                receiving_chain_id: params.chain_id,
                fee: 0,
                params: ic_store::encode(&registration)?,
            },
        )?;
        Ok(())
    }
}
