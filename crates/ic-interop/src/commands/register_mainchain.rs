//! `registerMainchain`: open the channel to the mainchain from a sidechain.

use std::sync::Arc;

use tracing::warn;

use crate::context::MethodContext;
use crate::domain::{
    decode_params, invariant_certificate_threshold, invariant_chain_name, invariant_validators,
    ChainRole, ChannelData, InteropError, MainchainRegistrationParams, RegistrationCcmParams,
    RegistrationSignatureMessage, COMMAND_REGISTER_MAINCHAIN, CROSS_CHAIN_COMMAND_REGISTRATION,
    EVENT_INVALID_REGISTRATION_SIGNATURE, MAINCHAIN_NAME, MODULE_NAME_INTEROPERABILITY,
};
use crate::methods::{events, InternalMethods, OutboundMessage};
use crate::ports::{AggregateSignatureCheck, BftValidatorSource, InteropCommand};

use super::require_role;

/// Register the mainchain on a sidechain. The own validators sign the
/// registration.
#[derive(Clone)]
pub struct RegisterMainchainCommand {
    methods: InternalMethods,
    bft: Arc<dyn BftValidatorSource>,
}

impl std::fmt::Debug for RegisterMainchainCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterMainchainCommand")
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

impl RegisterMainchainCommand {
    /// Command checking signatures against the validators of `bft`.
    pub fn new(methods: InternalMethods, bft: Arc<dyn BftValidatorSource>) -> Self {
        Self { methods, bft }
    }

    fn verify_signature(
        &self,
        ctx: &mut MethodContext<'_>,
        params: &MainchainRegistrationParams,
    ) -> Result<(), InteropError> {
        let own = self.bft.own_validators(&*ctx.store)?;
        let message = ic_store::encode(&RegistrationSignatureMessage::from(params))?;
        let tag = self.methods.config().registration_tag.as_bytes();
        let check = AggregateSignatureCheck {
            validators: &own.active_validators,
            aggregation_bits: &params.aggregation_bits,
            signature: &params.signature,
            tag,
            chain_id: params.own_chain_id,
            threshold: own.certificate_threshold,
            message: &message,
        };
        if self.methods.verifier().verify_weighted_aggregate(&check) {
            return Ok(());
        }
        warn!(
            chain_id = %params.own_chain_id,
            "[ic-interop] Invalid mainchain registration signature"
        );
        events::failure(
            ctx.events,
            EVENT_INVALID_REGISTRATION_SIGNATURE,
            params.own_chain_id,
            true,
        )?;
        Err(InteropError::InvalidRegistrationSignature)
    }
}

impl InteropCommand for RegisterMainchainCommand {
    fn name(&self) -> &'static str {
        COMMAND_REGISTER_MAINCHAIN
    }

    fn verify(&self, ctx: &MethodContext<'_>, params: &[u8]) -> Result<(), InteropError> {
        require_role(
            &self.methods,
            ChainRole::Sidechain,
            COMMAND_REGISTER_MAINCHAIN,
        )?;
        let params: MainchainRegistrationParams = decode_params(params)?;
        let store = &*ctx.store;

        if params.own_chain_id != self.methods.own_chain_id() {
            return Err(InteropError::InvalidChainId(
                params.own_chain_id,
                "not the own chain ID",
            ));
        }
        if self.methods.own_chain_account(store).is_ok() {
            return Err(InteropError::OwnChainAlreadyRegistered);
        }
        let mainchain_id = params.own_chain_id.mainchain_id();
        if self.methods.is_chain_id_registered(store, mainchain_id) {
            return Err(InteropError::ChainAlreadyRegistered(mainchain_id));
        }
        invariant_chain_name(&params.own_name)?;

        let total = invariant_validators(
            &params.mainchain_validators,
            self.methods.config().max_num_validators,
        )?;
        invariant_certificate_threshold(params.mainchain_certificate_threshold, total)
    }

    fn execute(&self, ctx: &mut MethodContext<'_>, params: &[u8]) -> Result<(), InteropError> {
        let params: MainchainRegistrationParams = decode_params(params)?;
        self.verify_signature(ctx, &params)?;

        let config = self.methods.config();
        let mainchain_id = params.own_chain_id.mainchain_id();
        let channel = ChannelData::new(config.message_fee_token_id, config.min_return_fee_per_byte);
        let registration = RegistrationCcmParams {
            name: MAINCHAIN_NAME.to_string(),
            chain_id: mainchain_id,
            message_fee_token_id: channel.message_fee_token_id,
            min_return_fee_per_byte: channel.min_return_fee_per_byte,
        };

        self.methods.register_chain(
            ctx,
            mainchain_id,
            MAINCHAIN_NAME,
            params.mainchain_validators,
            params.mainchain_certificate_threshold,
            channel,
        )?;
        self.methods.set_own_chain_account(ctx, &params.own_name)?;
        self.methods.send_internal(
            ctx,
            OutboundMessage {
                module: MODULE_NAME_INTEROPERABILITY.to_string(),
                cross_chain_command: CROSS_CHAIN_COMMAND_REGISTRATION.to_string(),
                receiving_chain_id: mainchain_id,
                fee: 0,
                params: ic_store::encode(&registration)?,
            },
        )?;
        Ok(())
    }
}
