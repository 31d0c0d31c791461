//! # Cross-Chain Update
//!
//! Delivers certified messages of a partner chain:
//!
//! 1. `verify`: sending chain, liveness, certificate, validator update and
//!    witness shape.
//! 2. `execute`: certificate signature, inbox replay against the partner's
//!    outbox root, then every message in order, then the certificate,
//!    validator and outbox root bookkeeping.
//!
//! The mainchain and sidechain variants differ only in which chains may
//! submit and in the routing rule applied to each message.

use tracing::{debug, info, warn};

use crate::context::MethodContext;
use crate::dispatcher::CcmDispatcher;
use crate::domain::{
    decode_params, invariant_outbox_root_witness, CcmProcessedCode, CcmProcessedResult,
    Certificate, ChainId, ChainRole, ChainStatus, CrossChainMessage, CrossChainUpdateParams,
    InteropError, COMMAND_SUBMIT_MAINCHAIN_CCU, COMMAND_SUBMIT_SIDECHAIN_CCU,
};
use crate::methods::{events, InternalMethods};
use crate::ports::InteropCommand;

/// Checks an inbound CCM against the own chain and the CCU's sending chain.
pub type RoutingRule = fn(
    own_chain_id: ChainId,
    sending_chain_id: ChainId,
    ccm: &CrossChainMessage,
) -> Result<(), InteropError>;

/// The mainchain relays messages between sidechains, so a message only has
/// to originate at the submitting chain and not loop back to it.
pub fn mainchain_routing(
    _own_chain_id: ChainId,
    sending_chain_id: ChainId,
    ccm: &CrossChainMessage,
) -> Result<(), InteropError> {
    if ccm.sending_chain_id != sending_chain_id {
        return Err(InteropError::RoutingViolation(format!(
            "message from {} delivered by {}",
            ccm.sending_chain_id, sending_chain_id
        )));
    }
    if ccm.sending_chain_id == ccm.receiving_chain_id {
        return Err(InteropError::RoutingViolation(
            "message addressed to its own sender".into(),
        ));
    }
    Ok(())
}

/// A sidechain only accepts messages addressed to itself.
pub fn sidechain_routing(
    own_chain_id: ChainId,
    _sending_chain_id: ChainId,
    ccm: &CrossChainMessage,
) -> Result<(), InteropError> {
    if ccm.receiving_chain_id != own_chain_id {
        return Err(InteropError::RoutingViolation(format!(
            "message for {} delivered to {}",
            ccm.receiving_chain_id, own_chain_id
        )));
    }
    Ok(())
}

/// Which side of the hub the CCU is submitted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CcuVariant {
    /// Sidechain CCUs submitted on the mainchain
    Mainchain,
    /// Mainchain CCUs submitted on a sidechain
    Sidechain,
}

impl CcuVariant {
    /// Variant run by a chain with `role`.
    pub fn for_role(role: ChainRole) -> Self {
        match role {
            ChainRole::Mainchain => CcuVariant::Mainchain,
            ChainRole::Sidechain => CcuVariant::Sidechain,
        }
    }

    /// Command name.
    pub fn command_name(self) -> &'static str {
        match self {
            CcuVariant::Mainchain => COMMAND_SUBMIT_SIDECHAIN_CCU,
            CcuVariant::Sidechain => COMMAND_SUBMIT_MAINCHAIN_CCU,
        }
    }

    /// Routing rule applied to every delivered message.
    pub fn routing_rule(self) -> RoutingRule {
        match self {
            CcuVariant::Mainchain => mainchain_routing,
            CcuVariant::Sidechain => sidechain_routing,
        }
    }

    fn check_sending_chain(
        self,
        own_chain_id: ChainId,
        sending_chain_id: ChainId,
    ) -> Result<(), InteropError> {
        match self {
            CcuVariant::Mainchain if sending_chain_id == own_chain_id => Err(
                InteropError::InvalidChainId(sending_chain_id, "CCU sent by the own chain"),
            ),
            CcuVariant::Sidechain if sending_chain_id != own_chain_id.mainchain_id() => {
                Err(InteropError::InvalidChainId(
                    sending_chain_id,
                    "sidechains only accept mainchain CCUs",
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Submit a cross-chain update.
#[derive(Clone, Debug)]
pub struct CrossChainUpdateCommand {
    methods: InternalMethods,
    dispatcher: CcmDispatcher,
    variant: CcuVariant,
}

impl CrossChainUpdateCommand {
    /// CCU command for the own chain's role.
    pub fn new(methods: InternalMethods, dispatcher: CcmDispatcher) -> Self {
        let variant = CcuVariant::for_role(methods.role());
        Self {
            methods,
            dispatcher,
            variant,
        }
    }

    /// Variant in use.
    pub fn variant(&self) -> CcuVariant {
        self.variant
    }

    fn certificate(params: &CrossChainUpdateParams) -> Result<Option<Certificate>, InteropError> {
        if params.certificate.is_empty() {
            return Ok(None);
        }
        Certificate::decode(&params.certificate).map(Some)
    }

    fn validators_changed(
        &self,
        ctx: &MethodContext<'_>,
        params: &CrossChainUpdateParams,
    ) -> Result<bool, InteropError> {
        if !params.active_validators_update.is_empty() {
            return Ok(true);
        }
        let current = self
            .methods
            .chain_validators(&*ctx.store, params.sending_chain_id)?;
        Ok(params.certificate_threshold != current.certificate_threshold)
    }

    /// Decode, format-check and route one delivered message.
    fn decode_inbound(
        &self,
        sending_chain_id: ChainId,
        bytes: &[u8],
    ) -> Result<CrossChainMessage, (Option<CrossChainMessage>, CcmProcessedCode, InteropError)> {
        let max = self.methods.config().max_ccm_size;
        let ccm = CrossChainMessage::decode(bytes, max)
            .map_err(|e| (None, CcmProcessedCode::InvalidCcmDecodingException, e))?;
        if let Err(e) = ccm.validate_format(max) {
            return Err((Some(ccm), CcmProcessedCode::InvalidCcmDecodingException, e));
        }
        let route = self.variant.routing_rule();
        if let Err(e) = route(self.methods.own_chain_id(), sending_chain_id, &ccm) {
            return Err((Some(ccm), CcmProcessedCode::InvalidCcmRoutingException, e));
        }
        Ok(ccm)
    }
}

impl InteropCommand for CrossChainUpdateCommand {
    fn name(&self) -> &'static str {
        self.variant.command_name()
    }

    fn verify(&self, ctx: &MethodContext<'_>, params: &[u8]) -> Result<(), InteropError> {
        let params: CrossChainUpdateParams = decode_params(params)?;
        let store = &*ctx.store;
        let sending = params.sending_chain_id;

        self.methods.own_chain_account(store)?;
        self.variant
            .check_sending_chain(self.methods.own_chain_id(), sending)?;

        let account = self.methods.chain_account(store, sending)?;
        if account.status == ChainStatus::Terminated {
            return Err(InteropError::ChainTerminated(sending));
        }
        if !self.methods.is_live(store, sending, ctx.block.timestamp)? {
            return Err(InteropError::ChainNotLive(sending));
        }

        let certificate = Self::certificate(&params)?;
        if account.status == ChainStatus::Registered && certificate.is_none() {
            return Err(InteropError::InvalidCertificate(
                "the first CCU of a chain must carry a certificate".into(),
            ));
        }
        if let Some(certificate) = &certificate {
            self.methods
                .verify_certificate(store, &params, certificate, ctx.block.timestamp)?;
        }

        if self.validators_changed(ctx, &params)? {
            let Some(certificate) = &certificate else {
                return Err(InteropError::InvalidParams(
                    "validator update without certificate".into(),
                ));
            };
            self.methods
                .verify_validators_update(store, &params, certificate)?;
        }

        invariant_outbox_root_witness(&params.inbox_update, certificate.is_some())
    }

    fn execute(&self, ctx: &mut MethodContext<'_>, params: &[u8]) -> Result<(), InteropError> {
        let params: CrossChainUpdateParams = decode_params(params)?;
        let sending = params.sending_chain_id;
        let own = self.methods.own_chain_id();
        let certificate = Self::certificate(&params)?;
        let validators_changed = self.validators_changed(ctx, &params)?;

        if let Some(certificate) = &certificate {
            self.methods
                .verify_certificate_signature(ctx, sending, certificate)?;
        }

        let inbox_update = &params.inbox_update;
        if !inbox_update.is_empty()
            && self
                .methods
                .verify_partner_chain_outbox_root(ctx, &params, certificate.as_ref())
                .is_err()
        {
            // The failure event is the only effect.
            return Ok(());
        }

        for bytes in &inbox_update.cross_chain_messages {
            let ccm = match self.decode_inbound(sending, bytes) {
                Ok(ccm) => ccm,
                Err((ccm, code, e)) => {
                    warn!(
                        chain_id = %sending,
                        code = ?code,
                        error = %e,
                        "[ic-interop] Undeliverable CCM, terminating sending chain"
                    );
                    self.methods.terminate_chain_internal(ctx, sending)?;
                    events::ccm_processed(
                        ctx.events,
                        vec![sending.as_bytes().to_vec(), own.as_bytes().to_vec()],
                        ccm.as_ref(),
                        CcmProcessedResult::Discarded,
                        code,
                    )?;
                    return Ok(());
                }
            };

            self.methods.append_to_inbox_tree(ctx.store, sending, bytes)?;
            let forwarded = self.variant == CcuVariant::Mainchain && ccm.receiving_chain_id != own;
            let result = if forwarded {
                self.dispatcher.forward(ctx, ccm, bytes.len(), sending)?
            } else {
                self.dispatcher.apply(ctx, ccm, bytes.len(), sending)?
            };
            debug!(chain_id = %sending, result = ?result, "[ic-interop] CCM processed");
        }

        if let Some(certificate) = &certificate {
            if validators_changed {
                self.methods.update_validators(ctx.store, &params)?;
            }
            self.methods.update_certificate(ctx, sending, certificate)?;
        }
        if certificate.is_some() && !inbox_update.is_empty() {
            self.methods.update_partner_chain_outbox_root(
                ctx.store,
                sending,
                &inbox_update.message_witness_hashes,
            )?;
        }

        info!(
            chain_id = %sending,
            messages = inbox_update.cross_chain_messages.len(),
            certified = certificate.is_some(),
            "[ic-interop] Cross-chain update applied"
        );
        Ok(())
    }
}
