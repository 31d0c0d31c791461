//! Inbox/outbox appends and outbound sends.

use ic_store::StateStore;
use tracing::{debug, warn};

use super::{events, InternalMethods};
use crate::algorithms::merkle_tree::sha256;
use crate::context::MethodContext;
use crate::domain::{
    CcmSentFailedCode, CcmStatusCode, ChainId, ChainStatus, ChannelData, CrossChainMessage,
    InteropError, OutboxRoot,
};
use crate::stores::OWN_CHAIN_KEY;

/// Message handed to [`InternalMethods::send`]. Nonce, sending chain and
/// status are filled in by the method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Target module
    pub module: String,
    /// Target cross-chain command
    pub cross_chain_command: String,
    /// Destination chain
    pub receiving_chain_id: ChainId,
    /// Fee paid by the sender
    pub fee: u64,
    /// Command params
    pub params: Vec<u8>,
}

impl InternalMethods {
    /// Append `ccm_bytes` to the inbox of the channel with `chain_id`.
    pub fn append_to_inbox_tree(
        &self,
        store: &mut dyn StateStore,
        chain_id: ChainId,
        ccm_bytes: &[u8],
    ) -> Result<ChannelData, InteropError> {
        let mut channel = self.channel(store, chain_id)?;
        channel.inbox.append(&sha256(ccm_bytes))?;
        self.stores.channel.set(store, chain_id.as_bytes(), &channel)?;
        Ok(channel)
    }

    /// Append `ccm_bytes` to the outbox of the channel with `chain_id`.
    pub fn append_to_outbox_tree(
        &self,
        store: &mut dyn StateStore,
        chain_id: ChainId,
        ccm_bytes: &[u8],
    ) -> Result<ChannelData, InteropError> {
        let mut channel = self.channel(store, chain_id)?;
        channel.outbox.append(&sha256(ccm_bytes))?;
        self.stores.channel.set(store, chain_id.as_bytes(), &channel)?;
        Ok(channel)
    }

    /// Append `ccm` to the outbox of the channel with `chain_id` and mirror
    /// the new outbox root.
    pub fn add_to_outbox(
        &self,
        store: &mut dyn StateStore,
        chain_id: ChainId,
        ccm: &CrossChainMessage,
    ) -> Result<(), InteropError> {
        let channel = self.append_to_outbox_tree(store, chain_id, &ccm.encode()?)?;
        self.stores.outbox_root.set(
            store,
            chain_id.as_bytes(),
            &OutboxRoot {
                root: channel.outbox.root,
            },
        )?;
        Ok(())
    }

    /// Send a message on behalf of a module.
    ///
    /// Rejected if the receiving chain is the own chain, has no route, is
    /// only registered or is not live, or if the message is malformed. A
    /// rejection logs an unrevertible `ccmSentFailed` event.
    pub fn send(
        &self,
        ctx: &mut MethodContext<'_>,
        message: OutboundMessage,
    ) -> Result<CrossChainMessage, InteropError> {
        let ccm = self.build_ccm(&*ctx.store, message)?;
        let receiving = ccm.receiving_chain_id;

        let rejection = if receiving == self.own_chain_id() {
            Some(CcmSentFailedCode::InvalidReceivingChain)
        } else if !self.is_reachable(&*ctx.store, receiving, ctx.block.timestamp)? {
            Some(CcmSentFailedCode::ChannelUnavailable)
        } else if ccm.validate_format(self.config.max_ccm_size).is_err() {
            Some(CcmSentFailedCode::InvalidFormat)
        } else {
            None
        };

        if let Some(code) = rejection {
            warn!(
                receiving_chain_id = %receiving,
                module = %ccm.module,
                code = ?code,
                "[ic-interop] CCM send rejected"
            );
            events::ccm_sent_failed(ctx.events, &ccm, code)?;
            return Err(InteropError::SendFailed(format!("{code:?}")));
        }

        self.enqueue(ctx, &ccm)?;
        Ok(ccm)
    }

    /// Send a protocol message without the liveness and status checks of
    /// [`InternalMethods::send`].
    pub fn send_internal(
        &self,
        ctx: &mut MethodContext<'_>,
        message: OutboundMessage,
    ) -> Result<CrossChainMessage, InteropError> {
        let ccm = self.build_ccm(&*ctx.store, message)?;
        ccm.validate_format(self.config.max_ccm_size)?;
        self.enqueue(ctx, &ccm)?;
        Ok(ccm)
    }

    fn build_ccm(
        &self,
        store: &dyn StateStore,
        message: OutboundMessage,
    ) -> Result<CrossChainMessage, InteropError> {
        let own = self.own_chain_account(store)?;
        Ok(CrossChainMessage {
            module: message.module,
            cross_chain_command: message.cross_chain_command,
            nonce: own.nonce,
            fee: message.fee,
            sending_chain_id: own.chain_id,
            receiving_chain_id: message.receiving_chain_id,
            params: message.params,
            status: CcmStatusCode::Ok.code(),
        })
    }

    /// Route exists, partner is past registration and receiver is live.
    fn is_reachable(
        &self,
        store: &dyn StateStore,
        receiving: ChainId,
        timestamp: u64,
    ) -> Result<bool, InteropError> {
        let partner = match self.get_channel_partner(store, receiving) {
            Ok(partner) => partner,
            Err(InteropError::ChannelNotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        let Some(account) = self.stores.chain_account.get_opt(store, partner.as_bytes())? else {
            return Ok(false);
        };
        if account.status == ChainStatus::Registered {
            return Ok(false);
        }
        Ok(self.is_live(store, partner, timestamp)? && self.is_live(store, receiving, timestamp)?)
    }

    /// Append to the partner's outbox, bump the nonce, log success.
    fn enqueue(
        &self,
        ctx: &mut MethodContext<'_>,
        ccm: &CrossChainMessage,
    ) -> Result<(), InteropError> {
        let partner = self.get_channel_partner(&*ctx.store, ccm.receiving_chain_id)?;
        self.add_to_outbox(ctx.store, partner, ccm)?;

        let mut own = self.own_chain_account(&*ctx.store)?;
        own.nonce += 1;
        self.stores.own_chain.set(ctx.store, OWN_CHAIN_KEY, &own)?;

        let ccm_id = ccm.id()?;
        debug!(
            ccm_id = %hex::encode(ccm_id),
            receiving_chain_id = %ccm.receiving_chain_id,
            partner = %partner,
            nonce = ccm.nonce,
            "[ic-interop] CCM added to outbox"
        );
        events::ccm_send_success(ctx.events, ccm, &ccm_id)
    }
}
