//! Chain termination and terminated-state bookkeeping.

use tracing::{info, warn};

use super::{events, InternalMethods, OutboundMessage};
use crate::context::MethodContext;
use crate::domain::{
    ChainId, ChainRole, ChainStatus, Hash, InteropError, TerminatedOutboxAccount,
    TerminatedStateAccount, CROSS_CHAIN_COMMAND_CHANNEL_TERMINATED, EMPTY_HASH,
    MODULE_NAME_INTEROPERABILITY,
};

impl InternalMethods {
    /// Terminate the chain `chain_id`: notify it with `channelTerminated`
    /// when a route exists, then freeze its state. A no-op if the chain is
    /// already terminated.
    pub fn terminate_chain_internal(
        &self,
        ctx: &mut MethodContext<'_>,
        chain_id: ChainId,
    ) -> Result<(), InteropError> {
        if self.stores.terminated_state.has(&*ctx.store, chain_id.as_bytes()) {
            return Ok(());
        }

        if self.get_channel_partner(&*ctx.store, chain_id).is_ok() {
            self.send_internal(
                ctx,
                OutboundMessage {
                    module: MODULE_NAME_INTEROPERABILITY.to_string(),
                    cross_chain_command: CROSS_CHAIN_COMMAND_CHANNEL_TERMINATED.to_string(),
                    receiving_chain_id: chain_id,
                    fee: 0,
                    params: Vec::new(),
                },
            )?;
        }

        self.create_terminated_state_account(ctx, chain_id, None)?;
        warn!(chain_id = %chain_id, "[ic-interop] Chain terminated");
        Ok(())
    }

    /// Create the terminated-state account of `chain_id`.
    ///
    /// For a known chain the account is frozen at `state_root`, or at its
    /// last certified state root, and its outbox is frozen too. An unknown
    /// chain needs `state_root`, except on a sidechain where the account
    /// starts uninitialized against the mainchain's last certified root.
    pub fn create_terminated_state_account(
        &self,
        ctx: &mut MethodContext<'_>,
        chain_id: ChainId,
        state_root: Option<Hash>,
    ) -> Result<TerminatedStateAccount, InteropError> {
        let known = self
            .stores
            .chain_account
            .get_opt(&*ctx.store, chain_id.as_bytes())?;

        let terminated = match (known, state_root) {
            (Some(mut account), state_root) => {
                account.status = ChainStatus::Terminated;
                self.stores
                    .chain_account
                    .set(ctx.store, chain_id.as_bytes(), &account)?;
                events::chain_account_updated(ctx.events, chain_id, &account)?;

                self.stores.outbox_root.del(ctx.store, chain_id.as_bytes());
                let channel = self
                    .stores
                    .channel
                    .get_opt(&*ctx.store, chain_id.as_bytes())?;
                if let Some(channel) = channel {
                    self.create_terminated_outbox_account(
                        ctx,
                        chain_id,
                        channel.outbox.root,
                        channel.outbox.size,
                        0,
                    )?;
                }

                TerminatedStateAccount {
                    state_root: state_root.unwrap_or(account.last_certificate.state_root),
                    mainchain_state_root: EMPTY_HASH,
                    initialized: true,
                }
            }
            (None, Some(state_root)) => TerminatedStateAccount {
                state_root,
                mainchain_state_root: EMPTY_HASH,
                initialized: true,
            },
            (None, None) if self.role == ChainRole::Sidechain => {
                let mainchain_id = self.own_chain_id().mainchain_id();
                let mainchain = self.chain_account(&*ctx.store, mainchain_id)?;
                TerminatedStateAccount {
                    state_root: EMPTY_HASH,
                    mainchain_state_root: mainchain.last_certificate.state_root,
                    initialized: false,
                }
            }
            (None, None) => return Err(InteropError::ChainNotFound(chain_id)),
        };

        self.stores
            .terminated_state
            .set(ctx.store, chain_id.as_bytes(), &terminated)?;
        events::terminated_state_created(ctx.events, chain_id, &terminated)?;
        info!(
            chain_id = %chain_id,
            initialized = terminated.initialized,
            "[ic-interop] Terminated state account created"
        );
        Ok(terminated)
    }

    /// Freeze the outbox of `chain_id`.
    pub fn create_terminated_outbox_account(
        &self,
        ctx: &mut MethodContext<'_>,
        chain_id: ChainId,
        outbox_root: Hash,
        outbox_size: u64,
        partner_chain_inbox_size: u64,
    ) -> Result<TerminatedOutboxAccount, InteropError> {
        let account = TerminatedOutboxAccount {
            outbox_root,
            outbox_size,
            partner_chain_inbox_size,
        };
        self.stores
            .terminated_outbox
            .set(ctx.store, chain_id.as_bytes(), &account)?;
        events::terminated_outbox_created(ctx.events, chain_id, &account)?;
        Ok(account)
    }
}
