//! # CCM Dispatcher
//!
//! Applies or forwards one inbound cross-chain message.
//!
//! ```text
//! apply:   verify ──► before hooks ──► execute ──► after hooks ──► APPLIED
//!            │            │     │          │            │
//!            │            │     └─ unsupported ─► after hooks ─► BOUNCE
//!            │            │                │            │
//!            ▼            ▼                ▼            ▼
//!        DISCARDED    DISCARDED     restore "exec"  DISCARDED
//!        terminate    restore base  BOUNCE          restore base
//!                     terminate                     terminate
//! ```
//!
//! A discard terminates the message's sending chain. A bounce returns the
//! message to its sender if it carried enough fee for the return trip.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::context::{CcmContext, MethodContext};
use crate::domain::{
    CcmProcessedCode, CcmProcessedResult, CcmStatusCode, ChainId, CrossChainMessage,
    InteropError, SidechainTerminatedCcmParams, CROSS_CHAIN_COMMAND_SIDECHAIN_TERMINATED,
    MODULE_NAME_INTEROPERABILITY,
};
use crate::methods::{events, InternalMethods, OutboundMessage};
use crate::ports::CrossChainCommand;
use crate::registry::ModuleRegistry;

/// Per-message state machine of the cross-chain update.
#[derive(Clone, Debug)]
pub struct CcmDispatcher {
    methods: InternalMethods,
    registry: Arc<ModuleRegistry>,
}

impl CcmDispatcher {
    /// Dispatcher over `registry`.
    pub fn new(methods: InternalMethods, registry: Arc<ModuleRegistry>) -> Self {
        Self { methods, registry }
    }

    /// Registered modules.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Execute `ccm`, addressed to the own chain.
    pub fn apply(
        &self,
        ctx: &mut MethodContext<'_>,
        ccm: CrossChainMessage,
        ccm_size: usize,
        transaction_sending_chain_id: ChainId,
    ) -> Result<CcmProcessedResult, InteropError> {
        let mut ctx = CcmContext::new(
            ctx.reborrow(),
            ccm,
            ccm_size,
            transaction_sending_chain_id,
        )?;

        if let Err(e) = self.verify_ccm(&ctx) {
            return self.discard(
                &mut ctx,
                CcmProcessedCode::InvalidCcmVerifyCcmException,
                &e,
            );
        }

        let command = self
            .registry
            .command(&ctx.ccm.module, &ctx.ccm.cross_chain_command)
            .cloned();
        if let Some(command) = &command {
            if let Err(e) = command.validate_params(&ctx.ccm.params) {
                return self.discard(
                    &mut ctx,
                    CcmProcessedCode::InvalidCcmValidateException,
                    &e,
                );
            }
            if let Err(e) = command.verify(&ctx) {
                return self.discard(
                    &mut ctx,
                    CcmProcessedCode::InvalidCcmVerifyCcmException,
                    &e,
                );
            }
        }

        let base = ctx.checkpoint();
        if let Err(e) = self.before_execute(&mut ctx) {
            ctx.restore(base)?;
            return self.discard(
                &mut ctx,
                CcmProcessedCode::InvalidCcmBeforeCccExecutionException,
                &e,
            );
        }

        let Some(command) = command else {
            if let Err(e) = self.after_execute(&mut ctx) {
                ctx.restore(base)?;
                return self.discard(
                    &mut ctx,
                    CcmProcessedCode::InvalidCcmAfterCccExecutionException,
                    &e,
                );
            }
            let (status, code) = if self.registry.module(&ctx.ccm.module).is_none() {
                (
                    CcmStatusCode::ModuleNotSupported,
                    CcmProcessedCode::ModuleNotSupported,
                )
            } else {
                (
                    CcmStatusCode::CommandNotSupported,
                    CcmProcessedCode::CommandNotSupported,
                )
            };
            return self.bounce(&mut ctx, status, code);
        };

        let exec = ctx.checkpoint();
        if let Err(e) = self.execute(command.as_ref(), &mut ctx) {
            warn!(
                ccm_id = %hex::encode(ctx.ccm_id),
                module = %ctx.ccm.module,
                command = %ctx.ccm.cross_chain_command,
                error = %e,
                "[ic-interop] Cross-chain command failed"
            );
            ctx.restore(exec)?;
            return self.bounce(
                &mut ctx,
                CcmStatusCode::FailedCcm,
                CcmProcessedCode::FailedCcm,
            );
        }

        if let Err(e) = self.after_execute(&mut ctx) {
            ctx.restore(base)?;
            return self.discard(
                &mut ctx,
                CcmProcessedCode::InvalidCcmAfterCccExecutionException,
                &e,
            );
        }

        debug!(
            ccm_id = %hex::encode(ctx.ccm_id),
            module = %ctx.ccm.module,
            command = %ctx.ccm.cross_chain_command,
            "[ic-interop] CCM applied"
        );
        self.processed(
            &mut ctx,
            CcmProcessedResult::Applied,
            CcmProcessedCode::Success,
        )
    }

    /// Relay `ccm` to its receiving chain. Mainchain only.
    pub fn forward(
        &self,
        ctx: &mut MethodContext<'_>,
        ccm: CrossChainMessage,
        ccm_size: usize,
        transaction_sending_chain_id: ChainId,
    ) -> Result<CcmProcessedResult, InteropError> {
        let mut ctx = CcmContext::new(
            ctx.reborrow(),
            ccm,
            ccm_size,
            transaction_sending_chain_id,
        )?;

        if let Err(e) = self.verify_ccm(&ctx) {
            return self.discard(
                &mut ctx,
                CcmProcessedCode::InvalidCcmVerifyCcmException,
                &e,
            );
        }

        let receiving = ctx.ccm.receiving_chain_id;
        if !self.methods.is_live(&*ctx.store, receiving, ctx.block.timestamp)? {
            let result = self.bounce(
                &mut ctx,
                CcmStatusCode::ChannelUnavailable,
                CcmProcessedCode::ChannelUnavailable,
            )?;
            self.notify_sidechain_terminated(&mut ctx, receiving)?;
            return Ok(result);
        }

        let base = ctx.checkpoint();
        for module in self.registry.modules() {
            if let Err(source) = module.before_cross_chain_message_forwarding(&mut ctx) {
                let e = InteropError::Hook {
                    module: module.name().to_string(),
                    hook: "beforeCrossChainMessageForwarding",
                    source,
                };
                ctx.restore(base)?;
                return self.discard(
                    &mut ctx,
                    CcmProcessedCode::InvalidCcmBeforeCccForwardingException,
                    &e,
                );
            }
        }

        let ccm = ctx.ccm.clone();
        self.methods.add_to_outbox(ctx.store, receiving, &ccm)?;
        debug!(
            ccm_id = %hex::encode(ctx.ccm_id),
            receiving_chain_id = %receiving,
            "[ic-interop] CCM forwarded"
        );
        self.processed(
            &mut ctx,
            CcmProcessedResult::Forwarded,
            CcmProcessedCode::Success,
        )
    }

    /// Sending chain must be live and every module's verify hook must pass.
    pub fn verify_ccm(&self, ctx: &CcmContext<'_>) -> Result<(), InteropError> {
        let sending = ctx.ccm.sending_chain_id;
        if !self.methods.is_live(&*ctx.store, sending, ctx.block.timestamp)? {
            return Err(InteropError::ChainNotLive(sending));
        }
        for module in self.registry.modules() {
            module
                .verify_cross_chain_message(ctx)
                .map_err(|source| InteropError::Hook {
                    module: module.name().to_string(),
                    hook: "verifyCrossChainMessage",
                    source,
                })?;
        }
        Ok(())
    }

    /// Return `ctx.ccm` to its sender with `status`, or drop it if it is
    /// itself a bounce or cannot pay for the return trip.
    pub fn bounce(
        &self,
        ctx: &mut CcmContext<'_>,
        status: CcmStatusCode,
        code: CcmProcessedCode,
    ) -> Result<CcmProcessedResult, InteropError> {
        let sending = ctx.ccm.sending_chain_id;
        let fee_per_byte = match self.methods.get_min_return_fee_per_byte(&*ctx.store, sending) {
            Ok(fee) => Some(fee),
            Err(InteropError::ChannelNotFound(_)) => None,
            Err(e) => return Err(e),
        };
        let min_fee = fee_per_byte.map(|fee| fee.saturating_mul(ctx.ccm_size as u64));

        let returnable = ctx.ccm.status == CcmStatusCode::Ok.code()
            && min_fee.is_some_and(|min_fee| ctx.ccm.fee >= min_fee);
        if !returnable {
            debug!(
                ccm_id = %hex::encode(ctx.ccm_id),
                fee = ctx.ccm.fee,
                min_fee = ?min_fee,
                "[ic-interop] CCM not returnable, discarded"
            );
            return self.processed(ctx, CcmProcessedResult::Discarded, code);
        }

        let bounced = ctx.ccm.bounced(status);
        let partner = self
            .methods
            .get_channel_partner(&*ctx.store, bounced.receiving_chain_id)?;
        self.methods.add_to_outbox(ctx.store, partner, &bounced)?;
        warn!(
            ccm_id = %hex::encode(ctx.ccm_id),
            status = ?status,
            "[ic-interop] CCM bounced"
        );
        self.processed(ctx, CcmProcessedResult::Bounced, code)?;
        events::ccm_send_success(ctx.events, &bounced, &bounced.id()?)?;
        Ok(CcmProcessedResult::Bounced)
    }

    fn before_execute(&self, ctx: &mut CcmContext<'_>) -> Result<(), InteropError> {
        for module in self.registry.modules() {
            module
                .before_cross_chain_command_execute(ctx)
                .map_err(|source| InteropError::Hook {
                    module: module.name().to_string(),
                    hook: "beforeCrossChainCommandExecute",
                    source,
                })?;
        }
        Ok(())
    }

    fn after_execute(&self, ctx: &mut CcmContext<'_>) -> Result<(), InteropError> {
        for module in self.registry.modules() {
            module
                .after_cross_chain_command_execute(ctx)
                .map_err(|source| InteropError::Hook {
                    module: module.name().to_string(),
                    hook: "afterCrossChainCommandExecute",
                    source,
                })?;
        }
        Ok(())
    }

    fn execute(
        &self,
        command: &dyn CrossChainCommand,
        ctx: &mut CcmContext<'_>,
    ) -> Result<(), InteropError> {
        command.execute(ctx).map_err(|source| InteropError::Hook {
            module: ctx.ccm.module.clone(),
            hook: "execute",
            source,
        })
    }

    /// Terminate the sending chain and log the message as discarded.
    fn discard(
        &self,
        ctx: &mut CcmContext<'_>,
        code: CcmProcessedCode,
        error: &dyn std::fmt::Display,
    ) -> Result<CcmProcessedResult, InteropError> {
        let sending = ctx.ccm.sending_chain_id;
        warn!(
            ccm_id = %hex::encode(ctx.ccm_id),
            sending_chain_id = %sending,
            code = ?code,
            error = %error,
            "[ic-interop] CCM discarded, terminating sending chain"
        );
        self.methods
            .terminate_chain_internal(&mut ctx.method_context(), sending)?;
        self.processed(ctx, CcmProcessedResult::Discarded, code)
    }

    fn processed(
        &self,
        ctx: &mut CcmContext<'_>,
        result: CcmProcessedResult,
        code: CcmProcessedCode,
    ) -> Result<CcmProcessedResult, InteropError> {
        let topics = events::ccm_topics(&ctx.ccm, &ctx.ccm_id);
        events::ccm_processed(ctx.events, topics, Some(&ctx.ccm), result, code)?;
        Ok(result)
    }

    /// Tell the sender of a message to a terminated chain about the
    /// terminated chain's frozen state root. A known chain that went stale
    /// without being terminated is terminated here first.
    fn notify_sidechain_terminated(
        &self,
        ctx: &mut CcmContext<'_>,
        terminated: ChainId,
    ) -> Result<(), InteropError> {
        let stores = self.methods.stores();
        let known = stores
            .terminated_state
            .get_opt(&*ctx.store, terminated.as_bytes())?;
        let account = match known {
            Some(account) => account,
            None => {
                if !stores.chain_account.has(&*ctx.store, terminated.as_bytes()) {
                    return Ok(());
                }
                self.methods
                    .terminate_chain_internal(&mut ctx.method_context(), terminated)?;
                stores
                    .terminated_state
                    .get(&*ctx.store, terminated.as_bytes())?
            }
        };
        let params = ic_store::encode(&SidechainTerminatedCcmParams {
            chain_id: terminated,
            state_root: account.state_root,
        })?;
        let sending = ctx.ccm.sending_chain_id;
        self.methods.send_internal(
            &mut ctx.method_context(),
            OutboundMessage {
                module: MODULE_NAME_INTEROPERABILITY.to_string(),
                cross_chain_command: CROSS_CHAIN_COMMAND_SIDECHAIN_TERMINATED.to_string(),
                receiving_chain_id: sending,
                fee: 0,
                params,
            },
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BlockContext;
    use crate::domain::{CcmProcessedData, ChainStatus, HookError, EVENT_CCM_PROCESSED};
    use crate::methods::testing::*;
    use crate::ports::CrossChainModule;
    use ic_store::{EventLog, StateStore, VersionedStore};

    struct Transfer;

    impl CrossChainCommand for Transfer {
        fn name(&self) -> &str {
            "transfer"
        }

        fn validate_params(&self, params: &[u8]) -> Result<(), HookError> {
            if params.is_empty() {
                return Err(HookError::InvalidParams("empty".into()));
            }
            Ok(())
        }

        fn execute(&self, ctx: &mut CcmContext<'_>) -> Result<(), HookError> {
            ctx.store.set(b"credited".to_vec(), ctx.ccm.params.clone());
            if ctx.ccm.params == b"boom" {
                return Err(HookError::Rejected("boom".into()));
            }
            Ok(())
        }
    }

    struct Token {
        fail_before: bool,
    }

    impl CrossChainModule for Token {
        fn name(&self) -> &str {
            "token"
        }

        fn cross_chain_commands(&self) -> Vec<Arc<dyn CrossChainCommand>> {
            vec![Arc::new(Transfer)]
        }

        fn before_cross_chain_command_execute(
            &self,
            ctx: &mut CcmContext<'_>,
        ) -> Result<(), HookError> {
            ctx.store.set(b"fee-escrow".to_vec(), vec![1]);
            if self.fail_before {
                return Err(HookError::Rejected("escrow".into()));
            }
            Ok(())
        }
    }

    fn dispatcher(fail_before: bool) -> (CcmDispatcher, VersionedStore) {
        let methods = methods_for(MAINCHAIN);
        let mut store = VersionedStore::new();
        register(&methods, &mut store, SIDECHAIN_A, "alpha");
        register(&methods, &mut store, SIDECHAIN_B, "beta");
        set_status(&methods, &mut store, SIDECHAIN_A, ChainStatus::Active, 100);
        set_status(&methods, &mut store, SIDECHAIN_B, ChainStatus::Active, 100);
        let registry = ModuleRegistry::builder()
            .with_module(Arc::new(Token { fail_before }))
            .build()
            .unwrap();
        (CcmDispatcher::new(methods, Arc::new(registry)), store)
    }

    fn ccm(module: &str, params: &[u8], fee: u64) -> CrossChainMessage {
        CrossChainMessage {
            module: module.into(),
            cross_chain_command: "transfer".into(),
            nonce: 0,
            fee,
            sending_chain_id: SIDECHAIN_A,
            receiving_chain_id: MAINCHAIN,
            params: params.to_vec(),
            status: CcmStatusCode::Ok.code(),
        }
    }

    fn block() -> BlockContext {
        BlockContext {
            height: 10,
            timestamp: 200,
        }
    }

    fn last_processed(events: &EventLog) -> CcmProcessedData {
        events
            .find(MODULE_NAME_INTEROPERABILITY, EVENT_CCM_PROCESSED)
            .last()
            .unwrap()
            .decode_data()
            .unwrap()
    }

    #[test]
    fn test_apply_success() {
        let (dispatcher, mut store) = dispatcher(false);
        let mut events = EventLog::new();
        let mut ctx = MethodContext::new(&mut store, &mut events, block());
        let result = dispatcher
            .apply(&mut ctx, ccm("token", b"10", 0), 100, SIDECHAIN_A)
            .unwrap();
        assert_eq!(result, CcmProcessedResult::Applied);
        assert_eq!(store.get_opt(b"credited"), Some(b"10".to_vec()));
        assert_eq!(last_processed(&events).code, CcmProcessedCode::Success);
    }

    #[test]
    fn test_bounce_discards_underfunded_message() {
        let (dispatcher, mut store) = dispatcher(false);
        let mut events = EventLog::new();
        let mut ctx = MethodContext::new(&mut store, &mut events, block());
        let result = dispatcher
            .apply(&mut ctx, ccm("nft", b"1", 500), 1_000, SIDECHAIN_A)
            .unwrap();
        assert_eq!(result, CcmProcessedResult::Discarded);

        let methods = methods_for(MAINCHAIN);
        assert_eq!(methods.channel(&store, SIDECHAIN_A).unwrap().outbox.size, 0);
        let processed = last_processed(&events);
        assert_eq!(processed.code, CcmProcessedCode::ModuleNotSupported);
        // An unsupported module is not the sender's fault.
        assert_eq!(
            methods.chain_account(&store, SIDECHAIN_A).unwrap().status,
            ChainStatus::Active
        );
    }

    #[test]
    fn test_bounce_returns_funded_message() {
        let (dispatcher, mut store) = dispatcher(false);
        let mut events = EventLog::new();
        let original = ccm("nft", b"1", 2_000);
        let mut ctx = MethodContext::new(&mut store, &mut events, block());
        let result = dispatcher
            .apply(&mut ctx, original.clone(), 1_000, SIDECHAIN_A)
            .unwrap();
        assert_eq!(result, CcmProcessedResult::Bounced);

        let methods = methods_for(MAINCHAIN);
        let channel = methods.channel(&store, SIDECHAIN_A).unwrap();
        assert_eq!(channel.outbox.size, 1);
        let bounced = original.bounced(CcmStatusCode::ModuleNotSupported);
        assert_eq!(bounced.fee, 0);
        assert_eq!(
            channel.outbox.root,
            crate::algorithms::merkle_root(&[crate::algorithms::sha256(
                &bounced.encode().unwrap()
            )])
        );
        assert_eq!(
            events
                .find(
                    MODULE_NAME_INTEROPERABILITY,
                    crate::domain::EVENT_CCM_SEND_SUCCESS,
                )
                .count(),
            1
        );
    }

    #[test]
    fn test_failed_execution_keeps_before_hooks_and_bounces() {
        let (dispatcher, mut store) = dispatcher(false);
        let mut events = EventLog::new();
        let mut ctx = MethodContext::new(&mut store, &mut events, block());
        let result = dispatcher
            .apply(&mut ctx, ccm("token", b"boom", 10_000), 100, SIDECHAIN_A)
            .unwrap();
        assert_eq!(result, CcmProcessedResult::Bounced);
        assert!(!store.has(b"credited"));
        assert!(store.has(b"fee-escrow"));
        assert_eq!(last_processed(&events).code, CcmProcessedCode::FailedCcm);
    }

    #[test]
    fn test_hook_failure_rolls_back_and_terminates() {
        let (dispatcher, mut store) = dispatcher(true);
        let mut events = EventLog::new();
        let mut ctx = MethodContext::new(&mut store, &mut events, block());
        let result = dispatcher
            .apply(&mut ctx, ccm("token", b"10", 10_000), 100, SIDECHAIN_A)
            .unwrap();
        assert_eq!(result, CcmProcessedResult::Discarded);
        assert!(!store.has(b"fee-escrow"));

        let methods = methods_for(MAINCHAIN);
        assert_eq!(
            methods.chain_account(&store, SIDECHAIN_A).unwrap().status,
            ChainStatus::Terminated
        );
        assert_eq!(
            last_processed(&events).code,
            CcmProcessedCode::InvalidCcmBeforeCccExecutionException
        );
    }

    #[test]
    fn test_invalid_params_terminates_sender() {
        let (dispatcher, mut store) = dispatcher(false);
        let mut events = EventLog::new();
        let mut ctx = MethodContext::new(&mut store, &mut events, block());
        let result = dispatcher
            .apply(&mut ctx, ccm("token", b"", 0), 100, SIDECHAIN_A)
            .unwrap();
        assert_eq!(result, CcmProcessedResult::Discarded);
        assert!(!store.has(b"fee-escrow"));
        assert_eq!(
            last_processed(&events).code,
            CcmProcessedCode::InvalidCcmValidateException
        );
    }

    #[test]
    fn test_forward_appends_to_receiver_outbox() {
        let (dispatcher, mut store) = dispatcher(false);
        let mut events = EventLog::new();
        let mut message = ccm("token", b"10", 0);
        message.receiving_chain_id = SIDECHAIN_B;
        let mut ctx = MethodContext::new(&mut store, &mut events, block());
        let result = dispatcher
            .forward(&mut ctx, message, 100, SIDECHAIN_A)
            .unwrap();
        assert_eq!(result, CcmProcessedResult::Forwarded);

        let methods = methods_for(MAINCHAIN);
        assert_eq!(methods.channel(&store, SIDECHAIN_B).unwrap().outbox.size, 1);
        assert!(!store.has(b"credited"));
    }

    #[test]
    fn test_forward_to_terminated_chain_bounces_and_notifies() {
        let (dispatcher, mut store) = dispatcher(false);
        let mut events = EventLog::new();
        let methods = methods_for(MAINCHAIN);
        {
            let mut ctx = MethodContext::new(&mut store, &mut events, block());
            methods.terminate_chain_internal(&mut ctx, SIDECHAIN_B).unwrap();
        }

        let mut message = ccm("token", b"10", 1_000);
        message.receiving_chain_id = SIDECHAIN_B;
        let mut ctx = MethodContext::new(&mut store, &mut events, block());
        let result = dispatcher
            .forward(&mut ctx, message, 100, SIDECHAIN_A)
            .unwrap();
        assert_eq!(result, CcmProcessedResult::Bounced);

        // The bounce and the sidechainTerminated notice.
        assert_eq!(methods.channel(&store, SIDECHAIN_A).unwrap().outbox.size, 2);
        assert_eq!(methods.own_chain_account(&store).unwrap().nonce, 2);
    }

    #[test]
    fn test_forward_to_stale_chain_terminates_it_before_notifying() {
        let (dispatcher, mut store) = dispatcher(false);
        let methods = methods_for(MAINCHAIN);
        let now = 101 + methods.config().liveness_limit_secs;
        set_status(&methods, &mut store, SIDECHAIN_A, ChainStatus::Active, now);
        let mut events = EventLog::new();

        let mut message = ccm("token", b"10", 1_000);
        message.receiving_chain_id = SIDECHAIN_B;
        let block = BlockContext {
            height: 10,
            timestamp: now,
        };
        let mut ctx = MethodContext::new(&mut store, &mut events, block);
        let result = dispatcher
            .forward(&mut ctx, message, 100, SIDECHAIN_A)
            .unwrap();
        assert_eq!(result, CcmProcessedResult::Bounced);

        assert_eq!(
            methods.chain_account(&store, SIDECHAIN_B).unwrap().status,
            ChainStatus::Terminated
        );
        assert!(methods
            .stores()
            .terminated_state
            .has(&store, SIDECHAIN_B.as_bytes()));
        // channelTerminated to the stale chain, then the bounce and the
        // sidechainTerminated notice to the sender.
        assert_eq!(methods.channel(&store, SIDECHAIN_B).unwrap().outbox.size, 1);
        assert_eq!(methods.channel(&store, SIDECHAIN_A).unwrap().outbox.size, 2);
        let processed: Vec<CcmProcessedData> = events
            .find(MODULE_NAME_INTEROPERABILITY, EVENT_CCM_PROCESSED)
            .map(|e| e.decode_data().unwrap())
            .collect();
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].code, CcmProcessedCode::ChannelUnavailable);
    }

    #[test]
    fn test_forward_to_unknown_chain_only_bounces() {
        let (dispatcher, mut store) = dispatcher(false);
        let mut events = EventLog::new();
        let mut message = ccm("token", b"10", 1_000);
        message.receiving_chain_id = ChainId::new([4, 0, 0, 7]);
        let mut ctx = MethodContext::new(&mut store, &mut events, block());
        let result = dispatcher
            .forward(&mut ctx, message, 100, SIDECHAIN_A)
            .unwrap();
        assert_eq!(result, CcmProcessedResult::Bounced);

        let methods = methods_for(MAINCHAIN);
        assert_eq!(methods.channel(&store, SIDECHAIN_A).unwrap().outbox.size, 1);
        assert!(!methods
            .stores()
            .terminated_state
            .has(&store, [4, 0, 0, 7].as_slice()));
    }
}
