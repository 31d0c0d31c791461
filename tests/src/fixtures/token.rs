//! Minimal token module: cross-chain transfers, refunds of bounced
//! transfers and recovery of balances held on a terminated chain.

use std::sync::Arc;

use ic_interop::context::{CcmContext, RecoverContext};
use ic_interop::domain::{CcmStatusCode, HookError};
use ic_interop::ports::{CrossChainCommand, CrossChainModule};
use ic_store::{StateStore, Substore};
use serde::{Deserialize, Serialize};

/// Module name.
pub const TOKEN_MODULE: &str = "token";
/// Cross-chain command name.
pub const TRANSFER_COMMAND: &str = "transferCrossChain";
/// Substore of balances.
pub const BALANCE_SUBSTORE: [u8; 2] = [0x00, 0x00];

/// Params of [`TRANSFER_COMMAND`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferParams {
    /// Debited account on the sending chain
    pub sender: Vec<u8>,
    /// Credited account on the receiving chain
    pub recipient: Vec<u8>,
    /// Amount
    pub amount: u64,
}

/// Balances substore.
pub fn balances() -> Substore<u64> {
    Substore::new(TOKEN_MODULE, BALANCE_SUBSTORE)
}

/// Balance of `account`, zero if absent.
pub fn balance(store: &dyn StateStore, account: &[u8]) -> u64 {
    balances().get_opt(store, account).ok().flatten().unwrap_or(0)
}

/// Add `amount` to `account`.
pub fn credit(store: &mut dyn StateStore, account: &[u8], amount: u64) -> Result<(), HookError> {
    let updated = balance(store, account)
        .checked_add(amount)
        .ok_or_else(|| HookError::Rejected("balance overflow".into()))?;
    balances().set(store, account, &updated)?;
    Ok(())
}

/// Remove `amount` from `account`.
pub fn debit(store: &mut dyn StateStore, account: &[u8], amount: u64) -> Result<(), HookError> {
    let updated = balance(store, account)
        .checked_sub(amount)
        .ok_or_else(|| HookError::Rejected("insufficient balance".into()))?;
    balances().set(store, account, &updated)?;
    Ok(())
}

struct TransferCommand;

impl CrossChainCommand for TransferCommand {
    fn name(&self) -> &str {
        TRANSFER_COMMAND
    }

    fn validate_params(&self, params: &[u8]) -> Result<(), HookError> {
        let _: TransferParams = ic_store::decode(params)?;
        Ok(())
    }

    fn execute(&self, ctx: &mut CcmContext<'_>) -> Result<(), HookError> {
        let params: TransferParams = ic_store::decode(&ctx.ccm.params)?;
        if ctx.ccm.status != CcmStatusCode::Ok.code() {
            return credit(ctx.store, &params.sender, params.amount);
        }
        if params.recipient.is_empty() {
            return Err(HookError::Rejected("missing recipient".into()));
        }
        credit(ctx.store, &params.recipient, params.amount)
    }
}

/// Token module with recovery support.
#[derive(Debug, Default)]
pub struct TokenModule;

impl CrossChainModule for TokenModule {
    fn name(&self) -> &str {
        TOKEN_MODULE
    }

    fn cross_chain_commands(&self) -> Vec<Arc<dyn CrossChainCommand>> {
        vec![Arc::new(TransferCommand)]
    }

    fn supports_recovery(&self) -> bool {
        true
    }

    fn recover(&self, ctx: &mut RecoverContext<'_>) -> Result<(), HookError> {
        if ctx.substore_prefix != BALANCE_SUBSTORE {
            return Err(HookError::InvalidParams("not a balance entry".into()));
        }
        let amount: u64 = ic_store::decode(&ctx.store_value)?;
        credit(ctx.store, &ctx.store_key, amount)
    }
}
