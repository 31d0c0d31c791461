//! Inbound ports: the capabilities other modules plug into the core, and
//! the command interface the framework drives.

use std::sync::Arc;

use crate::context::{CcmContext, MethodContext, RecoverContext};
use crate::domain::{HookError, InteropError};

/// Handler of one cross-chain command of a module.
pub trait CrossChainCommand: Send + Sync {
    /// Command name as carried in `CrossChainMessage::cross_chain_command`.
    fn name(&self) -> &str;

    /// Decode and statically check `params`.
    fn validate_params(&self, params: &[u8]) -> Result<(), HookError>;

    /// Check the message against state before execution.
    fn verify(&self, _ctx: &CcmContext<'_>) -> Result<(), HookError> {
        Ok(())
    }

    /// Apply the message.
    fn execute(&self, ctx: &mut CcmContext<'_>) -> Result<(), HookError>;
}

/// Cross-chain capabilities of a module. Every hook is optional.
pub trait CrossChainModule: Send + Sync {
    /// Module name.
    fn name(&self) -> &str;

    /// Cross-chain commands handled by the module.
    fn cross_chain_commands(&self) -> Vec<Arc<dyn CrossChainCommand>> {
        Vec::new()
    }

    /// Runs for every inbound message before dispatch.
    fn verify_cross_chain_message(&self, _ctx: &CcmContext<'_>) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs for every dispatched message before the command executes.
    fn before_cross_chain_command_execute(
        &self,
        _ctx: &mut CcmContext<'_>,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs for every dispatched message after the command executes.
    fn after_cross_chain_command_execute(
        &self,
        _ctx: &mut CcmContext<'_>,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs for every message the mainchain forwards.
    fn before_cross_chain_message_forwarding(
        &self,
        _ctx: &mut CcmContext<'_>,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Whether [`CrossChainModule::recover`] is implemented.
    fn supports_recovery(&self) -> bool {
        false
    }

    /// Restore one store entry of a terminated chain.
    fn recover(&self, _ctx: &mut RecoverContext<'_>) -> Result<(), HookError> {
        Err(HookError::Unsupported("recover"))
    }
}

/// Transaction command of the interoperability module.
pub trait InteropCommand: Send + Sync {
    /// Command name.
    fn name(&self) -> &'static str;

    /// Check params and state without mutating anything.
    fn verify(&self, ctx: &MethodContext<'_>, params: &[u8]) -> Result<(), InteropError>;

    /// Apply the command.
    fn execute(&self, ctx: &mut MethodContext<'_>, params: &[u8]) -> Result<(), InteropError>;
}
