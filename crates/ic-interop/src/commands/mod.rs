//! # Interoperability Commands
//!
//! Transaction commands of the interoperability module.
//!
//! | Command                            | Chain     |
//! |------------------------------------|-----------|
//! | `submitSidechainCrossChainUpdate`  | mainchain |
//! | `submitMainchainCrossChainUpdate`  | sidechain |
//! | `registerSidechain`                | mainchain |
//! | `registerMainchain`                | sidechain |
//! | `terminateSidechainForLiveness`    | mainchain |
//! | `initializeStateRecovery`          | sidechain |
//! | `recoverState`                     | both      |
//!
//! Every command splits into a side-effect free `verify` and an `execute`
//! that the caller wraps in a checkpoint.

pub mod builtin;
pub mod cross_chain_update;
pub mod initialize_state_recovery;
pub mod recover_state;
pub mod register_mainchain;
pub mod register_sidechain;
pub mod terminate_sidechain_for_liveness;

pub use builtin::InteroperabilityModule;
pub use cross_chain_update::{CcuVariant, CrossChainUpdateCommand};
pub use initialize_state_recovery::InitializeStateRecoveryCommand;
pub use recover_state::RecoverStateCommand;
pub use register_mainchain::RegisterMainchainCommand;
pub use register_sidechain::RegisterSidechainCommand;
pub use terminate_sidechain_for_liveness::TerminateSidechainForLivenessCommand;

use crate::domain::{ChainRole, InteropError};
use crate::methods::InternalMethods;

/// Reject `command` unless the own chain has `role`.
pub(crate) fn require_role(
    methods: &InternalMethods,
    role: ChainRole,
    command: &'static str,
) -> Result<(), InteropError> {
    if methods.role() != role {
        return Err(InteropError::UnsupportedOnChain { command });
    }
    Ok(())
}
