//! # Interoperability Errors
//!
//! Every failure condition of the protocol core, classified by
//! [`ErrorKind`]:
//!
//! - **StaticValidation**: malformed params, rejected before any mutation.
//! - **ProtocolViolation**: certificate, validator, witness or routing checks.
//! - **HookExecution**: a registered module hook or cross-chain command failed.
//! - **RecoveryProof**: a state proof did not verify; the whole command aborts.
//! - **Internal**: store or codec failures.

use ic_store::{CodecError, StoreError};
use thiserror::Error;

use super::value_objects::ChainId;

/// 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// Error taxonomy used by command orchestration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed schema or size
    StaticValidation,
    /// Certificate, validator, witness or routing check failed
    ProtocolViolation,
    /// Module hook failure
    HookExecution,
    /// State proof failure
    RecoveryProof,
    /// Storage or encoding failure
    Internal,
}

/// Failure raised by a module hook or a cross-chain command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HookError {
    /// The hook rejected the message.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Command params could not be decoded or failed validation.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// The module does not implement the requested capability.
    #[error("Unsupported: {0}")]
    Unsupported(&'static str),

    /// Storage failure inside the hook.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CodecError> for HookError {
    fn from(e: CodecError) -> Self {
        HookError::InvalidParams(e.to_string())
    }
}

/// Errors of the interoperability core.
#[derive(Debug, Error)]
pub enum InteropError {
    // ------------------------------------------------------------------
    // Static validation
    // ------------------------------------------------------------------
    /// Chain ID is not 4 bytes.
    #[error("Invalid chain ID length: expected 4, got {0}")]
    InvalidChainIdLength(usize),

    /// Chain name is empty, too long or uses a forbidden character.
    #[error("Invalid chain name: {0:?}")]
    InvalidChainName(String),

    /// Encoded CCM exceeds the size limit.
    #[error("CCM too large: {size} bytes exceeds {max}")]
    CcmTooLarge {
        /// Encoded size
        size: usize,
        /// Configured limit
        max: usize,
    },

    /// CCM field format is invalid.
    #[error("Invalid CCM format: {0}")]
    InvalidCcmFormat(String),

    /// Command params could not be decoded or are malformed.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Validator list violates ordering, size or weight rules.
    #[error("Invalid validators: {0}")]
    InvalidValidators(String),

    /// Certificate threshold outside `[floor(total/3)+1, total]`.
    #[error("Invalid certificate threshold {threshold}: expected [{min}, {max}]")]
    InvalidCertificateThreshold {
        /// Proposed threshold
        threshold: u64,
        /// Lower bound
        min: u64,
        /// Upper bound
        max: u64,
    },

    /// Bitmap is malformed.
    #[error("Invalid bitmap: {0}")]
    InvalidBitmap(String),

    /// Store entries of a recovery batch repeat a key.
    #[error("Recovered store keys are not pairwise distinct")]
    DuplicateStoreEntry,

    // ------------------------------------------------------------------
    // Protocol violations
    // ------------------------------------------------------------------
    /// No chain account for the chain.
    #[error("Chain account not found: {0}")]
    ChainNotFound(ChainId),

    /// A chain account already exists for the chain.
    #[error("Chain already registered: {0}")]
    ChainAlreadyRegistered(ChainId),

    /// Chain name already taken.
    #[error("Chain name already registered: {0:?}")]
    NameAlreadyRegistered(String),

    /// Chain ID does not belong to the own network or is reserved.
    #[error("Invalid chain ID {0}: {1}")]
    InvalidChainId(ChainId, &'static str),

    /// Chain is not live.
    #[error("Chain is not live: {0}")]
    ChainNotLive(ChainId),

    /// Chain is still live.
    #[error("Chain is still live: {0}")]
    ChainStillLive(ChainId),

    /// Chain has been terminated.
    #[error("Chain is terminated: {0}")]
    ChainTerminated(ChainId),

    /// Chain has not been activated by a certificate yet.
    #[error("Chain is not active: {0}")]
    ChainNotActive(ChainId),

    /// No channel with the chain and no mainchain fallback.
    #[error("Channel not found: {0}")]
    ChannelNotFound(ChainId),

    /// The own chain account is missing (chain not yet registered).
    #[error("Own chain account not found")]
    OwnChainNotFound,

    /// The own chain account already exists.
    #[error("Own chain already registered")]
    OwnChainAlreadyRegistered,

    /// The command is only available on the other chain role.
    #[error("Command {command} is not available on this chain")]
    UnsupportedOnChain {
        /// Command name
        command: &'static str,
    },

    /// Certificate content check failed.
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    /// Certificate height does not advance.
    #[error("Certificate height {height} is not greater than last certified height {last}")]
    StaleCertificate {
        /// Certificate height
        height: u64,
        /// Stored height
        last: u64,
    },

    /// Aggregate certificate signature does not verify.
    #[error("Invalid certificate signature for chain {0}")]
    InvalidCertificateSignature(ChainId),

    /// Aggregate registration signature does not verify.
    #[error("Invalid registration signature")]
    InvalidRegistrationSignature,

    /// Certified validators hash differs from the stored one without an
    /// accompanying validator update, or the update hashes differently.
    #[error("Validators hash mismatch: {0}")]
    ValidatorsHashMismatch(&'static str),

    /// Outbox root witness or inbox replay failed.
    #[error("Invalid inbox update: {0}")]
    InvalidInboxUpdate(String),

    /// Inbound CCM violates the routing rules.
    #[error("Routing violation: {0}")]
    RoutingViolation(String),

    /// Outbound CCM rejected by `send`.
    #[error("CCM send failed: {0}")]
    SendFailed(String),

    /// No terminated-state account for the chain.
    #[error("Terminated state account not found: {0}")]
    TerminatedStateNotFound(ChainId),

    /// Terminated-state account exists but is not initialized.
    #[error("Terminated state account not initialized: {0}")]
    TerminatedStateNotInitialized(ChainId),

    /// Terminated-state account is already initialized.
    #[error("Terminated state account already initialized: {0}")]
    TerminatedStateAlreadyInitialized(ChainId),

    /// No module with this name in the registry.
    #[error("Module not registered: {0}")]
    ModuleNotRegistered(String),

    /// The module has no recover hook.
    #[error("Module {0} does not support state recovery")]
    RecoveryNotSupported(String),

    /// No transaction command with this name.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Merkle accumulator state is inconsistent.
    #[error("Inconsistent Merkle accumulator: {0}")]
    InconsistentAccumulator(String),

    // ------------------------------------------------------------------
    // Hook execution
    // ------------------------------------------------------------------
    /// A module hook failed.
    #[error("Hook {hook} of module {module} failed: {source}")]
    Hook {
        /// Module name
        module: String,
        /// Hook name
        hook: &'static str,
        /// Underlying failure
        #[source]
        source: HookError,
    },

    // ------------------------------------------------------------------
    // Recovery proofs
    // ------------------------------------------------------------------
    /// Sparse Merkle proof malformed or does not match the root.
    #[error("Invalid state proof: {0}")]
    InvalidStateProof(String),

    // ------------------------------------------------------------------
    // Internal
    // ------------------------------------------------------------------
    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Encoding failure on a value produced internally.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl From<InteropError> for HookError {
    fn from(e: InteropError) -> Self {
        match e {
            InteropError::Store(e) => HookError::Store(e),
            InteropError::InvalidParams(msg) => HookError::InvalidParams(msg),
            other => HookError::Rejected(other.to_string()),
        }
    }
}

impl InteropError {
    /// Taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        use InteropError::*;
        match self {
            InvalidChainIdLength(_)
            | InvalidChainName(_)
            | CcmTooLarge { .. }
            | InvalidCcmFormat(_)
            | InvalidParams(_)
            | InvalidValidators(_)
            | InvalidCertificateThreshold { .. }
            | InvalidBitmap(_)
            | DuplicateStoreEntry => ErrorKind::StaticValidation,
            Hook { .. } => ErrorKind::HookExecution,
            InvalidStateProof(_) => ErrorKind::RecoveryProof,
            Store(_) | Codec(_) | InconsistentAccumulator(_) => ErrorKind::Internal,
            _ => ErrorKind::ProtocolViolation,
        }
    }

    /// Wrap a decode failure of untrusted params.
    pub fn params(e: impl std::fmt::Display) -> Self {
        InteropError::InvalidParams(e.to_string())
    }
}
