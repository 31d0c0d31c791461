//! # ic-interop
//!
//! Cross-chain interoperability between a mainchain hub and its sidechains.
//!
//! ## Role in System
//!
//! - **Registration**: the mainchain registers sidechains, a sidechain
//!   registers the mainchain under the signature of its own validators.
//! - **Cross-chain updates**: relayers submit certificates and batches of
//!   cross-chain messages (CCMs). Certificates are checked against the
//!   stored validator set, inbox batches against the partner outbox root.
//! - **Message delivery**: each CCM is applied to its receiving module,
//!   forwarded by the mainchain, bounced back to its sender, or discarded.
//! - **Termination and recovery**: chains that stop certifying are
//!   terminated; their module state is then recovered from a frozen state
//!   root through sparse Merkle proofs.
//!
//! ## Module Structure
//!
//! ```text
//! ic-interop/
//! ├── domain/           # Chain IDs, accounts, CCMs, certificates, errors
//! ├── algorithms/       # Merkle accumulator, sparse Merkle proofs, validator sets
//! ├── ports/            # CrossChainModule, InteropCommand, BlsVerifier
//! ├── adapters/         # BlstVerifier (BLS12-381)
//! ├── methods/          # Internal methods: send, terminate, certificates
//! ├── commands/         # Transaction commands
//! ├── application/      # InteropModule, InteropEndpoint
//! ├── config.rs         # InteropConfig
//! ├── context.rs        # Method, CCM and recovery contexts
//! ├── dispatcher.rs     # Per-CCM apply / forward / bounce
//! ├── registry.rs       # Cross-chain module registry
//! └── stores.rs         # Substores of the interoperability module
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod domain;
pub mod methods;
pub mod ports;
pub mod registry;
pub mod stores;

pub use adapters::BlstVerifier;
pub use application::{EndpointError, InteropEndpoint, InteropModule};
pub use config::{ConfigError, InteropConfig};
pub use context::{BlockContext, CcmContext, MethodContext, RecoverContext};
pub use dispatcher::CcmDispatcher;
pub use domain::{ChainId, ChainRole, CrossChainMessage, HookError, InteropError};
pub use methods::{InternalMethods, OutboundMessage};
pub use ports::{
    BftValidatorSource, BlsVerifier, CrossChainCommand, CrossChainModule, InteropCommand,
};
pub use registry::{ModuleRegistry, ModuleRegistryBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
