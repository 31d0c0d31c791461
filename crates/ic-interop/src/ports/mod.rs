//! Ports (hexagonal architecture).

pub mod inbound;
pub mod outbound;

pub use inbound::{CrossChainCommand, CrossChainModule, InteropCommand};
pub use outbound::{
    AggregateSignatureCheck, BftValidatorSource, BlsVerifier, MockBlsVerifier, StaticBftValidators,
};
