//! Adapters implementing the outbound ports.

pub mod blst_verifier;

pub use blst_verifier::BlstVerifier;
