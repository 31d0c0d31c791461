//! # Interoperability Test Suite
//!
//! End-to-end flows between a mainchain and its sidechains, each chain a
//! full `InteropModule` over its own store, connected by a relayer that
//! certifies state with real BLS signatures.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures/         # Chains, validator keys, token module, relayer
//! └── integration/      # Cross-chain flows
//!     ├── registration.rs
//!     ├── messaging.rs
//!     ├── certificates.rs
//!     └── recovery.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ic-tests
//! cargo test -p ic-tests integration::recovery::
//! ```

pub mod fixtures;
pub mod integration;
