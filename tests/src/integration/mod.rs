//! Cross-chain flows.

pub mod certificates;
pub mod messaging;
pub mod recovery;
pub mod registration;
