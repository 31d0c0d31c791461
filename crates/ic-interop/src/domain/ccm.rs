//! Cross-chain message envelope.

use serde::{Deserialize, Serialize};

use super::constants::MAX_MODULE_NAME_LENGTH;
use super::errors::{Hash, InteropError};
use super::value_objects::{CcmStatusCode, ChainId};
use crate::algorithms::merkle_tree::sha256;

/// Cross-chain message. Field order is part of the wire format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainMessage {
    /// Target module
    pub module: String,
    /// Target cross-chain command
    pub cross_chain_command: String,
    /// Sender nonce
    pub nonce: u64,
    /// Fee paid by the sender
    pub fee: u64,
    /// Origin chain
    pub sending_chain_id: ChainId,
    /// Destination chain
    pub receiving_chain_id: ChainId,
    /// Command params
    pub params: Vec<u8>,
    /// `CcmStatusCode` wire value
    pub status: u32,
}

impl CrossChainMessage {
    /// Canonical encoding.
    pub fn encode(&self) -> Result<Vec<u8>, InteropError> {
        Ok(ic_store::encode(self)?)
    }

    /// Decode at most `max_size` bytes.
    pub fn decode(bytes: &[u8], max_size: usize) -> Result<Self, InteropError> {
        if bytes.len() > max_size {
            return Err(InteropError::CcmTooLarge {
                size: bytes.len(),
                max: max_size,
            });
        }
        ic_store::decode_with_limit(bytes, max_size as u64)
            .map_err(|e| InteropError::InvalidCcmFormat(e.to_string()))
    }

    /// Message ID: hash of the canonical encoding.
    pub fn id(&self) -> Result<Hash, InteropError> {
        Ok(sha256(&self.encode()?))
    }

    /// Status as an enum.
    pub fn status_code(&self) -> Result<CcmStatusCode, InteropError> {
        CcmStatusCode::try_from(self.status)
    }

    /// Check names, status and encoded size.
    pub fn validate_format(&self, max_size: usize) -> Result<(), InteropError> {
        validate_name("module", &self.module)?;
        validate_name("cross-chain command", &self.cross_chain_command)?;
        self.status_code()?;
        let size = self.encode()?.len();
        if size > max_size {
            return Err(InteropError::CcmTooLarge {
                size,
                max: max_size,
            });
        }
        Ok(())
    }

    /// Reversed copy returned to the sender: chain IDs swapped, fee zero.
    pub fn bounced(&self, status: CcmStatusCode) -> Self {
        Self {
            module: self.module.clone(),
            cross_chain_command: self.cross_chain_command.clone(),
            nonce: self.nonce,
            fee: 0,
            sending_chain_id: self.receiving_chain_id,
            receiving_chain_id: self.sending_chain_id,
            params: self.params.clone(),
            status: status.code(),
        }
    }
}

fn validate_name(field: &str, name: &str) -> Result<(), InteropError> {
    if name.is_empty() || name.len() > MAX_MODULE_NAME_LENGTH {
        return Err(InteropError::InvalidCcmFormat(format!(
            "{field} name length {} outside 1..={MAX_MODULE_NAME_LENGTH}",
            name.len()
        )));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(InteropError::InvalidCcmFormat(format!(
            "{field} name {name:?} is not alphanumeric"
        )));
    }
    Ok(())
}
