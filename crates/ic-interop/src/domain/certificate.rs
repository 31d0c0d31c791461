//! BFT certificates.

use serde::{Deserialize, Serialize};

use super::constants::BLS_SIGNATURE_LENGTH;
use super::errors::{Hash, InteropError};

/// Signed commitment to a block of a partner chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Certified block
    pub block_id: Hash,
    /// Certified height
    pub height: u64,
    /// Certified block timestamp
    pub timestamp: u64,
    /// State root at the certified block
    pub state_root: Hash,
    /// Hash of the validator set expected to sign the next certificate
    pub validators_hash: Hash,
    /// Signers, bit `i` for validator `i`
    pub aggregation_bits: Vec<u8>,
    /// Aggregate BLS signature
    pub signature: Vec<u8>,
}

/// Signed portion of a certificate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedCertificate {
    /// Certified block
    pub block_id: Hash,
    /// Certified height
    pub height: u64,
    /// Certified block timestamp
    pub timestamp: u64,
    /// State root at the certified block
    pub state_root: Hash,
    /// Next validators hash
    pub validators_hash: Hash,
}

impl Certificate {
    /// Decode certificate bytes carried in a CCU.
    pub fn decode(bytes: &[u8]) -> Result<Self, InteropError> {
        ic_store::decode(bytes).map_err(|e| InteropError::InvalidCertificate(e.to_string()))
    }

    /// Canonical encoding.
    pub fn encode(&self) -> Result<Vec<u8>, InteropError> {
        Ok(ic_store::encode(self)?)
    }

    /// The part covered by the signature.
    pub fn unsigned(&self) -> UnsignedCertificate {
        UnsignedCertificate {
            block_id: self.block_id,
            height: self.height,
            timestamp: self.timestamp,
            state_root: self.state_root,
            validators_hash: self.validators_hash,
        }
    }

    /// Bytes the aggregate signature signs.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, InteropError> {
        Ok(ic_store::encode(&self.unsigned())?)
    }

    /// Check signature length and signer bitmap presence.
    pub fn validate_format(&self) -> Result<(), InteropError> {
        if self.signature.len() != BLS_SIGNATURE_LENGTH {
            return Err(InteropError::InvalidCertificate(format!(
                "signature must be {BLS_SIGNATURE_LENGTH} bytes, got {}",
                self.signature.len()
            )));
        }
        if self.aggregation_bits.is_empty() {
            return Err(InteropError::InvalidCertificate(
                "empty aggregation bits".into(),
            ));
        }
        Ok(())
    }
}
