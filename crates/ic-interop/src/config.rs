//! # Interoperability Configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    ChainId, ChainRole, DEFAULT_MESSAGE_FEE_TOKEN_ID, LIVENESS_LIMIT, MAX_CCM_SIZE,
    MAX_NUM_VALIDATORS, MESSAGE_TAG_CERTIFICATE, MESSAGE_TAG_CHAIN_REG, MIN_RETURN_FEE_PER_BYTE,
    TOKEN_ID_LENGTH,
};

/// Invalid configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A limit is zero.
    #[error("{0} must be positive")]
    ZeroLimit(&'static str),

    /// A signature tag is empty.
    #[error("{0} must not be empty")]
    EmptyTag(&'static str),

    /// Encoded CCMs cannot fit the decode limit.
    #[error("max_ccm_size {0} exceeds the codec decode limit")]
    CcmSizeTooLarge(usize),
}

/// Interoperability module configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteropConfig {
    /// Own chain ID. Its network byte and suffix select the chain role.
    pub chain_id: ChainId,

    /// Seconds without a certificate before a chain stops being live.
    pub liveness_limit_secs: u64,

    /// Encoded CCM size limit.
    pub max_ccm_size: usize,

    /// Largest accepted validator set.
    pub max_num_validators: usize,

    /// Return fee per byte for channels opened by this chain.
    pub min_return_fee_per_byte: u64,

    /// Fee token for channels opened by this chain.
    pub message_fee_token_id: [u8; TOKEN_ID_LENGTH],

    /// Domain tag of certificate signatures.
    pub certificate_tag: String,

    /// Domain tag of mainchain registration signatures.
    pub registration_tag: String,
}

impl Default for InteropConfig {
    fn default() -> Self {
        Self {
            chain_id: ChainId::default(),
            liveness_limit_secs: LIVENESS_LIMIT,
            max_ccm_size: MAX_CCM_SIZE,
            max_num_validators: MAX_NUM_VALIDATORS,
            min_return_fee_per_byte: MIN_RETURN_FEE_PER_BYTE,
            message_fee_token_id: DEFAULT_MESSAGE_FEE_TOKEN_ID,
            certificate_tag: MESSAGE_TAG_CERTIFICATE.to_string(),
            registration_tag: MESSAGE_TAG_CHAIN_REG.to_string(),
        }
    }
}

impl InteropConfig {
    /// Test config: mainchain of network 0x04, return fee of 1 per byte.
    pub fn for_testing() -> Self {
        Self {
            chain_id: ChainId::new([0x04, 0, 0, 0]),
            min_return_fee_per_byte: 1,
            ..Self::default()
        }
    }

    /// Same config for another chain.
    pub fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Role of the configured chain.
    pub fn role(&self) -> ChainRole {
        ChainRole::of(self.chain_id)
    }

    /// Check limits and tags.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.liveness_limit_secs == 0 {
            return Err(ConfigError::ZeroLimit("liveness_limit_secs"));
        }
        if self.max_ccm_size == 0 {
            return Err(ConfigError::ZeroLimit("max_ccm_size"));
        }
        if self.max_ccm_size as u64 > ic_store::codec::DEFAULT_DECODE_LIMIT {
            return Err(ConfigError::CcmSizeTooLarge(self.max_ccm_size));
        }
        if self.max_num_validators == 0 {
            return Err(ConfigError::ZeroLimit("max_num_validators"));
        }
        if self.certificate_tag.is_empty() {
            return Err(ConfigError::EmptyTag("certificate_tag"));
        }
        if self.registration_tag.is_empty() {
            return Err(ConfigError::EmptyTag("registration_tag"));
        }
        Ok(())
    }
}
