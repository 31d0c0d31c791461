//! Value objects: chain identifiers, roles and protocol codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::constants::CHAIN_ID_LENGTH;
use super::errors::InteropError;

/// 4-byte chain identifier. The first byte is the network byte; the
/// mainchain of a network has ID `network ‖ 0x000000`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub [u8; CHAIN_ID_LENGTH]);

impl ChainId {
    /// Wrap raw bytes.
    pub const fn new(bytes: [u8; CHAIN_ID_LENGTH]) -> Self {
        ChainId(bytes)
    }

    /// Parse from a byte slice of exactly four bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, InteropError> {
        let array: [u8; CHAIN_ID_LENGTH] = bytes
            .try_into()
            .map_err(|_| InteropError::InvalidChainIdLength(bytes.len()))?;
        Ok(ChainId(array))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Network byte.
    pub fn network(&self) -> u8 {
        self.0[0]
    }

    /// Mainchain ID of this chain's network.
    pub fn mainchain_id(&self) -> ChainId {
        ChainId([self.0[0], 0, 0, 0])
    }

    /// Whether this is the mainchain ID of its network.
    pub fn is_mainchain(&self) -> bool {
        *self == self.mainchain_id()
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", self.to_hex())
    }
}

impl From<[u8; CHAIN_ID_LENGTH]> for ChainId {
    fn from(bytes: [u8; CHAIN_ID_LENGTH]) -> Self {
        ChainId(bytes)
    }
}

impl FromStr for ChainId {
    type Err = InteropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(InteropError::params)?;
        ChainId::from_slice(&bytes)
    }
}

/// Lifecycle of a partner chain account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainStatus {
    /// Registered, no certificate accepted yet
    #[default]
    Registered,
    /// At least one certificate accepted
    Active,
    /// Terminated; never leaves this state
    Terminated,
}

impl ChainStatus {
    /// Lowercase name for projections.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainStatus::Registered => "registered",
            ChainStatus::Active => "active",
            ChainStatus::Terminated => "terminated",
        }
    }
}

/// Role of the own chain, derived from its chain ID. Selects the liveness
/// and routing rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainRole {
    /// Hub chain
    Mainchain,
    /// Chain attached to the hub
    Sidechain,
}

impl ChainRole {
    /// Role of the chain with ID `chain_id`.
    pub fn of(chain_id: ChainId) -> Self {
        if chain_id.is_mainchain() {
            ChainRole::Mainchain
        } else {
            ChainRole::Sidechain
        }
    }
}

/// Status carried inside a CCM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum CcmStatusCode {
    /// Regular message
    Ok = 0,
    /// Bounced: receiving chain has no such module
    ModuleNotSupported = 1,
    /// Bounced: module has no such cross-chain command
    CommandNotSupported = 2,
    /// Bounced: receiving chain not reachable
    ChannelUnavailable = 3,
    /// Bounced: message recovered from a terminated chain
    Recovered = 4,
    /// Bounced: command execution failed
    FailedCcm = 5,
}

impl CcmStatusCode {
    /// Wire value.
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for CcmStatusCode {
    type Error = InteropError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => CcmStatusCode::Ok,
            1 => CcmStatusCode::ModuleNotSupported,
            2 => CcmStatusCode::CommandNotSupported,
            3 => CcmStatusCode::ChannelUnavailable,
            4 => CcmStatusCode::Recovered,
            5 => CcmStatusCode::FailedCcm,
            other => {
                return Err(InteropError::InvalidCcmFormat(format!(
                    "unknown status code {other}"
                )))
            }
        })
    }
}

/// Outcome of processing an inbound CCM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CcmProcessedResult {
    /// Command executed
    Applied,
    /// Relayed to another chain (mainchain only)
    Forwarded,
    /// Returned to the sending chain
    Bounced,
    /// Dropped
    Discarded,
}

/// Reason attached to a processed CCM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CcmProcessedCode {
    /// Processed normally
    Success,
    /// Receiving chain not live
    ChannelUnavailable,
    /// Module not registered
    ModuleNotSupported,
    /// Cross-chain command not registered
    CommandNotSupported,
    /// Params validation failed
    InvalidCcmValidateException,
    /// Liveness, module verify hook or command verify failed
    InvalidCcmVerifyCcmException,
    /// A before-execution hook failed
    InvalidCcmBeforeCccExecutionException,
    /// An after-execution hook failed
    InvalidCcmAfterCccExecutionException,
    /// A before-forwarding hook failed
    InvalidCcmBeforeCccForwardingException,
    /// Message bytes could not be decoded or failed format validation
    InvalidCcmDecodingException,
    /// Message violated the routing rules
    InvalidCcmRoutingException,
    /// Command execution failed
    FailedCcm,
}

/// Reason an outbound send was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CcmSentFailedCode {
    /// Partner chain missing, registered-only or not live
    ChannelUnavailable,
    /// Message failed format validation
    InvalidFormat,
    /// Receiving chain is the own chain
    InvalidReceivingChain,
}
