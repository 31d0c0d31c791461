//! Event names and payloads emitted by the interoperability module.

use serde::{Deserialize, Serialize};

use super::ccm::CrossChainMessage;
use super::entities::{ChainAccount, TerminatedOutboxAccount, TerminatedStateAccount};
use super::value_objects::{CcmProcessedCode, CcmProcessedResult, CcmSentFailedCode};

/// A chain account was created or changed.
pub const EVENT_CHAIN_ACCOUNT_UPDATED: &str = "chainAccountUpdated";
/// An inbound CCM was processed.
pub const EVENT_CCM_PROCESSED: &str = "ccmProcessed";
/// A CCM was appended to an outbox.
pub const EVENT_CCM_SEND_SUCCESS: &str = "ccmSendSuccess";
/// An outbound send was rejected.
pub const EVENT_CCM_SENT_FAILED: &str = "ccmSentFailed";
/// A certificate signature did not verify.
pub const EVENT_INVALID_CERTIFICATE_SIGNATURE: &str = "invalidCertificateSignature";
/// A registration signature did not verify.
pub const EVENT_INVALID_REGISTRATION_SIGNATURE: &str = "invalidRegistrationSignature";
/// An inbox replay did not match the partner's outbox root.
pub const EVENT_INVALID_RMT_VERIFICATION: &str = "invalidRMTVerification";
/// A sparse Merkle proof did not verify.
pub const EVENT_INVALID_SMT_VERIFICATION: &str = "invalidSMTVerification";
/// A terminated-state account was created.
pub const EVENT_TERMINATED_STATE_CREATED: &str = "terminatedStateCreated";
/// A terminated-outbox account was created.
pub const EVENT_TERMINATED_OUTBOX_CREATED: &str = "terminatedOutboxCreated";

/// Payload of [`EVENT_CHAIN_ACCOUNT_UPDATED`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAccountUpdatedData {
    /// Account after the change
    pub account: ChainAccount,
}

/// Payload of [`EVENT_CCM_PROCESSED`]. `ccm` is `None` when the bytes could
/// not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcmProcessedData {
    /// Processed message
    pub ccm: Option<CrossChainMessage>,
    /// Outcome
    pub result: CcmProcessedResult,
    /// Reason
    pub code: CcmProcessedCode,
}

/// Payload of [`EVENT_CCM_SEND_SUCCESS`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcmSendSuccessData {
    /// Appended message
    pub ccm: CrossChainMessage,
}

/// Payload of [`EVENT_CCM_SENT_FAILED`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcmSentFailedData {
    /// Rejected message
    pub ccm: CrossChainMessage,
    /// Reason
    pub code: CcmSentFailedCode,
}

/// Payload of [`EVENT_TERMINATED_STATE_CREATED`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminatedStateCreatedData {
    /// Created account
    pub account: TerminatedStateAccount,
}

/// Payload of [`EVENT_TERMINATED_OUTBOX_CREATED`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminatedOutboxCreatedData {
    /// Created account
    pub account: TerminatedOutboxAccount,
}
