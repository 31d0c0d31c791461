//! Event emission helpers.

use ic_store::EventLog;

use crate::domain::{
    CcmProcessedCode, CcmProcessedData, CcmProcessedResult, CcmSendSuccessData, CcmSentFailedCode,
    CcmSentFailedData, ChainAccount, ChainAccountUpdatedData, ChainId, CrossChainMessage, Hash,
    InteropError, TerminatedOutboxAccount, TerminatedOutboxCreatedData, TerminatedStateAccount,
    TerminatedStateCreatedData, EVENT_CCM_PROCESSED, EVENT_CCM_SENT_FAILED, EVENT_CCM_SEND_SUCCESS,
    EVENT_CHAIN_ACCOUNT_UPDATED, EVENT_TERMINATED_OUTBOX_CREATED, EVENT_TERMINATED_STATE_CREATED,
    MODULE_NAME_INTEROPERABILITY,
};

const MODULE: &str = MODULE_NAME_INTEROPERABILITY;

/// `[sending chain, receiving chain, ccm ID]`.
pub(crate) fn ccm_topics(ccm: &CrossChainMessage, ccm_id: &Hash) -> Vec<Vec<u8>> {
    vec![
        ccm.sending_chain_id.as_bytes().to_vec(),
        ccm.receiving_chain_id.as_bytes().to_vec(),
        ccm_id.to_vec(),
    ]
}

pub(crate) fn chain_account_updated(
    events: &mut EventLog,
    chain_id: ChainId,
    account: &ChainAccount,
) -> Result<(), InteropError> {
    events.add(
        MODULE,
        EVENT_CHAIN_ACCOUNT_UPDATED,
        &ChainAccountUpdatedData {
            account: account.clone(),
        },
        vec![chain_id.as_bytes().to_vec()],
    )?;
    Ok(())
}

pub(crate) fn ccm_processed(
    events: &mut EventLog,
    topics: Vec<Vec<u8>>,
    ccm: Option<&CrossChainMessage>,
    result: CcmProcessedResult,
    code: CcmProcessedCode,
) -> Result<(), InteropError> {
    events.add(
        MODULE,
        EVENT_CCM_PROCESSED,
        &CcmProcessedData {
            ccm: ccm.cloned(),
            result,
            code,
        },
        topics,
    )?;
    Ok(())
}

pub(crate) fn ccm_send_success(
    events: &mut EventLog,
    ccm: &CrossChainMessage,
    ccm_id: &Hash,
) -> Result<(), InteropError> {
    events.add(
        MODULE,
        EVENT_CCM_SEND_SUCCESS,
        &CcmSendSuccessData { ccm: ccm.clone() },
        ccm_topics(ccm, ccm_id),
    )?;
    Ok(())
}

pub(crate) fn ccm_sent_failed(
    events: &mut EventLog,
    ccm: &CrossChainMessage,
    code: CcmSentFailedCode,
) -> Result<(), InteropError> {
    events.add_unrevertible(
        MODULE,
        EVENT_CCM_SENT_FAILED,
        &CcmSentFailedData {
            ccm: ccm.clone(),
            code,
        },
        vec![
            ccm.sending_chain_id.as_bytes().to_vec(),
            ccm.receiving_chain_id.as_bytes().to_vec(),
        ],
    )?;
    Ok(())
}

pub(crate) fn terminated_state_created(
    events: &mut EventLog,
    chain_id: ChainId,
    account: &TerminatedStateAccount,
) -> Result<(), InteropError> {
    events.add(
        MODULE,
        EVENT_TERMINATED_STATE_CREATED,
        &TerminatedStateCreatedData {
            account: account.clone(),
        },
        vec![chain_id.as_bytes().to_vec()],
    )?;
    Ok(())
}

pub(crate) fn terminated_outbox_created(
    events: &mut EventLog,
    chain_id: ChainId,
    account: &TerminatedOutboxAccount,
) -> Result<(), InteropError> {
    events.add(
        MODULE,
        EVENT_TERMINATED_OUTBOX_CREATED,
        &TerminatedOutboxCreatedData {
            account: account.clone(),
        },
        vec![chain_id.as_bytes().to_vec()],
    )?;
    Ok(())
}

/// Payload-less failure event carrying only the chain topic.
pub(crate) fn failure(
    events: &mut EventLog,
    name: &str,
    chain_id: ChainId,
    unrevertible: bool,
) -> Result<(), InteropError> {
    let topics = vec![chain_id.as_bytes().to_vec()];
    if unrevertible {
        events.add_unrevertible(MODULE, name, &(), topics)?;
    } else {
        events.add(MODULE, name, &(), topics)?;
    }
    Ok(())
}
