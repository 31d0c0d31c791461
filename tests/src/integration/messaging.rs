//! # Messaging Flows
//!
//! Token transfers between two sidechains routed through the mainchain,
//! bounces of failed transfers back to their sender, and sends rejected
//! before a channel is usable.

#[cfg(test)]
mod tests {
    use ic_interop::domain::{
        CcmProcessedCode, CcmProcessedResult, CcmSentFailedData, CcmSentFailedCode, CcmStatusCode,
        EVENT_CCM_SENT_FAILED, MAX_CCM_SIZE,
    };
    use ic_interop::{CrossChainMessage, InteropError};

    use crate::fixtures::*;

    fn network() -> (Chain, Chain, Chain) {
        let mut mainchain = Chain::new(MAINCHAIN);
        let mut alpha = Chain::new(SIDECHAIN_A);
        let mut beta = Chain::new(SIDECHAIN_B);
        connect(&mut mainchain, &mut alpha, "alpha").unwrap();
        connect(&mut mainchain, &mut beta, "beta").unwrap();
        (mainchain, alpha, beta)
    }

    #[test]
    fn test_transfer_between_sidechains_via_mainchain() {
        let (mut mainchain, mut alpha, mut beta) = network();
        alpha.mint(b"alice", 100);

        alpha.transfer(SIDECHAIN_B, b"alice", b"bob", 40).unwrap();
        assert_eq!(alpha.balance(b"alice"), 60);
        // Sidechains have no direct channel; the message waits for the mainchain.
        assert_eq!(alpha.outbox(MAINCHAIN).len(), 2);

        relay(&mut alpha, &mut mainchain).unwrap();
        let forwarded = mainchain.processed().pop().unwrap();
        assert_eq!(forwarded.result, CcmProcessedResult::Forwarded);
        assert_eq!(mainchain.outbox(SIDECHAIN_B).len(), 2);

        relay(&mut mainchain, &mut beta).unwrap();
        let applied = beta.processed().pop().unwrap();
        assert_eq!(applied.result, CcmProcessedResult::Applied);
        let ccm = applied.ccm.unwrap();
        assert_eq!(ccm.sending_chain_id, SIDECHAIN_A);
        assert_eq!(ccm.receiving_chain_id, SIDECHAIN_B);
        assert_eq!(beta.balance(b"bob"), 40);

        let inbox = beta.module.methods().channel(&beta.store, MAINCHAIN).unwrap().inbox;
        assert_eq!(inbox.size, 2);
    }

    #[test]
    fn test_failed_transfer_is_refunded() {
        let (mut mainchain, mut alpha, mut beta) = network();
        alpha.mint(b"alice", 100);

        // The receiving command rejects an empty recipient.
        alpha.transfer(SIDECHAIN_B, b"alice", b"", 25).unwrap();
        assert_eq!(alpha.balance(b"alice"), 75);
        relay(&mut alpha, &mut mainchain).unwrap();
        relay(&mut mainchain, &mut beta).unwrap();

        let bounced = beta.processed().pop().unwrap();
        assert_eq!(bounced.result, CcmProcessedResult::Bounced);
        assert_eq!(bounced.code, CcmProcessedCode::FailedCcm);
        let returned = beta.outbox(MAINCHAIN).pop().unwrap();
        let returned = CrossChainMessage::decode(&returned, MAX_CCM_SIZE).unwrap();
        assert_eq!(returned.status, CcmStatusCode::FailedCcm.code());
        assert_eq!(returned.receiving_chain_id, SIDECHAIN_A);
        assert_eq!(returned.fee, 0);

        relay(&mut beta, &mut mainchain).unwrap();
        assert_eq!(mainchain.processed().pop().unwrap().result, CcmProcessedResult::Forwarded);
        relay(&mut mainchain, &mut alpha).unwrap();
        assert_eq!(alpha.processed().pop().unwrap().result, CcmProcessedResult::Applied);
        assert_eq!(alpha.balance(b"alice"), 100);
        assert_eq!(beta.balance(b""), 0);
    }

    #[test]
    fn test_send_before_activation_is_rejected() {
        let mut mainchain = Chain::new(MAINCHAIN);
        let mut alpha = Chain::new(SIDECHAIN_A);
        register_pair(&mut mainchain, &mut alpha, "alpha").unwrap();
        alpha.mint(b"alice", 100);

        // The mainchain channel is only registered until its first certificate.
        assert!(matches!(
            alpha.transfer(MAINCHAIN, b"alice", b"bob", 10),
            Err(InteropError::SendFailed(_))
        ));
        assert_eq!(alpha.balance(b"alice"), 100);
        let failed = alpha.interop_events(EVENT_CCM_SENT_FAILED);
        assert_eq!(failed.len(), 1);
        assert!(failed[0].unrevertible);
        let data: CcmSentFailedData = failed[0].decode_data().unwrap();
        assert_eq!(data.code, CcmSentFailedCode::ChannelUnavailable);

        // Nor may a chain send to itself.
        assert!(matches!(
            alpha.transfer(SIDECHAIN_A, b"alice", b"bob", 10),
            Err(InteropError::SendFailed(_))
        ));
        assert_eq!(alpha.outbox(MAINCHAIN).len(), 1);
    }
}
