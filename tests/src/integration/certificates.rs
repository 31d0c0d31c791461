//! # Certificate Flows
//!
//! Certificates signed by real BLS validator sets: replays, forgeries,
//! timestamps from the future and certified threshold changes.

#[cfg(test)]
mod tests {
    use ic_interop::domain::{
        ActiveValidatorsUpdate, Certificate, CrossChainUpdateParams,
        EVENT_INVALID_CERTIFICATE_SIGNATURE,
    };
    use ic_interop::{ChainId, InteropError};
    use serde_json::json;

    use crate::fixtures::*;

    fn connected() -> (Chain, Chain) {
        let mut mainchain = Chain::new(MAINCHAIN);
        let mut alpha = Chain::new(SIDECHAIN_A);
        connect(&mut mainchain, &mut alpha, "alpha").unwrap();
        (mainchain, alpha)
    }

    fn certified_height(chain: &Chain, of: ChainId) -> u64 {
        chain
            .module
            .methods()
            .chain_account(&chain.store, of)
            .unwrap()
            .last_certificate
            .height
    }

    /// Submit `update` on `to` one block after the certificate it carries.
    fn submit(to: &mut Chain, update: &CrossChainUpdateParams) -> Result<(), InteropError> {
        let certificate = Certificate::decode(&update.certificate).unwrap();
        let timestamp = to.block.timestamp.max(certificate.timestamp + 1);
        to.advance(timestamp - to.block.timestamp);
        to.execute(ccu_command(to), update)
    }

    #[test]
    fn test_replayed_certificate_is_stale() {
        let (mut mainchain, mut alpha) = connected();
        alpha.advance(BLOCK_TIME);
        let update = build_update(&mut alpha, &mainchain);
        submit(&mut mainchain, &update).unwrap();
        assert_eq!(certified_height(&mainchain, SIDECHAIN_A), alpha.block.height);

        assert!(matches!(
            submit(&mut mainchain, &update),
            Err(InteropError::StaleCertificate { .. })
        ));
    }

    #[test]
    fn test_forged_certificate_leaves_only_the_failure_event() {
        let (mut mainchain, mut alpha) = connected();
        let before = certified_height(&mainchain, SIDECHAIN_A);

        alpha.advance(BLOCK_TIME);
        let mut update = build_update(&mut alpha, &mainchain);
        let mut certificate = Certificate::decode(&update.certificate).unwrap();
        let impostors = ValidatorKeys::generate(4);
        certificate.signature = impostors.sign(
            &certificate.aggregation_bits,
            &mainchain.module.methods().config().certificate_tag,
            SIDECHAIN_A,
            &certificate.signing_bytes().unwrap(),
        );
        update.certificate = certificate.encode().unwrap();

        assert!(matches!(
            submit(&mut mainchain, &update),
            Err(InteropError::InvalidCertificateSignature(id)) if id == SIDECHAIN_A
        ));
        let failures = mainchain.interop_events(EVENT_INVALID_CERTIFICATE_SIGNATURE);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].unrevertible);
        assert_eq!(certified_height(&mainchain, SIDECHAIN_A), before);
    }

    #[test]
    fn test_certificate_from_the_future_is_rejected() {
        let (mut mainchain, mut alpha) = connected();
        alpha.advance(5 * BLOCK_TIME);
        let update = build_update(&mut alpha, &mainchain);
        assert!(alpha.block.timestamp >= mainchain.block.timestamp);

        assert!(matches!(
            mainchain.execute(ccu_command(&mainchain), &update),
            Err(InteropError::InvalidCertificate(_))
        ));
    }

    #[test]
    fn test_threshold_change_is_certified() {
        let (mut mainchain, mut alpha) = connected();

        // Same validators, every signature now required.
        alpha.validators.threshold = 40;
        alpha.advance(BLOCK_TIME);
        let mut update = build_update(&mut alpha, &mainchain);

        let mut without_update = update.clone();
        without_update.certificate_threshold = 27;
        assert!(matches!(
            submit(&mut mainchain, &without_update),
            Err(InteropError::ValidatorsHashMismatch(_))
        ));

        update.active_validators_update = ActiveValidatorsUpdate {
            bft_weights_update_bitmap: vec![0],
            ..Default::default()
        };
        submit(&mut mainchain, &update).unwrap();

        let validators = mainchain
            .module
            .endpoint()
            .handle(
                &mainchain.store,
                "getChainValidators",
                &json!({ "chainID": SIDECHAIN_A.to_hex() }),
            )
            .unwrap();
        assert_eq!(validators["certificateThreshold"], "40");
        assert_eq!(validators["activeValidators"].as_array().unwrap().len(), 4);
    }
}
