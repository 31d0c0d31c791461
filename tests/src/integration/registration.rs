//! # Registration Flows
//!
//! The mainchain registers a sidechain, the sidechain registers the
//! mainchain under its validators' signature, and the first certified
//! updates in each direction deliver the registration messages and
//! activate both channels.

#[cfg(test)]
mod tests {
    use ic_interop::domain::{
        CcmProcessedResult, ChainStatus, SidechainRegistrationParams, COMMAND_REGISTER_MAINCHAIN,
        COMMAND_REGISTER_SIDECHAIN, CROSS_CHAIN_COMMAND_REGISTRATION,
        EVENT_INVALID_REGISTRATION_SIGNATURE,
    };
    use ic_interop::{EndpointError, InteropError};
    use serde_json::json;

    use crate::fixtures::*;

    #[test]
    fn test_registration_handshake_activates_both_channels() {
        let mut mainchain = Chain::new(MAINCHAIN);
        let mut sidechain = Chain::new(SIDECHAIN_A);

        register_pair(&mut mainchain, &mut sidechain, "alpha").unwrap();
        assert_eq!(mainchain.status_of(SIDECHAIN_A), Some(ChainStatus::Registered));
        assert_eq!(sidechain.status_of(MAINCHAIN), Some(ChainStatus::Registered));
        assert_eq!(mainchain.outbox(SIDECHAIN_A).len(), 1);
        assert_eq!(sidechain.outbox(MAINCHAIN).len(), 1);

        relay(&mut mainchain, &mut sidechain).unwrap();
        assert_eq!(sidechain.status_of(MAINCHAIN), Some(ChainStatus::Active));
        relay(&mut sidechain, &mut mainchain).unwrap();
        assert_eq!(mainchain.status_of(SIDECHAIN_A), Some(ChainStatus::Active));

        for chain in [&mainchain, &sidechain] {
            let processed = chain.processed();
            assert_eq!(processed.len(), 1);
            assert_eq!(processed[0].result, CcmProcessedResult::Applied);
            let ccm = processed[0].ccm.as_ref().unwrap();
            assert_eq!(ccm.cross_chain_command, CROSS_CHAIN_COMMAND_REGISTRATION);
        }

        let endpoint = mainchain.module.endpoint();
        let account = endpoint
            .handle(
                &mainchain.store,
                "getChainAccount",
                &json!({ "chainID": SIDECHAIN_A.to_hex() }),
            )
            .unwrap();
        assert_eq!(account["name"], "alpha");
        assert_eq!(account["status"], "active");
        let channel = endpoint
            .handle(
                &mainchain.store,
                "getChannel",
                &json!({ "chainID": SIDECHAIN_A.to_hex() }),
            )
            .unwrap();
        assert_eq!(channel["inbox"]["size"], 1);
        assert_eq!(channel["outbox"]["size"], 1);

        let own = sidechain
            .module
            .endpoint()
            .handle(&sidechain.store, "getOwnChainAccount", &json!({}))
            .unwrap();
        assert_eq!(own["name"], "alpha");
        assert_eq!(own["nonce"], "1");
    }

    #[test]
    fn test_name_and_id_are_taken_once() {
        let mut mainchain = Chain::new(MAINCHAIN);
        let mut alpha = Chain::new(SIDECHAIN_A);
        let beta = Chain::new(SIDECHAIN_B);
        register_pair(&mut mainchain, &mut alpha, "alpha").unwrap();

        let taken_name = SidechainRegistrationParams {
            chain_id: SIDECHAIN_B,
            name: "alpha".into(),
            sidechain_validators: beta.validators.active().to_vec(),
            sidechain_certificate_threshold: beta.validators.threshold,
        };
        assert!(matches!(
            mainchain.execute(COMMAND_REGISTER_SIDECHAIN, &taken_name),
            Err(InteropError::NameAlreadyRegistered(_))
        ));

        let taken_id = SidechainRegistrationParams {
            chain_id: SIDECHAIN_A,
            name: "beta".into(),
            ..taken_name
        };
        assert!(matches!(
            mainchain.execute(COMMAND_REGISTER_SIDECHAIN, &taken_id),
            Err(InteropError::ChainAlreadyRegistered(_))
        ));

        let availability = mainchain
            .module
            .endpoint()
            .handle(
                &mainchain.store,
                "isChainNameAvailable",
                &json!({ "name": "beta" }),
            )
            .unwrap();
        assert_eq!(availability["result"], true);

        // The sidechain cannot register the mainchain twice.
        let params = mainchain_registration(&mainchain, &alpha, "alpha");
        assert!(matches!(
            alpha.execute(COMMAND_REGISTER_MAINCHAIN, &params),
            Err(InteropError::OwnChainAlreadyRegistered)
        ));
    }

    #[test]
    fn test_foreign_registration_signature_is_rejected() {
        let mainchain = Chain::new(MAINCHAIN);
        let mut sidechain = Chain::new(SIDECHAIN_A);

        let mut params = mainchain_registration(&mainchain, &sidechain, "alpha");
        let impostors = ValidatorKeys::generate(4);
        params.signature = impostors.sign(
            &params.aggregation_bits,
            &sidechain.module.methods().config().registration_tag,
            SIDECHAIN_A,
            b"not the registration message",
        );
        assert!(matches!(
            sidechain.execute(COMMAND_REGISTER_MAINCHAIN, &params),
            Err(InteropError::InvalidRegistrationSignature)
        ));

        // Only the unrevertible failure event survives.
        let failures = sidechain.interop_events(EVENT_INVALID_REGISTRATION_SIGNATURE);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].unrevertible);
        assert_eq!(sidechain.status_of(MAINCHAIN), None);
        assert!(matches!(
            sidechain
                .module
                .endpoint()
                .handle(&sidechain.store, "getOwnChainAccount", &json!({})),
            Err(EndpointError::NotFound(_))
        ));
    }
}
