//! # Termination and Recovery Flows
//!
//! A sidechain that stops certifying is terminated on the mainchain for
//! liveness. Its partners learn the frozen state root either from the
//! mainchain's `sidechainTerminated` message or by proving the chain
//! account against a mainchain certificate, then recover balances from it.

#[cfg(test)]
mod tests {
    use ic_interop::domain::{
        CcmProcessedCode, CcmProcessedResult, ChainStatus, StateRecoveryInitParams,
        StateRecoveryParams, StoreEntry, TerminateSidechainForLivenessParams,
        COMMAND_INITIALIZE_STATE_RECOVERY, COMMAND_RECOVER_STATE,
        COMMAND_TERMINATE_SIDECHAIN_FOR_LIVENESS, EVENT_INVALID_SMT_VERIFICATION,
    };
    use ic_interop::stores::{chain_account_proof_key, proof_key};
    use ic_interop::{ChainId, InteropError};
    use serde_json::json;

    use crate::fixtures::token::BALANCE_SUBSTORE;
    use crate::fixtures::*;

    /// Mainchain plus two sidechains; `carol` holds 70 on beta's last
    /// certified state.
    fn network() -> (Chain, Chain, Chain) {
        let mut mainchain = Chain::new(MAINCHAIN);
        let mut alpha = Chain::new(SIDECHAIN_A);
        let mut beta = Chain::new(SIDECHAIN_B);
        connect(&mut mainchain, &mut alpha, "alpha").unwrap();
        beta.mint(b"carol", 70);
        connect(&mut mainchain, &mut beta, "beta").unwrap();
        (mainchain, alpha, beta)
    }

    /// Let beta go silent past the liveness limit while alpha keeps
    /// certifying, then terminate beta on the mainchain.
    fn terminate_beta(mainchain: &mut Chain, alpha: &mut Chain) {
        let half = mainchain.module.methods().config().liveness_limit_secs / 2;
        for _ in 0..3 {
            mainchain.advance(half);
            alpha.advance(half);
            relay(alpha, mainchain).unwrap();
        }
        let params = TerminateSidechainForLivenessParams {
            chain_id: SIDECHAIN_B,
        };
        mainchain
            .execute(COMMAND_TERMINATE_SIDECHAIN_FOR_LIVENESS, &params)
            .unwrap();
    }

    fn recovery_params(terminated: &Chain, account: &[u8]) -> StateRecoveryParams {
        let tree = terminated.certified_state().unwrap();
        let proof = tree
            .prove(&[proof_key(TOKEN_MODULE, &BALANCE_SUBSTORE, account)])
            .unwrap();
        StateRecoveryParams {
            chain_id: terminated.id,
            module: TOKEN_MODULE.to_string(),
            store_entries: vec![StoreEntry {
                substore_prefix: BALANCE_SUBSTORE.to_vec(),
                store_key: account.to_vec(),
                store_value: ic_store::encode(&terminated.balance(account)).unwrap(),
                bitmap: proof.queries[0].bitmap.clone(),
            }],
            sibling_hashes: proof.sibling_hashes,
        }
    }

    fn initialization_params(mainchain: &Chain, chain_id: ChainId) -> StateRecoveryInitParams {
        let methods = mainchain.module.methods();
        let account = methods.chain_account(&mainchain.store, chain_id).unwrap();
        let tree = mainchain.certified_state().unwrap();
        let proof = tree.prove(&[chain_account_proof_key(chain_id)]).unwrap();
        StateRecoveryInitParams {
            chain_id,
            sidechain_account: ic_store::encode(&account).unwrap(),
            bitmap: proof.queries[0].bitmap.clone(),
            sibling_hashes: proof.sibling_hashes,
        }
    }

    #[test]
    fn test_silent_sidechain_is_terminated_once() {
        let (mut mainchain, mut alpha, _beta) = network();
        let params = TerminateSidechainForLivenessParams {
            chain_id: SIDECHAIN_B,
        };
        assert!(matches!(
            mainchain.execute(COMMAND_TERMINATE_SIDECHAIN_FOR_LIVENESS, &params),
            Err(InteropError::ChainStillLive(_))
        ));

        terminate_beta(&mut mainchain, &mut alpha);
        assert_eq!(mainchain.status_of(SIDECHAIN_B), Some(ChainStatus::Terminated));
        assert_eq!(mainchain.status_of(SIDECHAIN_A), Some(ChainStatus::Active));
        assert!(matches!(
            mainchain.execute(COMMAND_TERMINATE_SIDECHAIN_FOR_LIVENESS, &params),
            Err(InteropError::ChainTerminated(_))
        ));

        let endpoint = mainchain.module.endpoint();
        let request = json!({ "chainID": SIDECHAIN_B.to_hex() });
        let terminated = endpoint
            .handle(&mainchain.store, "getTerminatedStateAccount", &request)
            .unwrap();
        assert_eq!(terminated["initialized"], true);
        let outbox = endpoint
            .handle(&mainchain.store, "getTerminatedOutboxAccount", &request)
            .unwrap();
        // Registration plus the final channelTerminated message.
        assert_eq!(outbox["outboxSize"], 2);
        assert_eq!(mainchain.outbox(SIDECHAIN_B).len(), 2);
    }

    #[test]
    fn test_message_to_terminated_chain_bounces_and_enables_recovery() {
        let (mut mainchain, mut alpha, beta) = network();
        terminate_beta(&mut mainchain, &mut alpha);
        alpha.mint(b"alice", 100);

        // Alpha does not know yet; the mainchain returns the transfer and
        // tells alpha where beta's state froze.
        alpha.transfer(SIDECHAIN_B, b"alice", b"bob", 30).unwrap();
        relay(&mut alpha, &mut mainchain).unwrap();
        let bounced = mainchain.processed().pop().unwrap();
        assert_eq!(bounced.result, CcmProcessedResult::Bounced);
        assert_eq!(bounced.code, CcmProcessedCode::ChannelUnavailable);
        assert_eq!(mainchain.outbox(SIDECHAIN_A).len(), 3);

        relay(&mut mainchain, &mut alpha).unwrap();
        assert_eq!(alpha.balance(b"alice"), 100);
        let terminated = alpha
            .module
            .endpoint()
            .handle(
                &alpha.store,
                "getTerminatedStateAccount",
                &json!({ "chainID": SIDECHAIN_B.to_hex() }),
            )
            .unwrap();
        assert_eq!(terminated["initialized"], true);
        let frozen_root = beta.certified_state().unwrap().root();
        assert_eq!(terminated["stateRoot"], hex::encode(frozen_root));

        let params = recovery_params(&beta, b"carol");
        alpha.execute(COMMAND_RECOVER_STATE, &params).unwrap();
        assert_eq!(alpha.balance(b"carol"), 70);

        // A recovered entry cannot be claimed twice.
        assert!(matches!(
            alpha.execute(COMMAND_RECOVER_STATE, &params),
            Err(InteropError::InvalidStateProof(_))
        ));
        assert_eq!(alpha.balance(b"carol"), 70);
        let failures = alpha.interop_events(EVENT_INVALID_SMT_VERIFICATION);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].unrevertible);
    }

    #[test]
    fn test_state_recovery_initialized_from_mainchain_proof() {
        let (mut mainchain, mut alpha, beta) = network();

        // Alpha needs a mainchain certificate covering beta's account.
        relay(&mut mainchain, &mut alpha).unwrap();
        let live = initialization_params(&mainchain, SIDECHAIN_B);
        assert!(matches!(
            alpha.execute(COMMAND_INITIALIZE_STATE_RECOVERY, &live),
            Err(InteropError::ChainStillLive(_))
        ));

        terminate_beta(&mut mainchain, &mut alpha);
        relay(&mut mainchain, &mut alpha).unwrap();
        assert!(matches!(
            alpha.execute(COMMAND_RECOVER_STATE, &recovery_params(&beta, b"carol")),
            Err(InteropError::TerminatedStateNotFound(_))
        ));

        // The active account is no longer part of the certified mainchain state.
        let mut outdated = initialization_params(&mainchain, SIDECHAIN_B);
        outdated.sidechain_account = live.sidechain_account.clone();
        assert!(matches!(
            alpha.execute(COMMAND_INITIALIZE_STATE_RECOVERY, &outdated),
            Err(InteropError::InvalidStateProof(_))
        ));

        let params = initialization_params(&mainchain, SIDECHAIN_B);
        alpha
            .execute(COMMAND_INITIALIZE_STATE_RECOVERY, &params)
            .unwrap();
        assert!(matches!(
            alpha.execute(COMMAND_INITIALIZE_STATE_RECOVERY, &params),
            Err(InteropError::TerminatedStateAlreadyInitialized(_))
        ));

        alpha
            .execute(COMMAND_RECOVER_STATE, &recovery_params(&beta, b"carol"))
            .unwrap();
        assert_eq!(alpha.balance(b"carol"), 70);
    }
}
