//! Certificate, validator-set and partner outbox root checks and updates.

use std::collections::HashSet;

use ic_store::StateStore;
use tracing::{debug, warn};

use super::{events, InternalMethods};
use crate::algorithms::merkle_tree::{root_from_right_witness, sha256};
use crate::algorithms::sparse_merkle::{calculate_root, QueryProof};
use crate::algorithms::validators::{
    calculate_new_active_validators, compute_validators_hash, is_strictly_sorted, total_weight,
    update_bitmap_bit,
};
use crate::context::MethodContext;
use crate::domain::{
    invariant_certificate_threshold, ActiveValidator, Certificate, ChainId, ChainRole,
    ChainStatus, CrossChainUpdateParams, Hash, InteropError, LastCertificate, OutboxRoot,
    BLS_PUBLIC_KEY_LENGTH, EVENT_INVALID_CERTIFICATE_SIGNATURE, EVENT_INVALID_RMT_VERIFICATION,
    EVENT_INVALID_SMT_VERIFICATION,
};
use crate::ports::AggregateSignatureCheck;
use crate::stores::outbox_root_proof_key;

impl InternalMethods {
    /// Check a certificate against the stored chain account: format,
    /// strictly increasing height, timestamp before the current block, and
    /// a validator update whenever the certified validators hash changes.
    /// The mainchain also refuses a stale first certificate.
    pub fn verify_certificate(
        &self,
        store: &dyn StateStore,
        params: &CrossChainUpdateParams,
        certificate: &Certificate,
        block_timestamp: u64,
    ) -> Result<(), InteropError> {
        certificate.validate_format()?;
        let chain_id = params.sending_chain_id;
        let account = self.chain_account(store, chain_id)?;

        if certificate.height <= account.last_certificate.height {
            return Err(InteropError::StaleCertificate {
                height: certificate.height,
                last: account.last_certificate.height,
            });
        }
        if certificate.timestamp >= block_timestamp {
            return Err(InteropError::InvalidCertificate(format!(
                "timestamp {} not before block timestamp {block_timestamp}",
                certificate.timestamp
            )));
        }

        if certificate.validators_hash != account.last_certificate.validators_hash {
            let validators = self.chain_validators(store, chain_id)?;
            if params.active_validators_update.is_empty()
                && params.certificate_threshold == validators.certificate_threshold
            {
                return Err(InteropError::ValidatorsHashMismatch(
                    "certified validators hash changed without a validator update",
                ));
            }
        }

        if self.role == ChainRole::Mainchain
            && account.status == ChainStatus::Registered
            && block_timestamp.saturating_sub(certificate.timestamp)
                > self.config.liveness_limit_secs / 2
        {
            return Err(InteropError::InvalidCertificate(
                "first certificate is older than half the liveness limit".into(),
            ));
        }
        Ok(())
    }

    /// Check the validator update of a CCU and that the resulting set
    /// hashes to `certificate.validators_hash`. Returns the new set.
    pub fn verify_validators_update(
        &self,
        store: &dyn StateStore,
        params: &CrossChainUpdateParams,
        certificate: &Certificate,
    ) -> Result<Vec<ActiveValidator>, InteropError> {
        let update = &params.active_validators_update;
        let current = self.chain_validators(store, params.sending_chain_id)?;

        if !is_strictly_sorted(&update.bls_keys_update) {
            return Err(InteropError::InvalidValidators(
                "BLS key update is not strictly ascending".into(),
            ));
        }
        if update
            .bls_keys_update
            .iter()
            .any(|key| key.len() != BLS_PUBLIC_KEY_LENGTH)
        {
            return Err(InteropError::InvalidValidators(
                "BLS key update with a malformed key".into(),
            ));
        }
        let existing: HashSet<&[u8]> = current
            .active_validators
            .iter()
            .map(|validator| validator.bls_key.as_slice())
            .collect();
        if update
            .bls_keys_update
            .iter()
            .any(|key| existing.contains(key.as_slice()))
        {
            return Err(InteropError::InvalidValidators(
                "BLS key update repeats an active key".into(),
            ));
        }

        let merged = current.active_validators.len() + update.bls_keys_update.len();
        let bitmap = &update.bft_weights_update_bitmap;
        if bitmap.len() != merged.div_ceil(8) {
            return Err(InteropError::InvalidBitmap(format!(
                "weights bitmap of {} bytes for {merged} keys",
                bitmap.len()
            )));
        }
        if (merged..bitmap.len() * 8).any(|index| update_bitmap_bit(bitmap, index)) {
            return Err(InteropError::InvalidBitmap(
                "weights bitmap selects keys beyond the merged set".into(),
            ));
        }
        let selected = bitmap.iter().map(|byte| byte.count_ones() as usize).sum::<usize>();
        if selected != update.bft_weights_update.len() {
            return Err(InteropError::InvalidBitmap(format!(
                "bitmap selects {selected} keys for {} weights",
                update.bft_weights_update.len()
            )));
        }

        let new_validators = calculate_new_active_validators(
            &current.active_validators,
            &update.bls_keys_update,
            &update.bft_weights_update,
            bitmap,
        )?;
        let kept: HashSet<&[u8]> = new_validators
            .iter()
            .map(|validator| validator.bls_key.as_slice())
            .collect();
        if let Some(key) = update
            .bls_keys_update
            .iter()
            .find(|key| !kept.contains(key.as_slice()))
        {
            return Err(InteropError::InvalidValidators(format!(
                "new key {} joins with zero weight",
                hex::encode(key)
            )));
        }
        if new_validators.is_empty() || new_validators.len() > self.config.max_num_validators {
            return Err(InteropError::InvalidValidators(format!(
                "{} validators outside 1..={}",
                new_validators.len(),
                self.config.max_num_validators
            )));
        }
        let total = total_weight(&new_validators)
            .ok_or_else(|| InteropError::InvalidValidators("total weight overflows".into()))?;
        invariant_certificate_threshold(params.certificate_threshold, total)?;

        let hash = compute_validators_hash(&new_validators, params.certificate_threshold)?;
        if hash != certificate.validators_hash {
            return Err(InteropError::ValidatorsHashMismatch(
                "updated validator set does not match the certificate",
            ));
        }
        Ok(new_validators)
    }

    /// Check the certificate's aggregate signature against the sending
    /// chain's stored validators. Failure logs an unrevertible
    /// `invalidCertificateSignature` event.
    pub fn verify_certificate_signature(
        &self,
        ctx: &mut MethodContext<'_>,
        chain_id: ChainId,
        certificate: &Certificate,
    ) -> Result<(), InteropError> {
        let validators = self.chain_validators(&*ctx.store, chain_id)?;
        let message = certificate.signing_bytes()?;
        let check = AggregateSignatureCheck {
            validators: &validators.active_validators,
            aggregation_bits: &certificate.aggregation_bits,
            signature: &certificate.signature,
            tag: self.config.certificate_tag.as_bytes(),
            chain_id,
            threshold: validators.certificate_threshold,
            message: &message,
        };
        if !self.verifier.verify_weighted_aggregate(&check) {
            warn!(
                chain_id = %chain_id,
                height = certificate.height,
                "[ic-interop] Invalid certificate signature"
            );
            events::failure(
                ctx.events,
                EVENT_INVALID_CERTIFICATE_SIGNATURE,
                chain_id,
                true,
            )?;
            return Err(InteropError::InvalidCertificateSignature(chain_id));
        }
        Ok(())
    }

    /// Store the certificate as the chain's last certificate and activate
    /// the chain.
    pub fn update_certificate(
        &self,
        ctx: &mut MethodContext<'_>,
        chain_id: ChainId,
        certificate: &Certificate,
    ) -> Result<(), InteropError> {
        let mut account = self.chain_account(&*ctx.store, chain_id)?;
        account.last_certificate = LastCertificate {
            height: certificate.height,
            timestamp: certificate.timestamp,
            state_root: certificate.state_root,
            validators_hash: certificate.validators_hash,
        };
        if account.status == ChainStatus::Registered {
            account.status = ChainStatus::Active;
        }
        self.stores
            .chain_account
            .set(ctx.store, chain_id.as_bytes(), &account)?;
        events::chain_account_updated(ctx.events, chain_id, &account)?;
        debug!(
            chain_id = %chain_id,
            height = certificate.height,
            "[ic-interop] Certificate accepted"
        );
        Ok(())
    }

    /// Apply the CCU's validator update and threshold.
    pub fn update_validators(
        &self,
        store: &mut dyn StateStore,
        params: &CrossChainUpdateParams,
    ) -> Result<(), InteropError> {
        let chain_id = params.sending_chain_id;
        let mut validators = self.chain_validators(store, chain_id)?;
        let update = &params.active_validators_update;
        validators.active_validators = calculate_new_active_validators(
            &validators.active_validators,
            &update.bls_keys_update,
            &update.bft_weights_update,
            &update.bft_weights_update_bitmap,
        )?;
        validators.certificate_threshold = params.certificate_threshold;
        self.stores
            .chain_validators
            .set(store, chain_id.as_bytes(), &validators)?;
        Ok(())
    }

    /// Replay the inbox update on a copy of the inbox and check the
    /// resulting partner outbox root: against the stored partner root when
    /// no certificate comes along, otherwise by an inclusion proof against
    /// the certified state root. Failures log an event.
    pub fn verify_partner_chain_outbox_root(
        &self,
        ctx: &mut MethodContext<'_>,
        params: &CrossChainUpdateParams,
        certificate: Option<&Certificate>,
    ) -> Result<(), InteropError> {
        let chain_id = params.sending_chain_id;
        let channel = self.channel(&*ctx.store, chain_id)?;
        let inbox_update = &params.inbox_update;

        let mut inbox = channel.inbox.clone();
        for ccm_bytes in &inbox_update.cross_chain_messages {
            inbox.append(&sha256(ccm_bytes))?;
        }
        let new_root = root_from_right_witness(
            inbox.size,
            &inbox.append_path,
            &inbox_update.message_witness_hashes,
        )?;

        let Some(certificate) = certificate else {
            if new_root != channel.partner_chain_outbox_root {
                warn!(
                    chain_id = %chain_id,
                    "[ic-interop] Inbox update does not reach the partner outbox root"
                );
                events::failure(ctx.events, EVENT_INVALID_RMT_VERIFICATION, chain_id, false)?;
                return Err(InteropError::InvalidInboxUpdate(
                    "replayed inbox does not match the partner outbox root".into(),
                ));
            }
            return Ok(());
        };

        let witness = &inbox_update.outbox_root_witness;
        let query = QueryProof {
            key: outbox_root_proof_key(self.own_chain_id()),
            value: sha256(&ic_store::encode(&OutboxRoot { root: new_root })?),
            bitmap: witness.bitmap.clone(),
        };
        let proven = calculate_root(&witness.sibling_hashes, std::slice::from_ref(&query));
        if !matches!(proven, Ok(root) if root == certificate.state_root) {
            warn!(
                chain_id = %chain_id,
                "[ic-interop] Outbox root witness does not match the certified state root"
            );
            events::failure(ctx.events, EVENT_INVALID_SMT_VERIFICATION, chain_id, true)?;
            return Err(InteropError::InvalidInboxUpdate(
                "outbox root witness does not match the certified state root".into(),
            ));
        }
        Ok(())
    }

    /// Set the partner outbox root from the updated inbox and the message
    /// witness.
    pub fn update_partner_chain_outbox_root(
        &self,
        store: &mut dyn StateStore,
        chain_id: ChainId,
        message_witness_hashes: &[Hash],
    ) -> Result<(), InteropError> {
        let mut channel = self.channel(store, chain_id)?;
        channel.partner_chain_outbox_root = root_from_right_witness(
            channel.inbox.size,
            &channel.inbox.append_path,
            message_witness_hashes,
        )?;
        self.stores.channel.set(store, chain_id.as_bytes(), &channel)?;
        Ok(())
    }

    /// Validators of `chain_id`.
    pub fn chain_validators(
        &self,
        store: &dyn StateStore,
        chain_id: ChainId,
    ) -> Result<crate::domain::ChainValidators, InteropError> {
        self.stores
            .chain_validators
            .get_opt(store, chain_id.as_bytes())?
            .ok_or(InteropError::ChainNotFound(chain_id))
    }
}
