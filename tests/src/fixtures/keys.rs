//! BLS validator sets that actually sign.

use blst::min_pk::{AggregateSignature, SecretKey, Signature};
use ic_interop::adapters::blst_verifier::DST;
use ic_interop::algorithms::compute_validators_hash;
use ic_interop::domain::{ActiveValidator, ChainValidators, Hash};
use ic_interop::ports::AggregateSignatureCheck;
use ic_interop::ChainId;

/// Validator set with its secret keys, ascending by public key.
pub struct ValidatorKeys {
    keys: Vec<SecretKey>,
    validators: Vec<ActiveValidator>,
    /// Certificate threshold
    pub threshold: u64,
}

impl ValidatorKeys {
    /// `n` fresh validators of weight 10 with a two-thirds threshold.
    pub fn generate(n: usize) -> Self {
        let mut pairs: Vec<(SecretKey, ActiveValidator)> = (0..n)
            .map(|_| {
                let mut ikm = [0u8; 32];
                rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut ikm);
                let sk = SecretKey::key_gen(&ikm, &[]).expect("32 bytes of key material");
                let validator = ActiveValidator {
                    bls_key: sk.sk_to_pk().to_bytes().to_vec(),
                    bft_weight: 10,
                };
                (sk, validator)
            })
            .collect();
        pairs.sort_by(|a, b| a.1.bls_key.cmp(&b.1.bls_key));

        let total = 10 * n as u64;
        let (keys, validators) = pairs.into_iter().unzip();
        Self {
            keys,
            validators,
            threshold: total * 2 / 3 + 1,
        }
    }

    /// Public validator set.
    pub fn active(&self) -> &[ActiveValidator] {
        &self.validators
    }

    /// Validator set and threshold as stored by a partner chain.
    pub fn chain_validators(&self) -> ChainValidators {
        ChainValidators {
            active_validators: self.validators.clone(),
            certificate_threshold: self.threshold,
        }
    }

    /// Hash a certificate commits to for this set.
    pub fn validators_hash(&self) -> Hash {
        compute_validators_hash(&self.validators, self.threshold).expect("valid validator set")
    }

    /// Aggregation bits selecting every validator.
    pub fn all_signers(&self) -> Vec<u8> {
        let mut bits = vec![0u8; self.validators.len().div_ceil(8)];
        for index in 0..self.validators.len() {
            bits[index / 8] |= 1 << (index % 8);
        }
        bits
    }

    /// Aggregate signature of the validators selected by `bits` over
    /// `tag ‖ chain_id ‖ message`.
    pub fn sign(&self, bits: &[u8], tag: &str, chain_id: ChainId, message: &[u8]) -> Vec<u8> {
        let check = AggregateSignatureCheck {
            validators: &self.validators,
            aggregation_bits: bits,
            signature: &[],
            tag: tag.as_bytes(),
            chain_id,
            threshold: self.threshold,
            message,
        };
        let tagged = check.tagged_message();
        let signatures: Vec<Signature> = self
            .keys
            .iter()
            .enumerate()
            .filter(|(index, _)| bits.get(index / 8).is_some_and(|b| b & (1 << (index % 8)) != 0))
            .map(|(_, sk)| sk.sign(&tagged, DST, &[]))
            .collect();
        let refs: Vec<&Signature> = signatures.iter().collect();
        AggregateSignature::aggregate(&refs, true)
            .expect("at least one signer")
            .to_signature()
            .to_bytes()
            .to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ic_interop::ports::BlsVerifier;
    use ic_interop::BlstVerifier;

    #[test]
    fn test_signature_verifies_with_blst_adapter() {
        let keys = ValidatorKeys::generate(4);
        assert_eq!(keys.threshold, 27);
        let bits = keys.all_signers();
        let chain_id = ChainId::new([4, 0, 0, 1]);
        let signature = keys.sign(&bits, "IC_CE_", chain_id, b"payload");

        let check = AggregateSignatureCheck {
            validators: keys.active(),
            aggregation_bits: &bits,
            signature: &signature,
            tag: b"IC_CE_",
            chain_id,
            threshold: keys.threshold,
            message: b"payload",
        };
        assert!(BlstVerifier::new().verify_weighted_aggregate(&check));
    }
}
