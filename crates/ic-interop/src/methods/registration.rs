//! Chain registration records.

use tracing::info;

use super::{events, InternalMethods};
use crate::algorithms::validators::compute_validators_hash;
use crate::context::MethodContext;
use crate::domain::{
    ActiveValidator, ChainAccount, ChainId, ChainStatus, ChainValidators, ChannelData,
    InteropError, LastCertificate, OutboxRoot, OwnChainAccount, RegisteredName, EMPTY_HASH,
};
use crate::stores::OWN_CHAIN_KEY;

impl InternalMethods {
    /// Create the account, channel, validators, outbox root mirror and name
    /// entry of a newly registered partner chain.
    pub fn register_chain(
        &self,
        ctx: &mut MethodContext<'_>,
        chain_id: ChainId,
        name: &str,
        active_validators: Vec<ActiveValidator>,
        certificate_threshold: u64,
        channel: ChannelData,
    ) -> Result<ChainAccount, InteropError> {
        let account = ChainAccount {
            name: name.to_string(),
            last_certificate: LastCertificate {
                height: 0,
                timestamp: 0,
                state_root: EMPTY_HASH,
                validators_hash: compute_validators_hash(
                    &active_validators,
                    certificate_threshold,
                )?,
            },
            status: ChainStatus::Registered,
        };
        let key = chain_id.as_bytes();

        self.stores.chain_account.set(ctx.store, key, &account)?;
        self.stores.outbox_root.set(
            ctx.store,
            key,
            &OutboxRoot {
                root: channel.outbox.root,
            },
        )?;
        self.stores.channel.set(ctx.store, key, &channel)?;
        self.stores.chain_validators.set(
            ctx.store,
            key,
            &ChainValidators {
                active_validators,
                certificate_threshold,
            },
        )?;
        self.stores
            .registered_names
            .set(ctx.store, name.as_bytes(), &RegisteredName { chain_id })?;

        events::chain_account_updated(ctx.events, chain_id, &account)?;
        info!(chain_id = %chain_id, name = %name, "[ic-interop] Chain registered");
        Ok(account)
    }

    /// Store the own chain account.
    pub fn set_own_chain_account(
        &self,
        ctx: &mut MethodContext<'_>,
        name: &str,
    ) -> Result<OwnChainAccount, InteropError> {
        let own = OwnChainAccount {
            name: name.to_string(),
            chain_id: self.own_chain_id(),
            nonce: 0,
        };
        self.stores.own_chain.set(ctx.store, OWN_CHAIN_KEY, &own)?;
        Ok(own)
    }

    /// Whether a chain account or terminated state exists for `chain_id`.
    pub fn is_chain_id_registered(
        &self,
        store: &dyn ic_store::StateStore,
        chain_id: ChainId,
    ) -> bool {
        self.stores.chain_account.has(store, chain_id.as_bytes())
            || self.stores.terminated_state.has(store, chain_id.as_bytes())
    }

    /// Whether `name` is taken.
    pub fn is_name_registered(&self, store: &dyn ic_store::StateStore, name: &str) -> bool {
        self.stores.registered_names.has(store, name.as_bytes())
    }
}
