//! # Internal Methods
//!
//! Shared primitives used by the interoperability commands and exposed to
//! other modules: channel lookups, liveness, outbox appends, sends,
//! termination, certificate and validator checks.
//!
//! Liveness and routing depend on the own chain's [`ChainRole`].

mod certificate;
pub(crate) mod events;
mod outbox;
mod registration;
mod termination;

use std::sync::Arc;

use ic_store::StateStore;

pub use outbox::OutboundMessage;

use crate::config::InteropConfig;
use crate::domain::{
    ChainAccount, ChainId, ChainRole, ChainStatus, ChannelData, InteropError, OwnChainAccount,
    TOKEN_ID_LENGTH,
};
use crate::ports::BlsVerifier;
use crate::stores::{InteropStores, OWN_CHAIN_KEY};

/// Internal method library of the interoperability module.
#[derive(Clone)]
pub struct InternalMethods {
    config: Arc<InteropConfig>,
    role: ChainRole,
    stores: InteropStores,
    verifier: Arc<dyn BlsVerifier>,
}

impl std::fmt::Debug for InternalMethods {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalMethods")
            .field("chain_id", &self.config.chain_id)
            .field("role", &self.role)
            .finish()
    }
}

impl InternalMethods {
    /// Methods for the chain configured in `config`.
    pub fn new(config: Arc<InteropConfig>, verifier: Arc<dyn BlsVerifier>) -> Self {
        let role = config.role();
        Self {
            config,
            role,
            stores: InteropStores::new(),
            verifier,
        }
    }

    /// Module configuration.
    pub fn config(&self) -> &InteropConfig {
        &self.config
    }

    /// Own chain role.
    pub fn role(&self) -> ChainRole {
        self.role
    }

    /// Own chain ID.
    pub fn own_chain_id(&self) -> ChainId {
        self.config.chain_id
    }

    /// Module substores.
    pub fn stores(&self) -> &InteropStores {
        &self.stores
    }

    /// Aggregate signature verifier.
    pub fn verifier(&self) -> &dyn BlsVerifier {
        self.verifier.as_ref()
    }

    /// Own chain account.
    pub fn own_chain_account(
        &self,
        store: &dyn StateStore,
    ) -> Result<OwnChainAccount, InteropError> {
        self.stores
            .own_chain
            .get_opt(store, OWN_CHAIN_KEY)?
            .ok_or(InteropError::OwnChainNotFound)
    }

    /// Chain account of `chain_id`.
    pub fn chain_account(
        &self,
        store: &dyn StateStore,
        chain_id: ChainId,
    ) -> Result<ChainAccount, InteropError> {
        self.stores
            .chain_account
            .get_opt(store, chain_id.as_bytes())?
            .ok_or(InteropError::ChainNotFound(chain_id))
    }

    /// Channel with `chain_id`.
    pub fn channel(
        &self,
        store: &dyn StateStore,
        chain_id: ChainId,
    ) -> Result<ChannelData, InteropError> {
        self.stores
            .channel
            .get_opt(store, chain_id.as_bytes())?
            .ok_or(InteropError::ChannelNotFound(chain_id))
    }

    /// Whether `chain_id` may still send and receive messages at
    /// `timestamp`.
    ///
    /// The own chain is always live and a chain with a terminated-state
    /// account never is. Beyond that, the mainchain judges partners by
    /// status and certificate age; a sidechain only knows about chains it
    /// has seen terminated.
    pub fn is_live(
        &self,
        store: &dyn StateStore,
        chain_id: ChainId,
        timestamp: u64,
    ) -> Result<bool, InteropError> {
        if chain_id == self.own_chain_id() {
            return Ok(true);
        }
        if self.stores.terminated_state.has(store, chain_id.as_bytes()) {
            return Ok(false);
        }
        let account = self.stores.chain_account.get_opt(store, chain_id.as_bytes())?;
        Ok(match (self.role, account) {
            (_, Some(account)) if account.status == ChainStatus::Terminated => false,
            (ChainRole::Mainchain, None) => false,
            (ChainRole::Mainchain, Some(account)) => {
                account.status != ChainStatus::Active
                    || timestamp.saturating_sub(account.last_certificate.timestamp)
                        <= self.config.liveness_limit_secs
            }
            (ChainRole::Sidechain, _) => true,
        })
    }

    /// Chain whose channel carries messages for `chain_id`: the chain itself
    /// if a channel exists, otherwise the mainchain when running on a
    /// sidechain.
    pub fn get_channel_partner(
        &self,
        store: &dyn StateStore,
        chain_id: ChainId,
    ) -> Result<ChainId, InteropError> {
        if self.stores.channel.has(store, chain_id.as_bytes()) {
            return Ok(chain_id);
        }
        if self.role == ChainRole::Sidechain {
            let mainchain_id = self.own_chain_id().mainchain_id();
            if self.stores.channel.has(store, mainchain_id.as_bytes()) {
                return Ok(mainchain_id);
            }
        }
        Err(InteropError::ChannelNotFound(chain_id))
    }

    /// Return fee per byte of the channel carrying messages for `chain_id`.
    pub fn get_min_return_fee_per_byte(
        &self,
        store: &dyn StateStore,
        chain_id: ChainId,
    ) -> Result<u64, InteropError> {
        let partner = self.get_channel_partner(store, chain_id)?;
        Ok(self.channel(store, partner)?.min_return_fee_per_byte)
    }

    /// Fee token of the channel carrying messages for `chain_id`.
    pub fn get_message_fee_token_id(
        &self,
        store: &dyn StateStore,
        chain_id: ChainId,
    ) -> Result<[u8; TOKEN_ID_LENGTH], InteropError> {
        let partner = self.get_channel_partner(store, chain_id)?;
        Ok(self.channel(store, partner)?.message_fee_token_id)
    }
}
