//! Shared fixtures: chains with real BLS validators, a token module and a
//! relayer that builds certified cross-chain updates from chain state.

pub mod keys;
pub mod token;

use std::sync::Arc;

use ic_interop::algorithms::{sha256, SparseMerkleTree};
use ic_interop::domain::{
    CcmProcessedData, CcmProcessedResult, CcmSendSuccessData, Certificate, ChainStatus,
    CrossChainUpdateParams, InboxUpdate, MainchainRegistrationParams, OutboxRootWitness,
    RegistrationSignatureMessage, SidechainRegistrationParams, COMMAND_REGISTER_MAINCHAIN,
    COMMAND_REGISTER_SIDECHAIN, COMMAND_SUBMIT_MAINCHAIN_CCU, COMMAND_SUBMIT_SIDECHAIN_CCU,
    EVENT_CCM_PROCESSED, EVENT_CCM_SEND_SUCCESS, MODULE_NAME_INTEROPERABILITY,
};
use ic_interop::ports::StaticBftValidators;
use ic_interop::stores::outbox_root_proof_key;
use ic_interop::{
    BlockContext, BlstVerifier, ChainId, ChainRole, InteropConfig, InteropError, InteropModule,
    MethodContext, OutboundMessage,
};
use ic_store::{Event, EventLog, StateStore, VersionedStore};
use serde::Serialize;

pub use keys::ValidatorKeys;
pub use token::{TokenModule, TransferParams, TOKEN_MODULE, TRANSFER_COMMAND};

/// Mainchain of the test network.
pub const MAINCHAIN: ChainId = ChainId::new([4, 0, 0, 0]);
/// First sidechain.
pub const SIDECHAIN_A: ChainId = ChainId::new([4, 0, 0, 1]);
/// Second sidechain.
pub const SIDECHAIN_B: ChainId = ChainId::new([4, 0, 0, 2]);

/// Seconds between blocks.
pub const BLOCK_TIME: u64 = 10;
/// Fee covering the return trip of any test message.
pub const TRANSFER_FEE: u64 = 10_000;

/// One chain: its interoperability module, state and block clock.
pub struct Chain {
    /// Own chain ID
    pub id: ChainId,
    /// Interoperability module
    pub module: InteropModule,
    /// Own BFT validators
    pub validators: ValidatorKeys,
    /// State
    pub store: VersionedStore,
    /// Every event logged so far
    pub events: Vec<Event>,
    /// Current block
    pub block: BlockContext,
    outbox_log: Vec<(ChainId, Vec<u8>)>,
    certified_state: Option<SparseMerkleTree>,
}

impl Chain {
    /// Chain with four fresh validators and the token module. The
    /// mainchain starts with its genesis state.
    pub fn new(id: ChainId) -> Self {
        init_logging();
        let validators = ValidatorKeys::generate(4);
        let module = InteropModule::new(
            InteropConfig::for_testing().with_chain_id(id),
            vec![Arc::new(TokenModule)],
            Arc::new(BlstVerifier::new()),
            Arc::new(StaticBftValidators(validators.chain_validators())),
        )
        .expect("valid test configuration");
        let mut chain = Self {
            id,
            module,
            validators,
            store: VersionedStore::new(),
            events: Vec::new(),
            block: BlockContext {
                height: 1,
                timestamp: 1_000,
            },
            outbox_log: Vec::new(),
            certified_state: None,
        };
        if chain.module.methods().role() == ChainRole::Mainchain {
            chain
                .with_ctx(|module, ctx| module.init_genesis(ctx))
                .expect("genesis");
        }
        chain
    }

    /// Run `f` in a method context over this chain's state, then record
    /// the events it logged.
    pub fn with_ctx<R>(
        &mut self,
        f: impl FnOnce(&InteropModule, &mut MethodContext<'_>) -> Result<R, InteropError>,
    ) -> Result<R, InteropError> {
        let mut log = EventLog::new();
        let result = {
            let mut ctx = MethodContext::new(&mut self.store, &mut log, self.block);
            f(&self.module, &mut ctx)
        };
        self.store.commit();
        self.record(log.drain());
        result
    }

    /// Verify and execute an interoperability command.
    pub fn execute<P: Serialize>(&mut self, command: &str, params: &P) -> Result<(), InteropError> {
        let bytes = ic_store::encode(params)?;
        self.with_ctx(|module, ctx| module.execute_command(ctx, command, &bytes))
    }

    /// Move to the next block, `secs` later.
    pub fn advance(&mut self, secs: u64) {
        self.block.height += 1;
        self.block.timestamp += secs;
    }

    /// Mint `amount` to `account`.
    pub fn mint(&mut self, account: &[u8], amount: u64) {
        token::credit(&mut self.store, account, amount).expect("mint");
        self.store.commit();
    }

    /// Balance of `account`.
    pub fn balance(&self, account: &[u8]) -> u64 {
        token::balance(&self.store, account)
    }

    /// Debit `sender` and send a token transfer to `receiving`.
    pub fn transfer(
        &mut self,
        receiving: ChainId,
        sender: &[u8],
        recipient: &[u8],
        amount: u64,
    ) -> Result<(), InteropError> {
        let params = ic_store::encode(&TransferParams {
            sender: sender.to_vec(),
            recipient: recipient.to_vec(),
            amount,
        })?;
        let sender = sender.to_vec();
        self.with_ctx(|module, ctx| {
            let checkpoint = ctx.checkpoint();
            token::debit(ctx.store, &sender, amount)
                .map_err(|e| InteropError::InvalidParams(e.to_string()))?;
            let sent = module.methods().send(
                ctx,
                OutboundMessage {
                    module: TOKEN_MODULE.to_string(),
                    cross_chain_command: TRANSFER_COMMAND.to_string(),
                    receiving_chain_id: receiving,
                    fee: TRANSFER_FEE,
                    params,
                },
            );
            if let Err(e) = sent {
                ctx.restore(checkpoint)?;
                return Err(e);
            }
            Ok(())
        })
    }

    /// Status of `chain_id` as seen by this chain.
    pub fn status_of(&self, chain_id: ChainId) -> Option<ChainStatus> {
        self.module
            .methods()
            .chain_account(&self.store, chain_id)
            .ok()
            .map(|account| account.status)
    }

    /// Sparse Merkle tree over every store entry: key `SHA-256(store key)`,
    /// value `SHA-256(store value)`.
    pub fn state_tree(&self) -> SparseMerkleTree {
        let mut tree = SparseMerkleTree::new();
        for (key, value) in self.store.iterate_prefix(&[]) {
            tree.insert(sha256(&key), sha256(&value));
        }
        tree
    }

    /// State tree of the last certificate this chain issued.
    pub fn certified_state(&self) -> Option<&SparseMerkleTree> {
        self.certified_state.as_ref()
    }

    /// Encoded CCMs appended to the outbox of the channel with `partner`,
    /// in order.
    pub fn outbox(&self, partner: ChainId) -> Vec<Vec<u8>> {
        self.outbox_log
            .iter()
            .filter(|(to, _)| *to == partner)
            .map(|(_, ccm)| ccm.clone())
            .collect()
    }

    /// Events named `name` of the interoperability module.
    pub fn interop_events(&self, name: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|event| event.is(MODULE_NAME_INTEROPERABILITY, name))
            .collect()
    }

    /// Payloads of every `ccmProcessed` event.
    pub fn processed(&self) -> Vec<CcmProcessedData> {
        self.interop_events(EVENT_CCM_PROCESSED)
            .into_iter()
            .map(|event| event.decode_data().expect("ccmProcessed payload"))
            .collect()
    }

    /// Sign a certificate of the current block, remembering its state tree.
    pub fn certify(&mut self) -> Certificate {
        let tree = self.state_tree();
        let mut certificate = Certificate {
            block_id: sha256(&self.block.height.to_be_bytes()),
            height: self.block.height,
            timestamp: self.block.timestamp,
            state_root: tree.root(),
            validators_hash: self.validators.validators_hash(),
            aggregation_bits: self.validators.all_signers(),
            signature: Vec::new(),
        };
        let message = certificate.signing_bytes().expect("certificate encodes");
        certificate.signature = self.validators.sign(
            &certificate.aggregation_bits,
            &self.module.methods().config().certificate_tag,
            self.id,
            &message,
        );
        self.certified_state = Some(tree);
        certificate
    }

    fn record(&mut self, events: Vec<Event>) {
        for event in &events {
            if event.is(MODULE_NAME_INTEROPERABILITY, EVENT_CCM_SEND_SUCCESS) {
                let data: CcmSendSuccessData = event.decode_data().expect("ccmSendSuccess payload");
                if let Ok(partner) = self
                    .module
                    .methods()
                    .get_channel_partner(&self.store, data.ccm.receiving_chain_id)
                {
                    self.push_outbox(partner, &data.ccm);
                }
            } else if event.is(MODULE_NAME_INTEROPERABILITY, EVENT_CCM_PROCESSED) {
                let data: CcmProcessedData = event.decode_data().expect("ccmProcessed payload");
                if let (CcmProcessedResult::Forwarded, Some(ccm)) = (data.result, data.ccm) {
                    self.push_outbox(ccm.receiving_chain_id, &ccm);
                }
            }
        }
        self.events.extend(events);
    }

    fn push_outbox(&mut self, partner: ChainId, ccm: &ic_interop::CrossChainMessage) {
        let bytes = ccm.encode().expect("ccm encodes");
        self.outbox_log.push((partner, bytes));
    }
}

/// Build the cross-chain update `to` would receive from `from`: a fresh
/// certificate of `from` and every message `to` has not yet received.
pub fn build_update(from: &mut Chain, to: &Chain) -> CrossChainUpdateParams {
    let delivered = to
        .module
        .methods()
        .channel(&to.store, from.id)
        .map(|channel| channel.inbox.size)
        .unwrap_or(0);
    let messages: Vec<Vec<u8>> = from
        .outbox(to.id)
        .into_iter()
        .skip(delivered as usize)
        .collect();

    let certificate = from.certify();
    let outbox_root_witness = if messages.is_empty() {
        OutboxRootWitness::default()
    } else {
        let tree = from.certified_state().expect("just certified");
        let proof = tree
            .prove(&[outbox_root_proof_key(to.id)])
            .expect("outbox root is part of the state");
        OutboxRootWitness {
            bitmap: proof.queries[0].bitmap.clone(),
            sibling_hashes: proof.sibling_hashes,
        }
    };

    CrossChainUpdateParams {
        sending_chain_id: from.id,
        certificate: certificate.encode().expect("certificate encodes"),
        active_validators_update: Default::default(),
        certificate_threshold: from.validators.threshold,
        inbox_update: InboxUpdate {
            cross_chain_messages: messages,
            message_witness_hashes: Vec::new(),
            outbox_root_witness,
        },
    }
}

/// Name of the CCU command on `to`.
pub fn ccu_command(to: &Chain) -> &'static str {
    match to.module.methods().role() {
        ChainRole::Mainchain => COMMAND_SUBMIT_SIDECHAIN_CCU,
        ChainRole::Sidechain => COMMAND_SUBMIT_MAINCHAIN_CCU,
    }
}

/// Certify `from`, then submit the update on `to` one block later.
pub fn relay(from: &mut Chain, to: &mut Chain) -> Result<(), InteropError> {
    from.advance(BLOCK_TIME);
    let update = build_update(from, to);
    let timestamp = to.block.timestamp.max(from.block.timestamp + 1);
    to.advance(timestamp - to.block.timestamp);
    to.execute(ccu_command(to), &update)
}

/// Register `sidechain` on `mainchain` under `name`, then the mainchain on
/// `sidechain`. Both channels stay in the `Registered` state until the
/// first certificate arrives.
pub fn register_pair(
    mainchain: &mut Chain,
    sidechain: &mut Chain,
    name: &str,
) -> Result<(), InteropError> {
    mainchain.execute(
        COMMAND_REGISTER_SIDECHAIN,
        &SidechainRegistrationParams {
            chain_id: sidechain.id,
            name: name.to_string(),
            sidechain_validators: sidechain.validators.active().to_vec(),
            sidechain_certificate_threshold: sidechain.validators.threshold,
        },
    )?;
    let params = mainchain_registration(mainchain, sidechain, name);
    sidechain.execute(COMMAND_REGISTER_MAINCHAIN, &params)
}

/// `registerMainchain` params signed by the sidechain's validators.
pub fn mainchain_registration(
    mainchain: &Chain,
    sidechain: &Chain,
    name: &str,
) -> MainchainRegistrationParams {
    let message = RegistrationSignatureMessage {
        own_chain_id: sidechain.id,
        own_name: name.to_string(),
        mainchain_validators: mainchain.validators.active().to_vec(),
        mainchain_certificate_threshold: mainchain.validators.threshold,
    };
    let bits = sidechain.validators.all_signers();
    let signature = sidechain.validators.sign(
        &bits,
        &sidechain.module.methods().config().registration_tag,
        sidechain.id,
        &ic_store::encode(&message).expect("message encodes"),
    );
    MainchainRegistrationParams {
        own_chain_id: message.own_chain_id,
        own_name: message.own_name,
        mainchain_validators: message.mainchain_validators,
        mainchain_certificate_threshold: message.mainchain_certificate_threshold,
        signature,
        aggregation_bits: bits,
    }
}

/// Register and activate `sidechain`: both registration messages are
/// delivered with the first certificates in each direction.
pub fn connect(
    mainchain: &mut Chain,
    sidechain: &mut Chain,
    name: &str,
) -> Result<(), InteropError> {
    register_pair(mainchain, sidechain, name)?;
    relay(mainchain, sidechain)?;
    relay(sidechain, mainchain)
}

fn init_logging() {
    let config = ic_telemetry::TelemetryConfig::for_testing();
    // Several chains share one process; only the first installs a subscriber.
    let _ = ic_telemetry::init_tracing(&config);
}
