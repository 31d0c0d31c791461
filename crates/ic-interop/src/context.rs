//! Execution contexts handed to methods, commands and module hooks.

use ic_store::{EventLog, SnapshotId, StateStore, StoreError};

use crate::domain::{ChainId, CrossChainMessage, Hash};

/// Block being executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockContext {
    /// Block height
    pub height: u64,
    /// Block timestamp (seconds)
    pub timestamp: u64,
}

/// Paired store and event-log snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    state: SnapshotId,
    events: SnapshotId,
}

impl Checkpoint {
    /// Snapshot both the store and the event log.
    pub fn take(store: &mut dyn StateStore, events: &mut EventLog) -> Self {
        Self {
            state: store.create_snapshot(),
            events: events.create_snapshot(),
        }
    }

    /// Revert both to this checkpoint. Unrevertible events are kept.
    pub fn restore(
        self,
        store: &mut dyn StateStore,
        events: &mut EventLog,
    ) -> Result<(), StoreError> {
        store.restore_snapshot(self.state)?;
        events.restore_snapshot(self.events)
    }
}

/// Store, event log and block for internal methods and commands.
pub struct MethodContext<'a> {
    /// State store
    pub store: &'a mut dyn StateStore,
    /// Event log
    pub events: &'a mut EventLog,
    /// Current block
    pub block: BlockContext,
}

impl<'a> MethodContext<'a> {
    /// Bundle a store, log and block.
    pub fn new(
        store: &'a mut dyn StateStore,
        events: &'a mut EventLog,
        block: BlockContext,
    ) -> Self {
        Self {
            store,
            events,
            block,
        }
    }

    /// Shorter-lived context over the same store and log.
    pub fn reborrow(&mut self) -> MethodContext<'_> {
        MethodContext {
            store: &mut *self.store,
            events: &mut *self.events,
            block: self.block,
        }
    }

    /// Snapshot store and log.
    pub fn checkpoint(&mut self) -> Checkpoint {
        Checkpoint::take(self.store, self.events)
    }

    /// Revert store and log to `checkpoint`.
    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<(), StoreError> {
        checkpoint.restore(self.store, self.events)
    }
}

/// Context of one inbound CCM, passed to module hooks and cross-chain
/// commands.
pub struct CcmContext<'a> {
    /// State store
    pub store: &'a mut dyn StateStore,
    /// Event log
    pub events: &'a mut EventLog,
    /// Current block
    pub block: BlockContext,
    /// Message being processed
    pub ccm: CrossChainMessage,
    /// Message ID
    pub ccm_id: Hash,
    /// Encoded message size
    pub ccm_size: usize,
    /// Chain that delivered the message (the CCU's sending chain)
    pub transaction_sending_chain_id: ChainId,
}

impl<'a> CcmContext<'a> {
    /// Context for `ccm` delivered by `transaction_sending_chain_id`.
    pub fn new(
        ctx: MethodContext<'a>,
        ccm: CrossChainMessage,
        ccm_size: usize,
        transaction_sending_chain_id: ChainId,
    ) -> Result<Self, crate::domain::InteropError> {
        let ccm_id = ccm.id()?;
        Ok(Self {
            store: ctx.store,
            events: ctx.events,
            block: ctx.block,
            ccm,
            ccm_id,
            ccm_size,
            transaction_sending_chain_id,
        })
    }

    /// Method context over the same store and log.
    pub fn method_context(&mut self) -> MethodContext<'_> {
        MethodContext {
            store: &mut *self.store,
            events: &mut *self.events,
            block: self.block,
        }
    }

    /// Snapshot store and log.
    pub fn checkpoint(&mut self) -> Checkpoint {
        Checkpoint::take(self.store, self.events)
    }

    /// Revert store and log to `checkpoint`.
    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<(), StoreError> {
        checkpoint.restore(self.store, self.events)
    }
}

/// Context of one recovered store entry, passed to a module's recover hook.
pub struct RecoverContext<'a> {
    /// State store
    pub store: &'a mut dyn StateStore,
    /// Event log
    pub events: &'a mut EventLog,
    /// Current block
    pub block: BlockContext,
    /// Terminated chain the entry comes from
    pub terminated_chain_id: ChainId,
    /// Substore prefix of the entry
    pub substore_prefix: Vec<u8>,
    /// Key of the entry
    pub store_key: Vec<u8>,
    /// Value of the entry
    pub store_value: Vec<u8>,
}
