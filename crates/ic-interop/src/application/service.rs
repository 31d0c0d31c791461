//! # Interoperability Module
//!
//! Wires configuration, the module registry and the outbound ports into the
//! command set of the own chain's role, and runs commands atomically.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::endpoint::InteropEndpoint;
use crate::commands::{
    CrossChainUpdateCommand, InitializeStateRecoveryCommand, InteroperabilityModule,
    RecoverStateCommand, RegisterMainchainCommand, RegisterSidechainCommand,
    TerminateSidechainForLivenessCommand,
};
use crate::config::InteropConfig;
use crate::context::MethodContext;
use crate::dispatcher::CcmDispatcher;
use crate::domain::{ChainRole, InteropError, RegisteredName, MAINCHAIN_NAME};
use crate::methods::InternalMethods;
use crate::ports::{BftValidatorSource, BlsVerifier, CrossChainModule, InteropCommand};
use crate::registry::ModuleRegistry;

/// The interoperability module of one chain.
pub struct InteropModule {
    methods: InternalMethods,
    registry: Arc<ModuleRegistry>,
    dispatcher: CcmDispatcher,
    commands: HashMap<&'static str, Arc<dyn InteropCommand>>,
}

impl std::fmt::Debug for InteropModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteropModule")
            .field("methods", &self.methods)
            .field("registry", &self.registry)
            .field("commands", &self.command_names())
            .finish()
    }
}

impl InteropModule {
    /// Build the module. The interoperability module's own cross-chain
    /// commands are registered ahead of the modules in `modules`.
    pub fn new(
        config: InteropConfig,
        modules: Vec<Arc<dyn CrossChainModule>>,
        verifier: Arc<dyn BlsVerifier>,
        bft: Arc<dyn BftValidatorSource>,
    ) -> Result<Self, InteropError> {
        config
            .validate()
            .map_err(|e| InteropError::InvalidParams(e.to_string()))?;
        let methods = InternalMethods::new(Arc::new(config), verifier);

        let mut builder = ModuleRegistry::builder()
            .with_module(Arc::new(InteroperabilityModule::new(methods.clone())));
        for module in modules {
            builder.register(module);
        }
        let registry = Arc::new(builder.build()?);
        let dispatcher = CcmDispatcher::new(methods.clone(), Arc::clone(&registry));

        let mut list: Vec<Arc<dyn InteropCommand>> = vec![
            Arc::new(CrossChainUpdateCommand::new(methods.clone(), dispatcher.clone())),
            Arc::new(RecoverStateCommand::new(methods.clone(), Arc::clone(&registry))),
        ];
        match methods.role() {
            ChainRole::Mainchain => {
                list.push(Arc::new(RegisterSidechainCommand::new(methods.clone())));
                list.push(Arc::new(TerminateSidechainForLivenessCommand::new(methods.clone())));
            }
            ChainRole::Sidechain => {
                list.push(Arc::new(RegisterMainchainCommand::new(methods.clone(), bft)));
                list.push(Arc::new(InitializeStateRecoveryCommand::new(methods.clone())));
            }
        }
        let commands = list.into_iter().map(|c| (c.name(), c)).collect();

        info!(
            chain_id = %methods.own_chain_id(),
            role = ?methods.role(),
            modules = ?registry.module_names(),
            "[ic-interop] Interoperability module ready"
        );
        Ok(Self {
            methods,
            registry,
            dispatcher,
            commands,
        })
    }

    /// Internal methods, for modules that send messages.
    pub fn methods(&self) -> &InternalMethods {
        &self.methods
    }

    /// Registered cross-chain modules.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// CCM dispatcher.
    pub fn dispatcher(&self) -> &CcmDispatcher {
        &self.dispatcher
    }

    /// Read endpoint.
    pub fn endpoint(&self) -> InteropEndpoint {
        InteropEndpoint::new(self.methods.clone())
    }

    /// Names of the commands available on this chain, sorted.
    pub fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Command registered under `name`.
    pub fn command(&self, name: &str) -> Option<&Arc<dyn InteropCommand>> {
        self.commands.get(name)
    }

    /// Verify `name` without touching state.
    pub fn verify_command(
        &self,
        ctx: &MethodContext<'_>,
        name: &str,
        params: &[u8],
    ) -> Result<(), InteropError> {
        self.command(name)
            .ok_or_else(|| InteropError::UnknownCommand(name.to_string()))?
            .verify(ctx, params)
    }

    /// Verify then execute `name`. A failed execution leaves no state
    /// behind except unrevertible events.
    pub fn execute_command(
        &self,
        ctx: &mut MethodContext<'_>,
        name: &str,
        params: &[u8],
    ) -> Result<(), InteropError> {
        let command = self
            .command(name)
            .ok_or_else(|| InteropError::UnknownCommand(name.to_string()))?;
        command.verify(ctx, params)?;

        let checkpoint = ctx.checkpoint();
        if let Err(e) = command.execute(ctx, params) {
            warn!(
                command = name,
                error = %e,
                kind = ?e.kind(),
                "[ic-interop] Command failed, reverting"
            );
            ctx.restore(checkpoint)?;
            return Err(e);
        }
        Ok(())
    }

    /// Genesis state. The mainchain owns its account and the mainchain name
    /// from the start; a sidechain gets both from `registerMainchain`.
    pub fn init_genesis(&self, ctx: &mut MethodContext<'_>) -> Result<(), InteropError> {
        if self.methods.role() != ChainRole::Mainchain {
            return Ok(());
        }
        let own = self.methods.set_own_chain_account(ctx, MAINCHAIN_NAME)?;
        self.methods.stores().registered_names.set(
            ctx.store,
            MAINCHAIN_NAME.as_bytes(),
            &RegisteredName {
                chain_id: own.chain_id,
            },
        )?;
        Ok(())
    }
}
