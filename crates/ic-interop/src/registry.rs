//! Immutable registry of cross-chain modules.
//!
//! Built once at startup and shared as `Arc<ModuleRegistry>`. Modules keep
//! their registration order, which is the order hooks run in.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::domain::InteropError;
use crate::ports::{CrossChainCommand, CrossChainModule};

struct Entry {
    module: Arc<dyn CrossChainModule>,
    commands: HashMap<String, Arc<dyn CrossChainCommand>>,
}

/// Registered modules and their cross-chain commands.
pub struct ModuleRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.module_names())
            .finish()
    }
}

impl ModuleRegistry {
    /// Start building a registry.
    pub fn builder() -> ModuleRegistryBuilder {
        ModuleRegistryBuilder::default()
    }

    /// Module registered under `name`.
    pub fn module(&self, name: &str) -> Option<&Arc<dyn CrossChainModule>> {
        self.index.get(name).map(|&i| &self.entries[i].module)
    }

    /// Cross-chain command `command` of module `module`.
    pub fn command(&self, module: &str, command: &str) -> Option<&Arc<dyn CrossChainCommand>> {
        self.index
            .get(module)
            .and_then(|&i| self.entries[i].commands.get(command))
    }

    /// Modules in registration order.
    pub fn modules(&self) -> impl Iterator<Item = &Arc<dyn CrossChainModule>> {
        self.entries.iter().map(|entry| &entry.module)
    }

    /// Module names in registration order.
    pub fn module_names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.module.name()).collect()
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no module is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder of a [`ModuleRegistry`].
#[derive(Default)]
pub struct ModuleRegistryBuilder {
    modules: Vec<Arc<dyn CrossChainModule>>,
}

impl ModuleRegistryBuilder {
    /// Append a module.
    pub fn with_module(mut self, module: Arc<dyn CrossChainModule>) -> Self {
        self.modules.push(module);
        self
    }

    /// Append a module in place.
    pub fn register(&mut self, module: Arc<dyn CrossChainModule>) -> &mut Self {
        self.modules.push(module);
        self
    }

    /// Freeze the registry. Module names and command names within a module
    /// must be unique.
    pub fn build(self) -> Result<ModuleRegistry, InteropError> {
        let mut entries = Vec::with_capacity(self.modules.len());
        let mut index = HashMap::with_capacity(self.modules.len());
        for module in self.modules {
            let name = module.name().to_string();
            if index.contains_key(&name) {
                return Err(InteropError::InvalidParams(format!(
                    "module {name} registered twice"
                )));
            }
            let mut commands = HashMap::new();
            for command in module.cross_chain_commands() {
                let command_name = command.name().to_string();
                if commands.insert(command_name.clone(), command).is_some() {
                    return Err(InteropError::InvalidParams(format!(
                        "cross-chain command {name}.{command_name} registered twice"
                    )));
                }
            }
            debug!(
                module = %name,
                commands = commands.len(),
                "[ic-interop] Registered cross-chain module"
            );
            index.insert(name, entries.len());
            entries.push(Entry { module, commands });
        }
        Ok(ModuleRegistry { entries, index })
    }
}
