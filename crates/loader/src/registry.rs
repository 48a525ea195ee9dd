//! Extension registry — the module namespace that class paths resolve
//! against.
//!
//! Built-in modules are registered up front (see the processors crate's
//! `default_registry`). Modules that are not in the table can come from
//! pluggable [`ModuleProvider`]s, which receive the registry's search paths
//! — the directories of seen config files — so extensions living next to a
//! config can be resolved without being pre-installed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use orchael_core::error::LoaderError;
use orchael_core::ChatProcessor;
use tracing::{debug, info};

use crate::symbol::{ClassHandle, Construct, PlainClass, ProcessorClass, Symbol};

/// A named collection of exported symbols.
pub struct Module {
    name: String,
    symbols: HashMap<String, Symbol>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Export a class under its own name.
    pub fn export_class(&mut self, handle: Arc<dyn ClassHandle>) {
        self.symbols
            .insert(handle.class_name().to_string(), Symbol::Class(handle));
    }

    /// Export a contract-conforming processor type.
    pub fn export_processor<P>(&mut self, name: &str)
    where
        P: ChatProcessor + Construct + 'static,
    {
        self.export_class(Arc::new(ProcessorClass::<P>::new(name)));
    }

    /// Export a class that does not implement the processor contract.
    pub fn export_plain_class(&mut self, name: &str) {
        self.export_class(Arc::new(PlainClass::new(name)));
    }

    /// Export a non-class value.
    pub fn export_value(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.symbols.insert(name.into(), Symbol::Value(value));
    }

    pub fn get(&self, symbol: &str) -> Option<&Symbol> {
        self.symbols.get(symbol)
    }
}

/// Pluggable resolution for modules absent from the registry table.
///
/// `search_paths` are the directories registered via
/// [`ExtensionRegistry::ensure_search_path`], in insertion order.
pub trait ModuleProvider: Send + Sync {
    fn resolve(&self, module_path: &str, search_paths: &[PathBuf]) -> Option<Module>;
}

/// The process-wide module namespace.
pub struct ExtensionRegistry {
    modules: HashMap<String, Module>,
    providers: Vec<Box<dyn ModuleProvider>>,
    search_paths: Vec<PathBuf>,
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtensionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            providers: Vec::new(),
            search_paths: Vec::new(),
        }
    }

    /// Register a module under its name.
    pub fn register_module(&mut self, module: Module) {
        debug!(module = %module.name(), "Registered extension module");
        self.modules.insert(module.name().to_string(), module);
    }

    /// Add a module provider consulted for unknown modules.
    pub fn add_provider(&mut self, provider: Box<dyn ModuleProvider>) {
        self.providers.push(provider);
    }

    /// Record a directory to consult when resolving extension modules.
    /// Appending is idempotent: a directory is held at most once.
    pub fn ensure_search_path(&mut self, dir: impl AsRef<Path>) {
        let dir = dir.as_ref();
        let dir = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
        if !self.search_paths.contains(&dir) {
            debug!(dir = %dir.display(), "Added extension search path");
            self.search_paths.push(dir);
        }
    }

    /// Directories consulted for extension resolution, in insertion order.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// List registered module names.
    pub fn list_modules(&self) -> Vec<&str> {
        self.modules.keys().map(|s| s.as_str()).collect()
    }

    fn resolve_module(&mut self, module_path: &str) -> Option<&Module> {
        if !self.modules.contains_key(module_path) {
            let resolved = self
                .providers
                .iter()
                .find_map(|p| p.resolve(module_path, &self.search_paths));
            if let Some(module) = resolved {
                info!(module = %module_path, "Resolved extension module via provider");
                self.modules.insert(module_path.to_string(), module);
            }
        }
        self.modules.get(module_path)
    }

    /// Resolve a `module.ClassName` path to a contract-conforming class.
    ///
    /// The directory containing `config_file` is added to the search paths
    /// (once) before resolution, so processors shipped alongside a config
    /// can be found by providers. A path without a `.` fails before any
    /// resolution is attempted.
    pub fn load_processor_class(
        &mut self,
        class_path: &str,
        config_file: &Path,
    ) -> Result<Arc<dyn ClassHandle>, LoaderError> {
        let (module_path, class_name) = class_path
            .rsplit_once('.')
            .ok_or_else(|| LoaderError::InvalidClassPath(class_path.to_string()))?;

        if let Some(dir) = std::path::absolute(config_file)
            .unwrap_or_else(|_| config_file.to_path_buf())
            .parent()
        {
            self.ensure_search_path(dir);
        }

        let module = self
            .resolve_module(module_path)
            .ok_or_else(|| LoaderError::ModuleResolution {
                module: module_path.to_string(),
            })?;

        let symbol = module
            .get(class_name)
            .ok_or_else(|| LoaderError::SymbolResolution {
                module: module_path.to_string(),
                symbol: class_name.to_string(),
            })?;

        let handle = match symbol {
            Symbol::Value(_) => {
                return Err(LoaderError::NotAClass {
                    module: module_path.to_string(),
                    symbol: class_name.to_string(),
                });
            }
            Symbol::Class(handle) => handle.clone(),
        };

        if handle.as_processor_factory().is_none() {
            return Err(LoaderError::ContractViolation {
                class_path: class_path.to_string(),
            });
        }

        debug!(class = %class_path, "Resolved processor class");
        Ok(handle)
    }

    /// Construct a processor instance from a resolved class.
    pub fn instantiate(
        &self,
        handle: &dyn ClassHandle,
    ) -> Result<Box<dyn ChatProcessor>, LoaderError> {
        let factory =
            handle
                .as_processor_factory()
                .ok_or_else(|| LoaderError::ContractViolation {
                    class_path: handle.class_name().to_string(),
                })?;

        factory
            .instantiate()
            .map_err(|cause| LoaderError::Instantiation {
                class_path: handle.class_name().to_string(),
                cause: cause.to_string(),
            })
    }
}
