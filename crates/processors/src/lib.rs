//! Example processor implementations for the Orchael SDK.
//!
//! Both read their settings from environment variables, which the config
//! resolver projects from the config's `env` section before loading.

pub mod echo;
pub mod ollama;

pub use echo::EchoProcessor;
pub use ollama::OllamaProcessor;

use orchael_loader::{ExtensionRegistry, Module};

/// Module name the built-in processors are exported under.
pub const BUILTIN_MODULE: &str = "orchael_processors";

/// Create a registry with the built-in processor module registered.
///
/// Exports `EchoProcessor` and `OllamaProcessor` as classes and `VERSION`
/// as a plain value symbol.
pub fn default_registry() -> ExtensionRegistry {
    let mut module = Module::new(BUILTIN_MODULE);
    module.export_processor::<EchoProcessor>("EchoProcessor");
    module.export_processor::<OllamaProcessor>("OllamaProcessor");
    module.export_value("VERSION", serde_json::json!(env!("CARGO_PKG_VERSION")));

    let mut registry = ExtensionRegistry::new();
    registry.register_module(module);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn default_registry_exports_builtin_processors() {
        let mut registry = default_registry();
        let handle = registry
            .load_processor_class(
                "orchael_processors.EchoProcessor",
                Path::new("config.yaml"),
            )
            .unwrap();
        assert_eq!(handle.class_name(), "EchoProcessor");
    }

    #[test]
    fn version_symbol_is_not_loadable_as_a_processor() {
        let mut registry = default_registry();
        let err = registry
            .load_processor_class("orchael_processors.VERSION", Path::new("config.yaml"))
            .unwrap_err();
        assert!(matches!(
            err,
            orchael_core::error::LoaderError::NotAClass { .. }
        ));
    }
}
