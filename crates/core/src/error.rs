//! Error types for the Orchael SDK.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! (configuration, extension loading, dispatch, processing) has its own
//! error type; libraries return these and never print or exit — the front
//! ends (CLI, HTTP gateway) decide presentation.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all Orchael operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] ProcessorInitError),

    #[error("Processing error: {0}")]
    Processing(#[from] ProcessingError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures while loading or validating a config document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Failures while resolving, checking, or instantiating an extension class.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("invalid processor class path '{0}': expected 'module.ClassName'")]
    InvalidClassPath(String),

    #[error("module '{module}' not found in the extension registry")]
    ModuleResolution { module: String },

    #[error("module '{module}' has no symbol named '{symbol}'")]
    SymbolResolution { module: String, symbol: String },

    #[error("symbol '{symbol}' in module '{module}' is not a class")]
    NotAClass { module: String, symbol: String },

    #[error("class '{class_path}' does not implement the chat processor contract")]
    ContractViolation { class_path: String },

    #[error("failed to construct processor '{class_path}': {cause}")]
    Instantiation { class_path: String, cause: String },
}

/// Dispatch-time wrapper over anything that can go wrong while bringing the
/// active processor up: config loading, class resolution, instantiation.
#[derive(Debug, Error)]
pub enum ProcessorInitError {
    #[error("processor initialization failed: {0}")]
    Config(#[from] ConfigError),

    #[error("processor initialization failed: {0}")]
    Loader(#[from] LoaderError),
}

/// An error raised by a processor during `process_chat`.
///
/// Deliberately opaque: the processor decides the message, the caller
/// decides exposure (stderr for the CLI, a 500 detail for the gateway).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProcessingError {
    pub message: String,
}

impl ProcessingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_errors_display_the_offending_path() {
        let err = LoaderError::InvalidClassPath("EchoProcessor".into());
        assert!(err.to_string().contains("EchoProcessor"));
        assert!(err.to_string().contains("module.ClassName"));

        let err = LoaderError::SymbolResolution {
            module: "orchael_processors".into(),
            symbol: "Missing".into(),
        };
        assert!(err.to_string().contains("orchael_processors"));
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn init_error_wraps_config_and_loader_errors() {
        let err: ProcessorInitError = ConfigError::Validation("missing 'processor_class'".into()).into();
        assert!(err.to_string().contains("processor initialization failed"));
        assert!(err.to_string().contains("processor_class"));

        let err: ProcessorInitError = LoaderError::ModuleResolution {
            module: "nope".into(),
        }
        .into();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn instantiation_error_carries_cause() {
        let err = LoaderError::Instantiation {
            class_path: "pkg.Broken".into(),
            cause: "invalid ECHO_REPEAT_COUNT".into(),
        };
        assert!(err.to_string().contains("pkg.Broken"));
        assert!(err.to_string().contains("ECHO_REPEAT_COUNT"));
    }
}
