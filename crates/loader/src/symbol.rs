//! Symbols exported by extension modules.
//!
//! A module exports named symbols. A symbol is either a class — something
//! with a zero-argument constructor — or any other value. Whether a class
//! implements the chat processor contract is an explicit capability check
//! (`ClassHandle::as_processor_factory`), not an inheritance inspection.

use std::marker::PhantomData;
use std::sync::Arc;

use orchael_core::ChatProcessor;

/// Constructor failures carry the implementation's own error as the cause.
pub type ConstructError = Box<dyn std::error::Error + Send + Sync>;

/// Zero-argument, fallible construction for registrable processor types.
///
/// Constructors typically read their settings from environment variables
/// (projected from the config's `env` section before loading happens).
pub trait Construct: Sized {
    fn construct() -> Result<Self, ConstructError>;
}

/// Builds processor instances from a registered class.
pub trait ProcessorFactory: Send + Sync {
    fn instantiate(&self) -> Result<Box<dyn ChatProcessor>, ConstructError>;
}

/// A class exported by a module.
pub trait ClassHandle: Send + Sync {
    /// The simple class name, as registered in its module.
    fn class_name(&self) -> &str;

    /// Capability check: `Some` only when this class implements the chat
    /// processor contract.
    fn as_processor_factory(&self) -> Option<&dyn ProcessorFactory>;
}

impl std::fmt::Debug for dyn ClassHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassHandle")
            .field("class_name", &self.class_name())
            .finish()
    }
}

/// What a module exports under a name.
#[derive(Clone)]
pub enum Symbol {
    /// An exported class.
    Class(Arc<dyn ClassHandle>),

    /// Any other exported value: constants, metadata, and the like.
    Value(serde_json::Value),
}

/// Class handle for any contract-conforming processor type.
pub struct ProcessorClass<P> {
    name: String,
    _marker: PhantomData<fn() -> P>,
}

impl<P> ProcessorClass<P> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }
}

impl<P> ClassHandle for ProcessorClass<P>
where
    P: ChatProcessor + Construct + 'static,
{
    fn class_name(&self) -> &str {
        &self.name
    }

    fn as_processor_factory(&self) -> Option<&dyn ProcessorFactory> {
        Some(self)
    }
}

impl<P> ProcessorFactory for ProcessorClass<P>
where
    P: ChatProcessor + Construct + 'static,
{
    fn instantiate(&self) -> Result<Box<dyn ChatProcessor>, ConstructError> {
        Ok(Box::new(P::construct()?))
    }
}

/// A class that does *not* implement the processor contract.
///
/// Modules may export such classes; loading one as a processor fails the
/// capability check.
pub struct PlainClass {
    name: String,
}

impl PlainClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ClassHandle for PlainClass {
    fn class_name(&self) -> &str {
        &self.name
    }

    fn as_processor_factory(&self) -> Option<&dyn ProcessorFactory> {
        None
    }
}
