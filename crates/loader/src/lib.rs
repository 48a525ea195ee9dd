//! Extension loading for the Orchael SDK.
//!
//! Processor classes are named with a dotted `module.ClassName` string.
//! The namespace it resolves against is explicit: an [`ExtensionRegistry`]
//! holds named modules, each exporting symbols that are either classes
//! (with a capability-checked constructor) or plain values. Resolution,
//! the contract check, and instantiation each fail with their own
//! `LoaderError` variant; the loader never prints or terminates.

pub mod registry;
pub mod symbol;

pub use registry::{ExtensionRegistry, Module, ModuleProvider};
pub use symbol::{ClassHandle, Construct, PlainClass, ProcessorClass, ProcessorFactory, Symbol};
