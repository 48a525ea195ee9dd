//! # Orchael Core
//!
//! Chat data types, the processor contract, and error definitions for the
//! Orchael SDK. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The contract is a single trait (`ChatProcessor`) with exactly two
//! operations. Concrete processors live in their own crates (or in user
//! extensions registered with the loader) and are selected at configuration
//! time, not at compile time. All failure modes are typed here so front
//! ends can decide presentation without the libraries printing or exiting.

pub mod chat;
pub mod error;
pub mod processor;

// Re-export key types at crate root for ergonomics
pub use chat::{ChatError, ChatHistoryEntry, ChatInput, ChatOutput, ChatResponse};
pub use error::{ConfigError, Error, LoaderError, ProcessingError, ProcessorInitError, Result};
pub use processor::ChatProcessor;
