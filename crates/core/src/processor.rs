//! The processor contract — the abstraction every chat processor implements.
//!
//! A processor turns a chat input (plus optional caller-supplied history)
//! into a chat output and keeps its own append-only history of successful
//! exchanges. Implementations: echo, Ollama-backed, user-defined extensions
//! registered with the loader.

use async_trait::async_trait;

use crate::chat::{ChatHistoryEntry, ChatInput, ChatOutput};
use crate::error::ProcessingError;

/// The two-operation chat processor contract.
///
/// The server front end shares exactly one instance across concurrently
/// handled requests, so `Send + Sync` is part of the contract and
/// implementations must keep their history behind interior mutability (or
/// otherwise be internally thread-safe). The contract itself imposes no
/// timeout; a processor may block on backend I/O.
#[async_trait]
pub trait ChatProcessor: Send + Sync {
    /// Process one input and produce a response.
    ///
    /// Must not mutate caller-supplied history. Every successful call
    /// appends exactly one entry to the instance's own history whose
    /// `input` equals this call's input.
    async fn process_chat(&self, input: ChatInput) -> Result<ChatOutput, ProcessingError>;

    /// The accumulated history of successful exchanges, in call order.
    ///
    /// The returned length is monotonically non-decreasing over the life of
    /// the instance.
    fn get_history(&self) -> Vec<ChatHistoryEntry>;
}

impl std::fmt::Debug for dyn ChatProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn ChatProcessor")
    }
}
