//! Chat value objects.
//!
//! These are the shapes that flow across the processor contract and the HTTP
//! boundary: an input (plus optional caller-supplied history), an output that
//! echoes the original input, and a history entry pairing the two.

use serde::{Deserialize, Serialize};

/// A single entry in a processor's chat history.
///
/// Immutable once created; a processor's history is an ordered, append-only
/// sequence of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistoryEntry {
    /// The user input that produced this entry
    pub input: String,

    /// The processor's output for that input
    pub output: String,
}

impl ChatHistoryEntry {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Input to a processor's `process_chat` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatInput {
    /// The text to process
    pub input: String,

    /// Caller-provided context (e.g. replayed from a prior HTTP response).
    /// `None` means the processor should rely on its own internal memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ChatHistoryEntry>>,
}

impl ChatInput {
    /// Input without caller-supplied history.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            history: None,
        }
    }

    /// Input with explicit caller-supplied history.
    pub fn with_history(input: impl Into<String>, history: Vec<ChatHistoryEntry>) -> Self {
        Self {
            input: input.into(),
            history: Some(history),
        }
    }
}

/// Successful result of a `process_chat` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatOutput {
    /// The original input, echoed back
    pub input: String,

    /// The produced output
    pub output: String,
}

/// Error shape returned across the chat boundary instead of a `ChatOutput`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatError {
    pub error: String,
}

/// Tagged union of the two possible chat responses.
///
/// Serialized untagged: a success carries `input`/`output`, a failure
/// carries `error`, so the wire shape distinguishes them by field set.
/// This is the decode type for SDK consumers talking to a processor over
/// the wire; the bundled HTTP gateway composes its own response bodies and
/// does not construct it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Completed(ChatOutput),
    Failed(ChatError),
}

impl ChatResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ChatResponse::Failed(_))
    }
}

impl From<ChatOutput> for ChatResponse {
    fn from(output: ChatOutput) -> Self {
        ChatResponse::Completed(output)
    }
}

impl From<ChatError> for ChatResponse {
    fn from(error: ChatError) -> Self {
        ChatResponse::Failed(error)
    }
}
