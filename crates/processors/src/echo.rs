//! Echo processor — repeats its input, with env-driven decoration.
//!
//! Settings (read at construction time):
//! - `ECHO_PREFIX` — prepended to every output (default `"Echo: "`)
//! - `ECHO_UPPERCASE` — `"true"` upcases the input first (default off)
//! - `ECHO_REPEAT_COUNT` — repeats the text N times (default 1); a
//!   non-numeric value fails construction

use async_trait::async_trait;
use std::sync::Mutex;

use orchael_core::chat::{ChatHistoryEntry, ChatInput, ChatOutput};
use orchael_core::error::ProcessingError;
use orchael_core::ChatProcessor;
use orchael_loader::{Construct, symbol::ConstructError};

#[derive(Debug)]
pub struct EchoProcessor {
    prefix: String,
    uppercase: bool,
    repeat_count: u32,
    history: Mutex<Vec<ChatHistoryEntry>>,
}

impl EchoProcessor {
    /// Construct with explicit settings, bypassing the environment.
    pub fn with_settings(prefix: impl Into<String>, uppercase: bool, repeat_count: u32) -> Self {
        Self {
            prefix: prefix.into(),
            uppercase,
            repeat_count,
            history: Mutex::new(Vec::new()),
        }
    }

    fn render(&self, input: &str) -> String {
        let mut text = if self.uppercase {
            input.to_uppercase()
        } else {
            input.to_string()
        };
        if self.repeat_count > 1 {
            // Repetition keeps the separator after every copy, trailing
            // space included.
            text = format!("{text} ").repeat(self.repeat_count as usize);
        }
        format!("{}{}", self.prefix, text)
    }
}

impl Construct for EchoProcessor {
    fn construct() -> Result<Self, ConstructError> {
        let prefix = std::env::var("ECHO_PREFIX").unwrap_or_else(|_| "Echo: ".to_string());
        let uppercase = std::env::var("ECHO_UPPERCASE")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);
        let repeat_count = match std::env::var("ECHO_REPEAT_COUNT") {
            Ok(raw) => raw
                .parse::<u32>()
                .map_err(|_| format!("invalid ECHO_REPEAT_COUNT '{raw}'"))?,
            Err(_) => 1,
        };

        tracing::debug!(prefix, uppercase, repeat_count, "Echo processor initialized");
        Ok(Self::with_settings(prefix, uppercase, repeat_count))
    }
}

#[async_trait]
impl ChatProcessor for EchoProcessor {
    async fn process_chat(&self, input: ChatInput) -> Result<ChatOutput, ProcessingError> {
        let output = self.render(&input.input);
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ChatHistoryEntry::new(&input.input, &output));
        Ok(ChatOutput {
            input: input.input,
            output,
        })
    }

    fn get_history(&self) -> Vec<ChatHistoryEntry> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
