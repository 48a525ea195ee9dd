//! Ollama-backed processor.
//!
//! Sends each input (plus caller-supplied history as alternating
//! user/assistant turns) to an Ollama server's `/api/chat` endpoint,
//! non-streaming.
//!
//! Settings (read at construction time):
//! - `OLLAMA_URL` — server base URL (default `http://localhost:11434`)
//! - `OLLAMA_MODEL` — model name (default `llama2`)
//! - `OLLAMA_TEMPERATURE` — sampling temperature (default `0.7`); a
//!   non-numeric value fails construction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::debug;

use orchael_core::chat::{ChatHistoryEntry, ChatInput, ChatOutput};
use orchael_core::error::ProcessingError;
use orchael_core::ChatProcessor;
use orchael_loader::{Construct, symbol::ConstructError};

const SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Answer questions clearly and concisely.";

#[derive(Debug)]
pub struct OllamaProcessor {
    base_url: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
    history: Mutex<Vec<ChatHistoryEntry>>,
}

#[derive(Debug, Serialize)]
struct ApiChatRequest {
    model: String,
    messages: Vec<ApiMessage>,
    stream: bool,
    options: ApiOptions,
}

#[derive(Debug, Serialize)]
struct ApiOptions {
    temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    message: ApiMessage,
}

impl OllamaProcessor {
    /// Construct with explicit settings, bypassing the environment.
    pub fn with_settings(
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Result<Self, ConstructError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| format!("failed to create HTTP client: {e}"))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature,
            client,
            history: Mutex::new(Vec::new()),
        })
    }

    /// Flatten caller-supplied history into alternating user/assistant
    /// turns, preceded by the system prompt and followed by the input.
    fn build_messages(history: Option<&[ChatHistoryEntry]>, input: &str) -> Vec<ApiMessage> {
        let mut messages = vec![ApiMessage {
            role: "system".into(),
            content: SYSTEM_PROMPT.into(),
        }];
        for entry in history.unwrap_or_default() {
            messages.push(ApiMessage {
                role: "user".into(),
                content: entry.input.clone(),
            });
            messages.push(ApiMessage {
                role: "assistant".into(),
                content: entry.output.clone(),
            });
        }
        messages.push(ApiMessage {
            role: "user".into(),
            content: input.into(),
        });
        messages
    }
}

impl Construct for OllamaProcessor {
    fn construct() -> Result<Self, ConstructError> {
        let base_url =
            std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama2".to_string());
        let temperature = match std::env::var("OLLAMA_TEMPERATURE") {
            Ok(raw) => raw
                .parse::<f32>()
                .map_err(|_| format!("invalid OLLAMA_TEMPERATURE '{raw}'"))?,
            Err(_) => 0.7,
        };

        debug!(base_url, model, temperature, "Ollama processor initialized");
        Self::with_settings(base_url, model, temperature)
    }
}

#[async_trait]
impl ChatProcessor for OllamaProcessor {
    async fn process_chat(&self, input: ChatInput) -> Result<ChatOutput, ProcessingError> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ApiChatRequest {
            model: self.model.clone(),
            messages: Self::build_messages(input.history.as_deref(), &input.input),
            stream: false,
            options: ApiOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProcessingError::new(format!("Ollama request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProcessingError::new(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let parsed: ApiChatResponse = response
            .json()
            .await
            .map_err(|e| ProcessingError::new(format!("invalid Ollama response: {e}")))?;

        let output = parsed.message.content;
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
