//! HTTP server for the Orchael SDK.
//!
//! A thin adapter over the dispatch façade: three routes, one shared
//! [`ProcessorHost`]. Any initialization or processing failure maps to a
//! 500 response with a `detail` message; `/health` never touches the
//! processor and reports ok even when the config is broken.
//!
//! Built on Axum.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use orchael_core::chat::{ChatHistoryEntry, ChatInput};
use orchael_dispatch::ProcessorHost;

type SharedHost = Arc<ProcessorHost>;

/// Build the Axum router with all routes.
pub fn build_router(host: SharedHost) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/chat/history", get(history_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(host)
}

/// Start the HTTP server on `host:port`.
pub async fn start(
    bind_host: &str,
    port: u16,
    processor_host: SharedHost,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{bind_host}:{port}");
    let app = build_router(processor_host);

    info!(addr = %addr, "Orchael server starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Wire shapes ---

#[derive(Deserialize)]
struct ChatRequest {
    input: String,

    #[serde(default)]
    history: Vec<ChatHistoryEntry>,
}

#[derive(Serialize)]
struct ChatResponseBody {
    input: String,
    output: String,
}

#[derive(Serialize)]
struct HistoryResponseBody {
    history: Vec<ChatHistoryEntry>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct ErrorDetail {
    detail: String,
}

type HandlerError = (StatusCode, Json<ErrorDetail>);

fn internal_error(context: &str, e: impl std::fmt::Display) -> HandlerError {
    error!(error = %e, "{context}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorDetail {
            detail: format!("{context}: {e}"),
        }),
    )
}

// --- Handlers ---

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn chat_handler(
    State(host): State<SharedHost>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponseBody>, HandlerError> {
    let processor = host
        .get_processor()
        .await
        .map_err(|e| internal_error("Error processing chat", e))?;

    let input = ChatInput {
        input: request.input,
        history: Some(request.history),
    };
    let result = processor
        .process_chat(input)
        .await
        .map_err(|e| internal_error("Error processing chat", e))?;

    Ok(Json(ChatResponseBody {
        input: result.input,
        output: result.output,
    }))
}

async fn history_handler(
    State(host): State<SharedHost>,
) -> Result<Json<HistoryResponseBody>, HandlerError> {
    let processor = host
        .get_processor()
        .await
        .map_err(|e| internal_error("Error getting chat history", e))?;

    Ok(Json(HistoryResponseBody {
        history: processor.get_history(),
    }))
}
