//! Axum route handler for the chat assistant.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assistant::prompts::assistant_system;
use crate::assistant::{build_turns, ChatMessage, UserRole};
use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub role: UserRole,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// POST /api/v1/assistant/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let llm = state
        .llm
        .as_ref()
        .ok_or_else(|| AppError::NotFound("assistant is not configured".to_string()))?;

    let turns = build_turns(&request.history, &request.message);
    info!(
        "Assistant chat: role={:?}, turns={}",
        request.role,
        turns.len()
    );

    let response = llm
        .converse(&assistant_system(request.role), &turns)
        .await
        .map_err(|e| AppError::Llm(format!("assistant reply failed: {e}")))?;

    let reply = response
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Llm(LlmError::EmptyContent.to_string()))?;

    Ok(Json(ChatResponse {
        reply: reply.to_string(),
    }))
}
