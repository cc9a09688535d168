use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{ChatMessage, ConversationState};
use crate::services::agent;
use crate::state::AppState;

use super::auth::session_token;
use super::ApiResponse;

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

// POST /chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ApiResponse>, AppError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Message cannot be empty".to_string()));
    }

    state.sessions.expire();
    let unauthorized = || AppError::Unauthorized("Please login first".to_string());
    let token = session_token(&headers).ok_or_else(unauthorized)?;
    let session = state.sessions.get(&token).ok_or_else(unauthorized)?;

    let mut conversation = match session.conversation {
        Some(mut conversation) => {
            conversation.messages.push(ChatMessage::human(message));
            conversation
        }
        None => ConversationState::new(session.id_number, message),
    };

    tracing::info!(
        id_number = %session.id_number,
        history = conversation.messages.len(),
        "processing chat turn"
    );

    agent::run(&state, &mut conversation).await?;

    let reply = conversation.last_ai_message().map(|m| m.content.clone());
    state.sessions.update(&token, conversation);

    match reply {
        Some(reply) => Ok(Json(ApiResponse::success(reply))),
        None => Err(AppError::NoResponse),
    }
}
