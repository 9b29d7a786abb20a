use axum::{extract::State, Json};
use validator::Validate;

use crate::dto::{ChatRequest, ChatResponse};
use crate::error::AppResult;
use crate::AppState;

/// Answers the conversation with whichever engine is selected for this
/// request. Engine failures still come back as 200 with an apology or error
/// text so the chat window keeps flowing.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    body.validate()?;

    let engine = state.engines.select().await;
    tracing::info!(
        engine = engine.name(),
        turns = body.messages.len(),
        context_chunks = body.context.as_ref().map_or(0, Vec::len),
        signed_in = body.email.is_some(),
        "Chat request"
    );

    let response = engine.reply(&body.messages, body.context.as_deref()).await;

    Ok(Json(ChatResponse {
        response,
        engine: engine.name(),
    }))
}
