use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::{AppState, ModelStatus};

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let active_sessions = state.sessions.len().await;
    let reserved_generation_budget = state.config.generation.max_new_tokens;

    let (model, model_loaded, max_context_tokens, reason) = match &state.model {
        ModelStatus::Ready(dialogue) => (
            dialogue.model_name(),
            true,
            dialogue.window().config().max_context,
            None,
        ),
        ModelStatus::Unavailable { reason } => (
            state.config.model.name.as_str(),
            false,
            state.config.model.max_position_embeddings,
            Some(reason.as_str()),
        ),
    };

    Json(json!({
        "model": model,
        "model_loaded": model_loaded,
        "unavailable_reason": reason,
        "active_sessions": active_sessions,
        "max_context_tokens": max_context_tokens,
        "reserved_generation_budget": reserved_generation_budget,
    }))
}
