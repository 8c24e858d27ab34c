use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::errors::ApiError;
use crate::session::{self, SessionState, SessionStore};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let message = match payload {
        Ok(Json(request)) => request.message.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!("Rejected chat payload: {}", rejection);
            String::new()
        }
    };
    if message.trim().is_empty() {
        return Err(ApiError::NoMessage);
    }

    let dialogue = state.dialogue().ok_or(ApiError::ServiceUnavailable)?;

    let cookie_name = &state.config.session.cookie_name;
    let (session_id, history) = match load_session(&state, &headers).await {
        Ok(Some(found)) => found,
        Ok(None) => (SessionStore::new_session_id(), SessionState::default()),
        Err(err) => {
            tracing::error!("Error during text generation: {}", err);
            return Err(err);
        }
    };

    let turn = dialogue
        .respond(&history.history, &message)
        .await
        .map_err(|err| {
            tracing::error!("Error during text generation: {}", err);
            ApiError::generation(err)
        })?;

    let updated = SessionState {
        history: turn.history,
    };
    let encoded = updated.to_json().map_err(|err| {
        tracing::error!("Error during text generation: {}", err);
        ApiError::generation(err)
    })?;
    state.sessions.save(&session_id, encoded).await;

    let mut response = Json(ChatResponse {
        response: turn.response,
    })
    .into_response();
    if let Some(cookie) =
        session::build_session_cookie(cookie_name, &session_id, state.config.session.idle_ttl())
    {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let history = load_session(&state, &headers)
        .await?
        .map(|(_, state)| state.history)
        .unwrap_or_default();
    let token_count = history.len();

    Ok(Json(json!({
        "chat_history_ids": history,
        "token_count": token_count,
    })))
}

pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let cookie_name = &state.config.session.cookie_name;
    let cleared = match session::session_id_from_headers(&headers, cookie_name) {
        Some(id) => state.sessions.remove(&id).await,
        None => false,
    };

    let mut response = Json(json!({ "cleared": cleared })).into_response();
    if let Some(cookie) = session::expired_session_cookie(cookie_name) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

/// The caller's live session, if the cookie names one the store still holds.
async fn load_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<(String, SessionState)>, ApiError> {
    let Some(id) = session::session_id_from_headers(headers, &state.config.session.cookie_name)
    else {
        return Ok(None);
    };
    let Some(raw) = state.sessions.load(&id).await else {
        return Ok(None);
    };
    let decoded = SessionState::from_json(&raw).map_err(ApiError::generation)?;
    Ok(Some((id, decoded)))
}
