use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

pub const NO_MESSAGE_RESPONSE: &str = "No message provided.";
pub const MODEL_UNAVAILABLE_RESPONSE: &str =
    "AI service is not available. The model could not be loaded.";
pub const GENERATION_FAILED_RESPONSE: &str =
    "I'm having trouble generating a response right now. Please try again.";

/// Terminal outcome of a request that did not produce a reply.
///
/// Every variant renders as `{"response": <fixed text>}` so clients can show the
/// body directly, whatever the status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no message provided")]
    NoMessage,
    #[error("model runtime unavailable")]
    ServiceUnavailable,
    #[error("generation failed: {0}")]
    Generation(String),
}

impl ApiError {
    pub fn generation<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Generation(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoMessage => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::NoMessage => NO_MESSAGE_RESPONSE,
            ApiError::ServiceUnavailable => MODEL_UNAVAILABLE_RESPONSE,
            ApiError::Generation(_) => GENERATION_FAILED_RESPONSE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(json!({ "response": self.public_message() }));
        (self.status(), body).into_response()
    }
}
