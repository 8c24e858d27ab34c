//! Per-client conversation state.
//!
//! The store keeps each session's state serialized, the way a framework
//! session would; [`SessionState`] is decoded and re-encoded at the request
//! boundary.

pub mod cookie;
pub mod store;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::TokenId;

pub use cookie::{build_session_cookie, expired_session_cookie, session_id_from_headers};
pub use store::SessionStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to decode session state: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode session state: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(rename = "chat_history_ids", default)]
    pub history: Vec<TokenId>,
}

impl SessionState {
    pub fn from_json(raw: &str) -> Result<Self, SessionError> {
        serde_json::from_str(raw).map_err(SessionError::Decode)
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string(self).map_err(SessionError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_history_as_plain_id_list() {
        let state = SessionState {
            history: vec![15496, 50256, 17250],
        };

        assert_eq!(
            state.to_json().unwrap(),
            r#"{"chat_history_ids":[15496,50256,17250]}"#
        );
        assert_eq!(SessionState::from_json(&state.to_json().unwrap()).unwrap(), state);
    }

    #[test]
    fn missing_history_decodes_as_empty() {
        let state = SessionState::from_json("{}").unwrap();

        assert!(state.history.is_empty());
    }

    #[test]
    fn rejects_non_integer_history() {
        let err = SessionState::from_json(r#"{"chat_history_ids":["a"]}"#).unwrap_err();

        assert!(matches!(err, SessionError::Decode(_)));
    }
}
