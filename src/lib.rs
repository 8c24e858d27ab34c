//! Session-aware HTTP chat backend for a pretrained conversational model.

pub mod context;
pub mod core;
pub mod llm;
pub mod server;
pub mod session;
pub mod state;
