pub mod window;

pub use window::{
    build_input, extract_reply, postprocess, ContextWindowConfig, ContextWindowManager, TokenId,
    FALLBACK_REPLY,
};
