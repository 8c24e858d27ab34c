use async_trait::async_trait;
use thiserror::Error;

use super::types::GenerationOptions;
use crate::context::TokenId;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("model server request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model server returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("invalid model server response: {0}")]
    InvalidResponse(String),

    #[error("model runtime error: {0}")]
    Runtime(String),

    #[error(
        "context window of {max_context} tokens leaves no room for input \
         after reserving {reserved} for generation"
    )]
    ContextTooSmall { max_context: usize, reserved: usize },
}

/// A loaded causal language model together with its tokenizer.
///
/// Implementations are built once at startup and shared read-only between
/// requests.
#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// model name reported to clients
    fn name(&self) -> &str;

    /// number of positions the model can attend to
    fn max_position_embeddings(&self) -> usize;

    /// end-of-turn marker, also used for padding
    fn eos_token_id(&self) -> TokenId;

    /// tokenize `text`, optionally terminating it with the EOS token
    fn encode(&self, text: &str, append_eos: bool) -> Result<Vec<TokenId>, GenerationError>;

    /// continue `input`; the returned sequence starts with `input` itself
    async fn generate(
        &self,
        input: &[TokenId],
        options: &GenerationOptions,
    ) -> Result<Vec<TokenId>, GenerationError>;

    /// turn tokens back into text
    fn decode(&self, tokens: &[TokenId], skip_special_tokens: bool)
        -> Result<String, GenerationError>;
}
