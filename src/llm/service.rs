use std::sync::Arc;

use super::runtime::{GenerationError, ModelRuntime};
use super::types::GenerationOptions;
use crate::context::{self, ContextWindowConfig, ContextWindowManager, TokenId};
use crate::core::config::GenerationConfig;

/// Outcome of one successful dialogue turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    /// Post-processed reply text for display.
    pub response: String,
    /// History to persist: the model input followed by the reply tokens.
    pub history: Vec<TokenId>,
}

/// Runs dialogue turns against a shared model runtime.
#[derive(Clone)]
pub struct DialogueService {
    runtime: Arc<dyn ModelRuntime>,
    window: ContextWindowManager,
    options: GenerationOptions,
}

impl DialogueService {
    /// Fails when the runtime's context cannot hold any input once
    /// `max_new_tokens` is reserved. The served context may be smaller than
    /// the configured one, so this is checked again here.
    pub fn new(
        runtime: Arc<dyn ModelRuntime>,
        generation: &GenerationConfig,
    ) -> Result<Self, GenerationError> {
        let window = ContextWindowManager::new(ContextWindowConfig {
            max_context: runtime.max_position_embeddings(),
            reserved_budget: generation.max_new_tokens,
        });
        if window.input_limit() == 0 {
            return Err(GenerationError::ContextTooSmall {
                max_context: window.config().max_context,
                reserved: window.config().reserved_budget,
            });
        }
        let options = GenerationOptions::from_config(generation, runtime.eos_token_id());
        Ok(Self {
            runtime,
            window,
            options,
        })
    }

    pub fn model_name(&self) -> &str {
        self.runtime.name()
    }

    pub fn window(&self) -> &ContextWindowManager {
        &self.window
    }

    /// Generates a reply to `message` given the prior `history`.
    ///
    /// Nothing is persisted here; the caller stores `Turn::history` only when
    /// this returns `Ok`.
    pub async fn respond(
        &self,
        history: &[TokenId],
        message: &str,
    ) -> Result<Turn, GenerationError> {
        let new_tokens = self.runtime.encode(message, true)?;
        let input = self.window.build_input(history, &new_tokens);
        if input.len() < history.len() + new_tokens.len() {
            tracing::debug!(
                "Dropped {} oldest tokens to fit the context window",
                history.len() + new_tokens.len() - input.len()
            );
        }

        let generated = self.runtime.generate(&input, &self.options).await?;
        let reply = context::extract_reply(&generated, input.len());
        let text = self.runtime.decode(&reply, true)?;

        tracing::debug!(
            "Generated {} tokens from {} input tokens",
            reply.len(),
            input.len()
        );

        Ok(Turn {
            response: context::postprocess(&text),
            history: generated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Echo runtime: one token per byte, replies with a fixed two-token turn.
    struct EchoRuntime {
        max_positions: usize,
        inputs: Mutex<Vec<Vec<TokenId>>>,
    }

    impl EchoRuntime {
        fn new(max_positions: usize) -> Arc<Self> {
            Arc::new(Self {
                max_positions,
                inputs: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelRuntime for EchoRuntime {
        fn name(&self) -> &str {
            "echo"
        }

        fn max_position_embeddings(&self) -> usize {
            self.max_positions
        }

        fn eos_token_id(&self) -> TokenId {
            0
        }

        fn encode(&self, text: &str, append_eos: bool) -> Result<Vec<TokenId>, GenerationError> {
            let mut tokens: Vec<TokenId> = text.bytes().map(TokenId::from).collect();
            if append_eos {
                tokens.push(0);
            }
            Ok(tokens)
        }

        async fn generate(
            &self,
            input: &[TokenId],
            _options: &GenerationOptions,
        ) -> Result<Vec<TokenId>, GenerationError> {
            self.inputs.lock().unwrap().push(input.to_vec());
            let mut generated = input.to_vec();
            generated.extend([b'o' as TokenId, b'k' as TokenId, 0]);
            Ok(generated)
        }

        fn decode(&self, tokens: &[TokenId], _skip: bool) -> Result<String, GenerationError> {
            Ok(tokens
                .iter()
                .filter(|t| **t != 0)
                .map(|t| char::from(*t as u8))
                .collect())
        }
    }

    #[test]
    fn rejects_context_smaller_than_generation_budget() {
        let generation = GenerationConfig::default();

        for max_positions in [48, generation.max_new_tokens] {
            let result = DialogueService::new(EchoRuntime::new(max_positions), &generation);

            match result {
                Err(GenerationError::ContextTooSmall {
                    max_context,
                    reserved,
                }) => {
                    assert_eq!(max_context, max_positions);
                    assert_eq!(reserved, generation.max_new_tokens);
                }
                Err(other) => panic!("unexpected error: {other}"),
                Ok(_) => panic!("context of {max_positions} tokens was accepted"),
            }
        }
    }

    #[tokio::test]
    async fn smallest_usable_context_still_sends_the_message() {
        let generation = GenerationConfig {
            max_new_tokens: 10,
            ..GenerationConfig::default()
        };
        let runtime = EchoRuntime::new(16);
        let service = DialogueService::new(runtime.clone(), &generation).unwrap();

        let turn = service.respond(&[], "Hello").await.unwrap();

        let sent = runtime.inputs.lock().unwrap()[0].clone();
        assert_eq!(sent, b"Hello\0".iter().map(|b| TokenId::from(*b)).collect::<Vec<_>>());
        assert!(turn.history.starts_with(&sent));
    }
}
