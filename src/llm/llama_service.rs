use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tokenizers::Tokenizer;

use super::runtime::{GenerationError, ModelRuntime};
use super::types::GenerationOptions;
use crate::context::TokenId;
use crate::core::config::{AppPaths, ModelConfig};

const HEALTH_RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Model runtime backed by a llama.cpp `llama-server`.
///
/// Tokenization happens in-process with the model's HuggingFace tokenizer so
/// the dialogue history can be kept as token ids; the server only ever sees
/// token-array prompts. The tokenizer must match the vocabulary of the served
/// weights.
pub struct LlamaRuntime {
    name: String,
    tokenizer: Tokenizer,
    eos_token_id: TokenId,
    max_position_embeddings: usize,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tokens: Option<Vec<TokenId>>,
    #[serde(default)]
    stop_type: Option<String>,
    #[serde(default)]
    stopped_eos: bool,
}

impl CompletionResponse {
    fn stopped_on_eos(&self) -> bool {
        self.stopped_eos || self.stop_type.as_deref() == Some("eos")
    }
}

impl LlamaRuntime {
    /// Loads the tokenizer and waits for the model server to report healthy.
    pub async fn connect(config: &ModelConfig, paths: &AppPaths) -> Result<Self, GenerationError> {
        let tokenizer_path = paths.resolve(&config.tokenizer_path);
        tracing::info!("Loading tokenizer from {}", tokenizer_path.display());
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            GenerationError::Tokenizer(format!(
                "failed to load {}: {}",
                tokenizer_path.display(),
                e
            ))
        })?;

        Self::with_tokenizer(tokenizer, config).await
    }

    pub async fn with_tokenizer(
        tokenizer: Tokenizer,
        config: &ModelConfig,
    ) -> Result<Self, GenerationError> {
        let eos_token_id = tokenizer.token_to_id(&config.eos_token).ok_or_else(|| {
            GenerationError::Tokenizer(format!(
                "EOS token {:?} is not in the tokenizer vocabulary",
                config.eos_token
            ))
        })?;

        let client = Client::new();
        let base_url = config.server_url.trim_end_matches('/').to_string();

        wait_for_health(&client, &base_url, config.startup_retries).await?;

        let max_position_embeddings = match fetch_served_context(&client, &base_url).await {
            Some(served) if served < config.max_position_embeddings => {
                tracing::warn!(
                    "llama-server context ({}) is smaller than max_position_embeddings ({}), using the served size",
                    served,
                    config.max_position_embeddings
                );
                served
            }
            _ => config.max_position_embeddings,
        };

        tracing::info!(
            "Model runtime ready: {} via {} (context {}, eos {})",
            config.name,
            base_url,
            max_position_embeddings,
            eos_token_id
        );

        Ok(Self {
            name: config.name.clone(),
            tokenizer,
            eos_token_id,
            max_position_embeddings,
            base_url,
            client,
        })
    }

    fn completion_body(&self, input: &[TokenId], options: &GenerationOptions) -> Value {
        // llama-server has no n-gram blocking and returns a single sequence;
        // no_repeat_ngram_size and pad_token_id have nothing to map to.
        json!({
            "prompt": input,
            "n_predict": options.max_new_tokens,
            "temperature": options.effective_temperature(),
            "top_k": options.top_k,
            "stream": false,
            "return_tokens": true,
        })
    }
}

#[async_trait]
impl ModelRuntime for LlamaRuntime {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_position_embeddings(&self) -> usize {
        self.max_position_embeddings
    }

    fn eos_token_id(&self) -> TokenId {
        self.eos_token_id
    }

    fn encode(&self, text: &str, append_eos: bool) -> Result<Vec<TokenId>, GenerationError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| GenerationError::Tokenizer(e.to_string()))?;
        let mut ids = encoding.get_ids().to_vec();
        if append_eos {
            ids.push(self.eos_token_id);
        }
        Ok(ids)
    }

    async fn generate(
        &self,
        input: &[TokenId],
        options: &GenerationOptions,
    ) -> Result<Vec<TokenId>, GenerationError> {
        let url = format!("{}/completion", self.base_url);
        let body = self.completion_body(input, options);

        let res = self.client.post(&url).json(&body).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(GenerationError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let data: CompletionResponse = res
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let stopped_on_eos = data.stopped_on_eos();
        let mut reply = match data.tokens {
            Some(tokens) => tokens,
            None => self.encode(&data.content, false)?,
        };
        if stopped_on_eos && reply.last() != Some(&self.eos_token_id) {
            reply.push(self.eos_token_id);
        }

        let mut generated = Vec::with_capacity(input.len() + reply.len());
        generated.extend_from_slice(input);
        generated.extend_from_slice(&reply);
        Ok(generated)
    }

    fn decode(
        &self,
        tokens: &[TokenId],
        skip_special_tokens: bool,
    ) -> Result<String, GenerationError> {
        self.tokenizer
            .decode(tokens, skip_special_tokens)
            .map_err(|e| GenerationError::Tokenizer(e.to_string()))
    }
}

async fn wait_for_health(
    client: &Client,
    base_url: &str,
    retries: u32,
) -> Result<(), GenerationError> {
    let url = format!("{}/health", base_url);
    let attempts = retries.max(1);
    for attempt in 1..=attempts {
        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => return Ok(()),
            Ok(res) => tracing::debug!(
                "llama-server not ready ({}), attempt {}/{}",
                res.status(),
                attempt,
                attempts
            ),
            Err(e) => tracing::debug!(
                "llama-server unreachable ({}), attempt {}/{}",
                e,
                attempt,
                attempts
            ),
        }
        if attempt < attempts {
            tokio::time::sleep(HEALTH_RETRY_INTERVAL).await;
        }
    }
    Err(GenerationError::Runtime(format!(
        "timed out waiting for llama-server at {}",
        base_url
    )))
}

/// Context size the server was started with, if it reports one.
async fn fetch_served_context(client: &Client, base_url: &str) -> Option<usize> {
    let url = format!("{}/props", base_url);
    let res = client.get(&url).send().await.ok()?;
    if !res.status().is_success() {
        return None;
    }
    let props: Value = res.json().await.ok()?;
    props
        .get("default_generation_settings")
        .and_then(|settings| settings.get("n_ctx"))
        .and_then(Value::as_u64)
        .filter(|n_ctx| *n_ctx > 0)
        .map(|n_ctx| n_ctx as usize)
}
