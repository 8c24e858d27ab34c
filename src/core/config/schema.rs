//! Typed configuration, deserialized from `config.yml`.
//!
//! Every section and field is optional in the file; anything omitted falls
//! back to the values in [`super::defaults`].

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::host")]
    pub host: String,
    #[serde(default = "defaults::port")]
    pub port: u16,
    /// Empty means any origin may call the API (without credentials).
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }
}

// ---------------------------------------------------------------------------
// Model runtime
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Display name reported by `/api/status`.
    #[serde(default = "defaults::model_name")]
    pub name: String,
    /// HuggingFace `tokenizer.json` for the served model.
    #[serde(default = "defaults::tokenizer_path")]
    pub tokenizer_path: String,
    /// Base URL of the llama-server instance doing generation.
    #[serde(default = "defaults::model_server_url")]
    pub server_url: String,
    /// End-of-turn marker appended to every user message.
    #[serde(default = "defaults::eos_token")]
    pub eos_token: String,
    #[serde(default = "defaults::max_position_embeddings")]
    pub max_position_embeddings: usize,
    /// Health probes (500ms apart) before the model is declared unavailable.
    #[serde(default = "defaults::startup_retries")]
    pub startup_retries: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: defaults::model_name(),
            tokenizer_path: defaults::tokenizer_path(),
            server_url: defaults::model_server_url(),
            eos_token: defaults::eos_token(),
            max_position_embeddings: defaults::max_position_embeddings(),
            startup_retries: defaults::startup_retries(),
        }
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Reply length cap, also the budget reserved out of the context window.
    #[serde(default = "defaults::max_new_tokens")]
    pub max_new_tokens: usize,
    #[serde(default = "defaults::num_return_sequences")]
    pub num_return_sequences: u32,
    #[serde(default = "defaults::no_repeat_ngram_size")]
    pub no_repeat_ngram_size: u32,
    #[serde(default = "defaults::do_sample")]
    pub do_sample: bool,
    #[serde(default = "defaults::top_k")]
    pub top_k: u32,
    #[serde(default = "defaults::temperature")]
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: defaults::max_new_tokens(),
            num_return_sequences: defaults::num_return_sequences(),
            no_repeat_ngram_size: defaults::no_repeat_ngram_size(),
            do_sample: defaults::do_sample(),
            top_k: defaults::top_k(),
            temperature: defaults::temperature(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "defaults::cookie_name")]
    pub cookie_name: String,
    /// Idle time after which a session is forgotten. 0 disables expiry.
    #[serde(default = "defaults::idle_ttl_secs")]
    pub idle_ttl_secs: u64,
    #[serde(default = "defaults::sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: defaults::cookie_name(),
            idle_ttl_secs: defaults::idle_ttl_secs(),
            sweep_interval_secs: defaults::sweep_interval_secs(),
        }
    }
}

impl SessionConfig {
    pub fn idle_ttl(&self) -> Option<Duration> {
        (self.idle_ttl_secs > 0).then(|| Duration::from_secs(self.idle_ttl_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write a daily-rolling log file under the data directory.
    #[serde(default = "defaults::enabled")]
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: defaults::enabled(),
        }
    }
}
