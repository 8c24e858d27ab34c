//! Default values for every configuration field.
//!
//! The generation defaults reproduce the sampling setup DialoGPT-small is
//! usually served with: a 60 token reply budget, top-k 50 at temperature 0.7.

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5001;

pub const DEFAULT_MODEL_NAME: &str = "microsoft/DialoGPT-small";
pub const DEFAULT_TOKENIZER_PATH: &str = "models/DialoGPT-small/tokenizer.json";
pub const DEFAULT_MODEL_SERVER_URL: &str = "http://127.0.0.1:8088";
pub const DEFAULT_EOS_TOKEN: &str = "<|endoftext|>";
/// Position capacity of the GPT-2 family, DialoGPT included.
pub const DEFAULT_MAX_POSITION_EMBEDDINGS: usize = 1024;
pub const DEFAULT_STARTUP_RETRIES: u32 = 30;

pub const DEFAULT_MAX_NEW_TOKENS: usize = 60;
pub const DEFAULT_NUM_RETURN_SEQUENCES: u32 = 1;
pub const DEFAULT_NO_REPEAT_NGRAM_SIZE: u32 = 3;
pub const DEFAULT_DO_SAMPLE: bool = true;
pub const DEFAULT_TOP_K: u32 = 50;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const DEFAULT_COOKIE_NAME: &str = "chat_session";
pub const DEFAULT_IDLE_TTL_SECS: u64 = 3600;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

pub fn host() -> String {
    DEFAULT_HOST.to_string()
}

pub fn port() -> u16 {
    DEFAULT_PORT
}

pub fn model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

pub fn tokenizer_path() -> String {
    DEFAULT_TOKENIZER_PATH.to_string()
}

pub fn model_server_url() -> String {
    DEFAULT_MODEL_SERVER_URL.to_string()
}

pub fn eos_token() -> String {
    DEFAULT_EOS_TOKEN.to_string()
}

pub fn max_position_embeddings() -> usize {
    DEFAULT_MAX_POSITION_EMBEDDINGS
}

pub fn startup_retries() -> u32 {
    DEFAULT_STARTUP_RETRIES
}

pub fn max_new_tokens() -> usize {
    DEFAULT_MAX_NEW_TOKENS
}

pub fn num_return_sequences() -> u32 {
    DEFAULT_NUM_RETURN_SEQUENCES
}

pub fn no_repeat_ngram_size() -> u32 {
    DEFAULT_NO_REPEAT_NGRAM_SIZE
}

pub fn do_sample() -> bool {
    DEFAULT_DO_SAMPLE
}

pub fn top_k() -> u32 {
    DEFAULT_TOP_K
}

pub fn temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

pub fn cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

pub fn idle_ttl_secs() -> u64 {
    DEFAULT_IDLE_TTL_SECS
}

pub fn sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}

pub fn enabled() -> bool {
    true
}
