use serde::{Deserialize, Serialize};

use crate::context::TokenId;
use crate::core::config::GenerationConfig;

/// Sampling parameters for one `generate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_new_tokens: usize,
    pub num_return_sequences: u32,
    pub pad_token_id: TokenId,
    pub no_repeat_ngram_size: u32,
    pub do_sample: bool,
    pub top_k: u32,
    pub temperature: f32,
}

impl GenerationOptions {
    /// Builds options from config, padding with the model's EOS token.
    pub fn from_config(config: &GenerationConfig, pad_token_id: TokenId) -> Self {
        Self {
            max_new_tokens: config.max_new_tokens,
            num_return_sequences: config.num_return_sequences,
            pad_token_id,
            no_repeat_ngram_size: config.no_repeat_ngram_size,
            do_sample: config.do_sample,
            top_k: config.top_k,
            temperature: config.temperature,
        }
    }

    /// Temperature actually sent to the sampler; greedy decoding is temperature 0.
    pub fn effective_temperature(&self) -> f32 {
        if self.do_sample {
            self.temperature
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_copies_sampling_parameters() {
        let options = GenerationOptions::from_config(&GenerationConfig::default(), 50256);

        assert_eq!(options.max_new_tokens, 60);
        assert_eq!(options.num_return_sequences, 1);
        assert_eq!(options.pad_token_id, 50256);
        assert_eq!(options.no_repeat_ngram_size, 3);
        assert_eq!(options.top_k, 50);
        assert_eq!(options.effective_temperature(), 0.7);
    }

    #[test]
    fn greedy_decoding_zeroes_temperature() {
        let config = GenerationConfig {
            do_sample: false,
            ..GenerationConfig::default()
        };
        let options = GenerationOptions::from_config(&config, 0);

        assert_eq!(options.effective_temperature(), 0.0);
    }
}
