//! Context Window Manager.
//!
//! Keeps a dialogue inside the model's context window by:
//! - Appending the new turn to the stored token history
//! - Dropping the oldest tokens when the reply budget would not fit
//! - Slicing the model output down to the freshly generated tokens
//! - Turning decoded reply text into something displayable

use serde::{Deserialize, Serialize};

/// Token identifier as produced by the tokenizer.
pub type TokenId = u32;

/// Shown when the model produces nothing usable.
pub const FALLBACK_REPLY: &str = "I'm not sure how to respond to that.";

/// Configuration for context window management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindowConfig {
    /// Maximum positions the model can attend to
    pub max_context: usize,
    /// Tokens held back for the model's reply
    pub reserved_budget: usize,
}

/// Context window manager for token-level dialogue history.
#[derive(Debug, Clone)]
pub struct ContextWindowManager {
    config: ContextWindowConfig,
}

impl ContextWindowManager {
    pub fn new(config: ContextWindowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContextWindowConfig {
        &self.config
    }

    /// Largest input the model may be handed.
    pub fn input_limit(&self) -> usize {
        self.config
            .max_context
            .saturating_sub(self.config.reserved_budget)
    }

    pub fn build_input(&self, history: &[TokenId], new_message: &[TokenId]) -> Vec<TokenId> {
        build_input(
            history,
            new_message,
            self.config.max_context,
            self.config.reserved_budget,
        )
    }
}

/// Concatenates `history` and `new_message`, then drops tokens from the front
/// until the result leaves `reserved_budget` positions free in `max_context`.
///
/// The newest tokens always survive. A single message longer than the limit
/// loses its own beginning.
pub fn build_input(
    history: &[TokenId],
    new_message: &[TokenId],
    max_context: usize,
    reserved_budget: usize,
) -> Vec<TokenId> {
    let limit = max_context.saturating_sub(reserved_budget);
    let combined_len = history.len() + new_message.len();

    if combined_len + reserved_budget <= max_context {
        let mut combined = Vec::with_capacity(combined_len);
        combined.extend_from_slice(history);
        combined.extend_from_slice(new_message);
        return combined;
    }

    let overflow = combined_len - limit;
    let mut combined = Vec::with_capacity(limit);
    if overflow < history.len() {
        combined.extend_from_slice(&history[overflow..]);
        combined.extend_from_slice(new_message);
    } else {
        combined.extend_from_slice(&new_message[overflow - history.len()..]);
    }
    combined
}

/// Tokens the model produced past the input boundary.
pub fn extract_reply(generated: &[TokenId], input_length: usize) -> Vec<TokenId> {
    generated
        .get(input_length..)
        .map(<[TokenId]>::to_vec)
        .unwrap_or_default()
}

/// Normalizes decoded reply text for display.
///
/// Replies with fewer than two words are replaced by [`FALLBACK_REPLY`];
/// anything else gets a trailing period unless it already ends a sentence.
pub fn postprocess(text: &str) -> String {
    if text.split_whitespace().count() < 2 {
        return FALLBACK_REPLY.to_string();
    }
    if text.ends_with(['.', '?', '!']) {
        return text.to_string();
    }
    format!("{}.", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(range: std::ops::Range<u32>) -> Vec<TokenId> {
        range.collect()
    }

    #[test]
    fn build_input_concatenates_when_it_fits() {
        let history = vec![1, 2, 3];
        let message = vec![4, 5, 0];

        let input = build_input(&history, &message, 20, 10);

        assert_eq!(input, vec![1, 2, 3, 4, 5, 0]);
    }

    #[test]
    fn build_input_exactly_at_limit_is_untouched() {
        let history = seq(0..6);
        let message = seq(6..10);

        let input = build_input(&history, &message, 15, 5);

        assert_eq!(input, seq(0..10));
    }

    #[test]
    fn build_input_drops_oldest_history_first() {
        let history = seq(0..10);
        let message = seq(10..14);

        let input = build_input(&history, &message, 12, 4);

        assert_eq!(input.len(), 8);
        assert_eq!(input, seq(6..14));
    }

    #[test]
    fn build_input_truncates_the_current_turn_when_it_alone_overflows() {
        let history = seq(0..5);
        let message = seq(100..120);

        let input = build_input(&history, &message, 16, 6);

        assert_eq!(input, seq(110..120));
    }

    #[test]
    fn build_input_with_empty_history() {
        let input = build_input(&[], &[7, 8, 0], 1024, 60);

        assert_eq!(input, vec![7, 8, 0]);
    }

    #[test]
    fn build_input_never_exceeds_limit_and_keeps_suffix() {
        for history_len in 0..40u32 {
            for message_len in 1..20u32 {
                let history = seq(0..history_len);
                let message = seq(1000..1000 + message_len);
                let mut combined = history.clone();
                combined.extend_from_slice(&message);

                let input = build_input(&history, &message, 32, 8);

                assert!(input.len() <= 24);
                assert!(combined.ends_with(&input));
                let keep = combined.len().min(24);
                assert_eq!(input.len(), keep);
            }
        }
    }

    #[test]
    fn build_input_saturates_when_budget_swallows_context() {
        let input = build_input(&[1, 2], &[3, 0], 10, 10);

        assert!(input.is_empty());
    }

    #[test]
    fn manager_reports_input_limit() {
        let manager = ContextWindowManager::new(ContextWindowConfig {
            max_context: 1024,
            reserved_budget: 60,
        });

        assert_eq!(manager.input_limit(), 964);
        assert_eq!(manager.build_input(&[1], &[2, 0]), vec![1, 2, 0]);
    }

    #[test]
    fn extract_reply_recovers_generated_suffix() {
        let input = vec![5, 6, 7, 0];
        let reply = vec![40, 41, 0];
        let mut generated = input.clone();
        generated.extend_from_slice(&reply);

        assert_eq!(extract_reply(&generated, input.len()), reply);
    }

    #[test]
    fn extract_reply_of_short_output_is_empty() {
        assert!(extract_reply(&[1, 2, 3], 3).is_empty());
        assert!(extract_reply(&[1, 2], 5).is_empty());
    }

    #[test]
    fn postprocess_falls_back_on_empty_or_single_word() {
        assert_eq!(postprocess(""), FALLBACK_REPLY);
        assert_eq!(postprocess("   \n\t"), FALLBACK_REPLY);
        assert_eq!(postprocess("Hmm"), FALLBACK_REPLY);
    }

    #[test]
    fn postprocess_appends_period() {
        assert_eq!(postprocess("ok go"), "ok go.");
    }

    #[test]
    fn postprocess_keeps_terminal_punctuation() {
        assert_eq!(postprocess("Already punctuated!"), "Already punctuated!");
        assert_eq!(postprocess("How are you?"), "How are you?");
        assert_eq!(postprocess("I am fine."), "I am fine.");
    }
}
