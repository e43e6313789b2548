//! Token counting for backends that do not report usage natively.

use crate::error::{BenchError, BenchResult};

/// Counts tokens in generated text.
///
/// Backends that report completion token counts themselves never go
/// through this; it is the fallback for raw-text endpoints.
pub trait TokenCounter: Send + Sync {
    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize;
}

/// Token counter backed by the cl100k_base BPE encoding.
///
/// The encoding prepends no sequence markers, so the encoded length is
/// used as-is.
pub struct BpeTokenCounter {
    encoder: tiktoken_rs::CoreBPE,
}

impl BpeTokenCounter {
    /// Build a counter using the cl100k_base encoding.
    pub fn cl100k_base() -> BenchResult<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| BenchError::Tokenizer(e.to_string()))?;
        Ok(Self { encoder: bpe })
    }
}

impl TokenCounter for BpeTokenCounter {
    fn count(&self, text: &str) -> usize {
        self.encoder.encode_with_special_tokens(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cl100k_count() {
        let counter = BpeTokenCounter::cl100k_base().unwrap();
        let tokens = counter.count("Hello, world!");
        assert!(tokens >= 3 && tokens <= 5);
    }

    #[test]
    fn test_empty_text_counts_zero() {
        let counter = BpeTokenCounter::cl100k_base().unwrap();
        assert_eq!(counter.count(""), 0);
    }

    #[test]
    fn test_longer_text_counts_more() {
        let counter = BpeTokenCounter::cl100k_base().unwrap();
        let short = counter.count("one two three");
        let long = counter.count("one two three four five six seven eight");
        assert!(long > short);
    }
}
