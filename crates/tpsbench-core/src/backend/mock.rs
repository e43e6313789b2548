//! Deterministic mock backend for tests and offline dry runs.
//!
//! No network, no cost, fully reproducible. Latency and failures are
//! injected through configuration.

use super::{Generation, GenerationBackend};
use crate::error::{BenchError, BenchResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Configuration for [`MockBackend`].
#[derive(Debug, Clone)]
pub struct MockBackendConfig {
    /// Fixed response text.
    pub response_text: String,
    /// Completion tokens reported per response; `None` exercises the
    /// fallback tokenizer path.
    pub completion_tokens: Option<u64>,
    /// Artificial latency per request.
    pub latency: Option<Duration>,
    /// Calls up to and including this count succeed; later calls fail.
    /// `None` never fails.
    pub fail_after: Option<u64>,
}

impl Default for MockBackendConfig {
    fn default() -> Self {
        Self {
            response_text: "This is a mock generation used for throughput tests.".into(),
            completion_tokens: Some(25),
            latency: None,
            fail_after: None,
        }
    }
}

/// A deterministic generation backend.
#[derive(Debug)]
pub struct MockBackend {
    config: MockBackendConfig,
    calls: AtomicU64,
}

impl MockBackend {
    pub fn new(config: MockBackendConfig) -> Self {
        Self {
            config,
            calls: AtomicU64::new(0),
        }
    }

    /// Total generate calls served so far, including failed ones.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _prompt: &str) -> BenchResult<Generation> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(limit) = self.config.fail_after {
            if call > limit {
                return Err(BenchError::Api {
                    status: Some(503),
                    message: format!("mock failure injected on call {call}"),
                });
            }
        }

        if let Some(latency) = self.config.latency {
            tokio::time::sleep(latency).await;
        }

        Ok(Generation {
            text: self.config.response_text.clone(),
            completion_tokens: self.config.completion_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_reports_configured_tokens() {
        let backend = MockBackend::new(MockBackendConfig::default());
        let generation = backend.generate("hello").await.unwrap();
        assert!(!generation.text.is_empty());
        assert_eq!(generation.completion_tokens, Some(25));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_fails_after_limit() {
        let backend = MockBackend::new(MockBackendConfig {
            fail_after: Some(2),
            ..Default::default()
        });
        assert!(backend.generate("a").await.is_ok());
        assert!(backend.generate("b").await.is_ok());
        let err = backend.generate("c").await.unwrap_err();
        assert!(err.is_unit_failure());
        assert_eq!(backend.call_count(), 3);
    }
}
