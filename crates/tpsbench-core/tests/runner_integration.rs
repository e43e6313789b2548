//! Integration tests for the concurrent request runner.
//!
//! All tests drive the runner against the in-process mock backend, so they
//! exercise the real fan-out / join path without any network traffic.

use std::time::Duration;

use tpsbench_core::BenchError;
use tpsbench_core::backend::{GeminiBackend, GeminiConfig, MockBackend, MockBackendConfig};
use tpsbench_core::runner::{run_parallel_requests, warm_up};
use tpsbench_core::tokens::TokenCounter;

/// Counts whitespace-separated words. Deterministic stand-in for the BPE
/// tokenizer in tests that exercise the fallback path.
struct WordCounter;

impl TokenCounter for WordCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

#[tokio::test]
async fn batch_sums_native_token_counts() {
    let backend = MockBackend::new(MockBackendConfig {
        completion_tokens: Some(40),
        ..Default::default()
    });

    let totals = run_parallel_requests(&backend, &WordCounter, "prompt", 8)
        .await
        .unwrap();

    assert_eq!(totals.concurrency, 8);
    assert_eq!(totals.total_tokens, 320);
    assert_eq!(backend.call_count(), 8);
}

#[tokio::test]
async fn batch_duration_is_wall_clock_not_a_sum() {
    let latency = Duration::from_millis(50);
    let backend = MockBackend::new(MockBackendConfig {
        latency: Some(latency),
        ..Default::default()
    });

    let totals = run_parallel_requests(&backend, &WordCounter, "prompt", 8)
        .await
        .unwrap();

    // Eight serialized 50ms calls would take 400ms; requests dispatched
    // together keep the batch span close to a single call.
    assert!(totals.total_duration >= latency);
    assert!(totals.total_duration < latency * 8);
}

#[tokio::test]
async fn fallback_tokenizer_counts_when_backend_reports_none() {
    let backend = MockBackend::new(MockBackendConfig {
        response_text: "alpha beta gamma delta".into(),
        completion_tokens: None,
        ..Default::default()
    });

    let totals = run_parallel_requests(&backend, &WordCounter, "prompt", 2)
        .await
        .unwrap();

    // Two responses of four words each, counted by the fallback.
    assert_eq!(totals.total_tokens, 8);
}

#[tokio::test]
async fn one_failed_request_fails_the_whole_batch() {
    let backend = MockBackend::new(MockBackendConfig {
        fail_after: Some(2),
        ..Default::default()
    });

    let err = run_parallel_requests(&backend, &WordCounter, "prompt", 4)
        .await
        .unwrap_err();

    assert!(err.is_unit_failure());
}

#[tokio::test]
async fn zero_concurrency_is_rejected_before_any_request() {
    let backend = MockBackend::new(MockBackendConfig::default());

    let err = run_parallel_requests(&backend, &WordCounter, "prompt", 0)
        .await
        .unwrap_err();

    assert!(matches!(err, BenchError::Config(_)));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn warm_up_issues_exactly_one_request() {
    let backend = MockBackend::new(MockBackendConfig::default());

    warm_up(&backend).await.unwrap();

    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn timed_out_request_surfaces_as_a_timeout_error() {
    // Accepts TCP connections but never answers them, so a request can
    // only end when the client-side timeout expires.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let backend = GeminiBackend::with_config(
        GeminiConfig::new("key")
            .with_base_url(format!("http://{addr}"))
            .with_timeout(1),
    )
    .unwrap();

    let err = run_parallel_requests(&backend, &WordCounter, "prompt", 2)
        .await
        .unwrap_err();

    assert!(matches!(err, BenchError::Timeout(_)));
    assert!(err.is_unit_failure());
}
