//! Concurrent fan-out of generation requests.
//!
//! One batch issues the same prompt N times with all N requests in flight
//! together, then aggregates tokens and the wall-clock span of the whole
//! batch. A single failed request fails the batch; retries are the
//! caller's decision.

use std::time::Instant;

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::backend::GenerationBackend;
use crate::error::{BenchError, BenchResult};
use crate::metrics::{BatchTotals, RequestMetric};
use crate::tokens::TokenCounter;

/// Prompt used for the discarded warm-up request.
pub const WARM_UP_PROMPT: &str = "This is a warm-up call.";

/// Issue `prompt` to the backend `concurrency` times, all in flight at
/// once, and wait for every request to finish.
///
/// The returned totals carry the wall-clock span from first dispatch to
/// last completion, not the sum of individual latencies.
pub async fn run_parallel_requests(
    backend: &dyn GenerationBackend,
    tokenizer: &dyn TokenCounter,
    prompt: &str,
    concurrency: u32,
) -> BenchResult<BatchTotals> {
    if concurrency == 0 {
        return Err(BenchError::Config(
            "concurrency must be at least 1".to_string(),
        ));
    }

    let started = Instant::now();
    let requests: Vec<_> = (0..concurrency)
        .map(|_| run_single_request(backend, tokenizer, prompt))
        .collect();
    let metrics = try_join_all(requests).await?;
    let total_duration = started.elapsed();

    let total_tokens = metrics.iter().map(|m| m.token_count).sum();

    debug!(
        concurrency,
        total_tokens,
        secs = total_duration.as_secs_f64(),
        "batch complete"
    );

    Ok(BatchTotals {
        concurrency,
        total_tokens,
        total_duration,
    })
}

/// Issue a single discarded request so cold-start latency is not billed
/// to the first measured batch.
pub async fn warm_up(backend: &dyn GenerationBackend) -> BenchResult<()> {
    info!(backend = backend.name(), "performing warm-up call");
    backend.generate(WARM_UP_PROMPT).await?;
    info!("warm-up call completed");
    Ok(())
}

async fn run_single_request(
    backend: &dyn GenerationBackend,
    tokenizer: &dyn TokenCounter,
    prompt: &str,
) -> BenchResult<RequestMetric> {
    let started = Instant::now();
    let generation = backend.generate(prompt).await?;
    let elapsed = started.elapsed();

    let token_count = match generation.completion_tokens {
        Some(count) => count,
        None => tokenizer.count(&generation.text) as u64,
    };

    Ok(RequestMetric {
        token_count,
        elapsed,
    })
}
