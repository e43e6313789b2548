//! `tpsbench single` command implementation

use anyhow::bail;
use tpsbench_core::metrics::RunRecord;
use tpsbench_core::runner;
use tpsbench_core::sweep::MAX_PARALLEL_REQUESTS;
use tracing::info;

use crate::cli::SingleArgs;
use crate::commands::{build_backend, build_tokenizer, default_prompt};

/// Execute the `tpsbench single` command: warm up, then one measured batch.
pub async fn run(args: SingleArgs) -> anyhow::Result<()> {
    if args.requests == 0 || args.requests > MAX_PARALLEL_REQUESTS {
        bail!(
            "number of parallel requests must be between 1 and {MAX_PARALLEL_REQUESTS}, got {}",
            args.requests
        );
    }

    let backend = build_backend(args.backend, args.max_output_tokens, args.request_timeout_secs)?;
    let tokenizer = build_tokenizer()?;
    let prompt = args
        .prompt
        .clone()
        .unwrap_or_else(|| default_prompt(args.backend).to_string());
    info!(backend = %args.backend, requests = args.requests, "starting one-shot benchmark");

    println!("Performing warm-up call to the LLM...");
    runner::warm_up(backend.as_ref()).await?;
    println!("Warm-up call completed.");

    println!(
        "Running experiment with {} parallel requests...",
        args.requests
    );
    let totals =
        runner::run_parallel_requests(backend.as_ref(), tokenizer.as_ref(), &prompt, args.requests)
            .await?;
    let record = RunRecord::from_batch(&totals, args.hourly_cost)?;

    println!("Number of tokens: {}", record.total_tokens);
    println!("Time taken: {:.2} seconds", record.total_duration);
    println!("Average TPS per request: {:.2}", record.avg_tps_per_request);
    println!("Combined TPS: {:.2}", record.combined_tps);
    println!(
        "Average time per request: {:.2} seconds",
        record.avg_time_per_request
    );
    println!("Price per 1M tokens: ${:.4}", record.price_per_1m_tokens);

    Ok(())
}
