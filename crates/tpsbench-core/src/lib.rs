//! `tpsbench-core`: concurrent throughput measurement engine for LLM
//! serving backends.
//!
//! Two building blocks make up the crate:
//!
//! | Concern | Entry point |
//! |---------|-------------|
//! | One measured batch of N concurrent requests | [`runner::run_parallel_requests`] |
//! | Resumable sweep over power-of-two concurrency levels | [`sweep::SweepDriver`] |
//!
//! A sweep writes `checkpoint.json` into its run folder after every
//! measured unit, and an `experiment_results.csv` summary once every unit
//! has completed. Re-running against the same folder resumes the sweep,
//! skipping units already in the checkpoint.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tpsbench_core::backend::{MockBackend, MockBackendConfig};
//! use tpsbench_core::sweep::{SweepConfig, SweepDriver};
//! use tpsbench_core::tokens::BpeTokenCounter;
//!
//! #[tokio::main]
//! async fn main() -> tpsbench_core::BenchResult<()> {
//!     let config = SweepConfig {
//!         max_exponent: 2,
//!         num_runs: 1,
//!         run_folder: "run_demo".into(),
//!         prompt: "Tell me a story".into(),
//!         ..Default::default()
//!     };
//!     let backend = Arc::new(MockBackend::new(MockBackendConfig::default()));
//!     let tokenizer = Arc::new(BpeTokenCounter::cl100k_base()?);
//!     let driver = SweepDriver::new(config, backend, tokenizer)?;
//!     let outcome = driver.run(|_| {}).await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

// backend module - generation backends (Gemini, Vertex endpoint, mock)
pub mod backend;

// checkpoint module - resumable sweep state
pub mod checkpoint;

// error module
pub mod error;

// metrics module - TPS and cost arithmetic
pub mod metrics;

// runner module - one concurrent batch
pub mod runner;

// summary module - per-level averaging and CSV output
pub mod summary;

// sweep module - the resumable driver
pub mod sweep;

// tokens module - fallback token counting
pub mod tokens;

pub use error::{BenchError, BenchResult};
pub use metrics::{BatchTotals, RequestMetric, RunRecord};
pub use sweep::{SweepConfig, SweepDriver, SweepEvent, SweepOutcome};
