//! The resumable sweep driver.
//!
//! A sweep executes one measured unit per `(run_index, concurrency)`
//! pair, outer loop over run index, inner loop over ascending power-of-two
//! concurrency levels. After every successful unit the checkpoint is
//! persisted, so an interrupted or failed sweep resumes by re-running the
//! same command against the same run folder.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::GenerationBackend;
use crate::checkpoint::{CheckpointStore, ExperimentKey};
use crate::error::{BenchError, BenchResult};
use crate::metrics::{DEFAULT_HOURLY_COST, RunRecord};
use crate::runner;
use crate::summary::{self, SummaryRow};
use crate::tokens::TokenCounter;

/// Hard ceiling on in-flight requests accepted by the serving APIs.
pub const MAX_PARALLEL_REQUESTS: u32 = 256;

/// Largest exponent whose 2^E stays within [`MAX_PARALLEL_REQUESTS`].
pub const MAX_EXPONENT: u32 = 8;

/// Sweep parameters.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Levels swept are 2^0 ..= 2^max_exponent.
    pub max_exponent: u32,
    /// Repeats per level.
    pub num_runs: u32,
    /// Run folder holding the checkpoint and summary. Reusing a folder
    /// resumes its sweep.
    pub run_folder: PathBuf,
    /// Prompt issued by every measured request.
    pub prompt: String,
    /// Hourly serving cost in USD, for the price column.
    pub hourly_cost: f64,
}

impl SweepConfig {
    /// Validate before any backend call is made.
    pub fn validate(&self) -> BenchResult<()> {
        if self.max_exponent > MAX_EXPONENT {
            return Err(BenchError::Config(format!(
                "2^{} parallel requests exceeds the API limit of {MAX_PARALLEL_REQUESTS}; \
                 choose a max exponent of {MAX_EXPONENT} or less",
                self.max_exponent
            )));
        }
        if self.num_runs == 0 {
            return Err(BenchError::Config(
                "number of runs must be at least 1".to_string(),
            ));
        }
        if !self.hourly_cost.is_finite() || self.hourly_cost < 0.0 {
            return Err(BenchError::Config(
                "hourly cost must be a finite, non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    /// Concurrency levels in sweep order.
    pub fn levels(&self) -> Vec<u32> {
        (0..=self.max_exponent).map(|e| 2u32.pow(e)).collect()
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_exponent: 2,
            num_runs: 1,
            run_folder: PathBuf::from("run"),
            prompt: String::new(),
            hourly_cost: DEFAULT_HOURLY_COST,
        }
    }
}

/// Progress notifications emitted while a sweep executes.
///
/// `position` and `total` are 1-based within one run's level list.
#[derive(Debug, Clone)]
pub enum SweepEvent {
    /// The warm-up request is being issued.
    WarmUpStarted,
    /// Warm-up finished; measurements begin.
    WarmUpFinished,
    /// A unit found in the checkpoint was skipped.
    UnitSkipped { key: ExperimentKey },
    /// A unit is about to execute.
    UnitStarted {
        key: ExperimentKey,
        position: usize,
        total: usize,
    },
    /// A unit finished and its record was checkpointed.
    UnitCompleted {
        key: ExperimentKey,
        position: usize,
        total: usize,
        record: RunRecord,
    },
}

/// Terminal state of one sweep invocation.
#[derive(Debug)]
pub enum SweepOutcome {
    /// Every unit is complete and the summary CSV was written; rows are in
    /// ascending concurrency order.
    Completed { rows: Vec<SummaryRow> },
    /// A unit failed. The checkpoint holds everything completed strictly
    /// before it; no summary was written.
    Halted { key: ExperimentKey, error: BenchError },
}

/// Runs a sweep: load checkpoint, warm up, execute the remaining units in
/// order, checkpoint after each, halt on the first unit failure.
pub struct SweepDriver {
    config: SweepConfig,
    backend: Arc<dyn GenerationBackend>,
    tokenizer: Arc<dyn TokenCounter>,
    store: CheckpointStore,
}

impl SweepDriver {
    /// Validate the configuration and open the run folder.
    pub fn new(
        config: SweepConfig,
        backend: Arc<dyn GenerationBackend>,
        tokenizer: Arc<dyn TokenCounter>,
    ) -> BenchResult<Self> {
        config.validate()?;
        let store = CheckpointStore::new(&config.run_folder)?;
        Ok(Self {
            config,
            backend,
            tokenizer,
            store,
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Execute the sweep, reporting progress through `observe`.
    ///
    /// Unit failures come back as [`SweepOutcome::Halted`]; checkpoint
    /// I/O failures and a failed warm-up are returned as errors since the
    /// sweep cannot meaningfully continue or resume past them.
    pub async fn run(&self, mut observe: impl FnMut(SweepEvent)) -> BenchResult<SweepOutcome> {
        let levels = self.config.levels();
        let mut checkpoint = self.store.load()?;

        if checkpoint.completed_count() > 0 {
            info!(
                completed = checkpoint.completed_count(),
                "resuming from existing checkpoint"
            );
        }

        observe(SweepEvent::WarmUpStarted);
        runner::warm_up(self.backend.as_ref()).await?;
        observe(SweepEvent::WarmUpFinished);

        info!(
            levels = levels.len(),
            runs = self.config.num_runs,
            backend = self.backend.name(),
            "starting sweep"
        );

        for run_index in 0..self.config.num_runs {
            for (position, &concurrency) in levels.iter().enumerate() {
                let key = ExperimentKey::new(run_index, concurrency);
                let position = position + 1;

                if checkpoint.is_completed(&key) {
                    info!(%key, "skipping completed unit");
                    observe(SweepEvent::UnitSkipped { key });
                    continue;
                }

                observe(SweepEvent::UnitStarted {
                    key,
                    position,
                    total: levels.len(),
                });

                let record = match self.execute_unit(concurrency).await {
                    Ok(record) => record,
                    Err(error) if error.is_unit_failure() => {
                        warn!(%key, %error, "unit failed; halting sweep");
                        return Ok(SweepOutcome::Halted { key, error });
                    }
                    Err(error) => return Err(error),
                };

                checkpoint.record(key, record.clone());
                self.store.save(&checkpoint)?;

                observe(SweepEvent::UnitCompleted {
                    key,
                    position,
                    total: levels.len(),
                    record,
                });
            }
        }

        let rows = summary::summarize(&checkpoint);
        summary::write_summary_csv(self.store.dir(), &rows)?;
        Ok(SweepOutcome::Completed { rows })
    }

    async fn execute_unit(&self, concurrency: u32) -> BenchResult<RunRecord> {
        let totals = runner::run_parallel_requests(
            self.backend.as_ref(),
            self.tokenizer.as_ref(),
            &self.config.prompt,
            concurrency,
        )
        .await?;
        RunRecord::from_batch(&totals, self.config.hourly_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_the_cap() {
        let config = SweepConfig {
            max_exponent: MAX_EXPONENT,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_over_cap() {
        let config = SweepConfig {
            max_exponent: 9,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds the API limit of 256"));
    }

    #[test]
    fn test_validate_rejects_zero_runs() {
        let config = SweepConfig {
            num_runs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_hourly_cost() {
        let config = SweepConfig {
            hourly_cost: f64::INFINITY,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SweepConfig {
            hourly_cost: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_levels_are_powers_of_two() {
        let config = SweepConfig {
            max_exponent: 3,
            ..Default::default()
        };
        assert_eq!(config.levels(), vec![1, 2, 4, 8]);
    }
}
