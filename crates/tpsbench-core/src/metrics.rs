//! Throughput metrics: per-request timings, batch totals, and the
//! per-unit record persisted in the checkpoint.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{BenchError, BenchResult};

/// Default hourly serving cost in USD, used for the price column.
pub const DEFAULT_HOURLY_COST: f64 = 5.5;

/// Outcome of a single generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestMetric {
    /// Completion tokens produced by this call.
    pub token_count: u64,
    /// Latency of this call alone.
    pub elapsed: Duration,
}

/// Aggregate over one batch of concurrent calls.
#[derive(Debug, Clone, Copy)]
pub struct BatchTotals {
    /// Requests in flight together.
    pub concurrency: u32,
    /// Tokens summed across every request in the batch.
    pub total_tokens: u64,
    /// Wall-clock span from first dispatch to last completion.
    pub total_duration: Duration,
}

impl BatchTotals {
    /// Aggregate tokens divided by the batch's wall-clock span.
    ///
    /// A zero-length span or a batch that generated no tokens yields no
    /// usable throughput or price figure and is rejected rather than
    /// divided by. A zero throughput would turn the price division into
    /// a non-finite value, which serde_json persists as `null` and can
    /// never read back.
    pub fn combined_tps(&self) -> BenchResult<f64> {
        let secs = self.total_duration.as_secs_f64();
        if secs <= 0.0 {
            return Err(BenchError::ZeroDurationBatch);
        }
        if self.total_tokens == 0 {
            return Err(BenchError::ZeroTokenBatch);
        }
        Ok(self.total_tokens as f64 / secs)
    }
}

/// One completed sweep unit, as persisted in the checkpoint.
///
/// Field names are part of the checkpoint file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Combined throughput divided by the concurrency level.
    pub avg_tps_per_request: f64,
    /// Tokens across the whole batch per wall-clock second.
    pub combined_tps: f64,
    /// Wall-clock batch span in seconds.
    pub total_duration: f64,
    /// Batch span divided by the concurrency level.
    pub avg_time_per_request: f64,
    /// Tokens summed across the batch.
    pub total_tokens: u64,
    /// Serving cost attributed to one million generated tokens.
    pub price_per_1m_tokens: f64,
}

impl RunRecord {
    /// Derive the persisted metrics from batch totals.
    pub fn from_batch(totals: &BatchTotals, hourly_cost: f64) -> BenchResult<Self> {
        let combined_tps = totals.combined_tps()?;
        let n = totals.concurrency as f64;
        let secs = totals.total_duration.as_secs_f64();
        Ok(Self {
            avg_tps_per_request: combined_tps / n,
            combined_tps,
            total_duration: secs,
            avg_time_per_request: secs / n,
            total_tokens: totals.total_tokens,
            price_per_1m_tokens: price_per_1m_tokens(combined_tps, hourly_cost),
        })
    }
}

/// Cost of generating one million tokens at the given aggregate
/// throughput, for an endpoint billed `hourly_cost` USD per hour.
pub fn price_per_1m_tokens(combined_tps: f64, hourly_cost: f64) -> f64 {
    (hourly_cost / 3600.0) / (combined_tps / 1_000_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(concurrency: u32, total_tokens: u64, secs: f64) -> BatchTotals {
        BatchTotals {
            concurrency,
            total_tokens,
            total_duration: Duration::from_secs_f64(secs),
        }
    }

    #[test]
    fn test_combined_tps() {
        let t = totals(4, 2000, 10.0);
        assert!((t.combined_tps().unwrap() - 200.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let t = totals(1, 100, 0.0);
        assert!(matches!(
            t.combined_tps(),
            Err(BenchError::ZeroDurationBatch)
        ));
        assert!(RunRecord::from_batch(&t, DEFAULT_HOURLY_COST).is_err());
    }

    #[test]
    fn test_zero_tokens_are_rejected() {
        let t = totals(4, 0, 10.0);
        let err = t.combined_tps().unwrap_err();
        assert!(matches!(err, BenchError::ZeroTokenBatch));
        // Fails the unit so the sweep halts with its checkpoint intact.
        assert!(err.is_unit_failure());
        assert!(RunRecord::from_batch(&t, DEFAULT_HOURLY_COST).is_err());
    }

    #[test]
    fn test_record_from_batch() {
        let record = RunRecord::from_batch(&totals(4, 2000, 10.0), 5.5).unwrap();
        assert!((record.combined_tps - 200.0).abs() < 0.001);
        assert!((record.avg_tps_per_request - 50.0).abs() < 0.001);
        assert!((record.total_duration - 10.0).abs() < 0.001);
        assert!((record.avg_time_per_request - 2.5).abs() < 0.001);
        assert_eq!(record.total_tokens, 2000);
        // (5.5 / 3600) / (200 / 1_000_000)
        assert!((record.price_per_1m_tokens - 7.638888).abs() < 0.001);
    }

    #[test]
    fn test_price_per_1m_tokens() {
        // 3.6 USD/h is 0.001 USD/s; 1000 TPS is 0.001 M tokens/s.
        assert!((price_per_1m_tokens(1000.0, 3.6) - 1.0).abs() < 1e-9);
    }
}
