//! Per-level summary rows and CSV emission.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::checkpoint::Checkpoint;
use crate::error::{BenchError, BenchResult};

/// Summary file name inside a run folder.
pub const SUMMARY_FILE: &str = "experiment_results.csv";

/// CSV column headers, in output order.
pub const SUMMARY_HEADER: [&str; 7] = [
    "Parallel Requests",
    "Avg TPS per Request",
    "Combined TPS",
    "Total Duration",
    "Avg Time per Request",
    "Total Tokens",
    "Price per 1M Tokens",
];

/// Arithmetic means across the repeats recorded at one concurrency level.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub concurrency: u32,
    pub avg_tps_per_request: f64,
    pub combined_tps: f64,
    pub total_duration: f64,
    pub avg_time_per_request: f64,
    pub total_tokens: f64,
    pub price_per_1m_tokens: f64,
}

impl SummaryRow {
    /// Formatted cells matching the CSV layout: two decimal places
    /// everywhere, four for the price column.
    pub fn cells(&self) -> [String; 7] {
        [
            self.concurrency.to_string(),
            format!("{:.2}", self.avg_tps_per_request),
            format!("{:.2}", self.combined_tps),
            format!("{:.2}", self.total_duration),
            format!("{:.2}", self.avg_time_per_request),
            format!("{:.2}", self.total_tokens),
            format!("{:.4}", self.price_per_1m_tokens),
        ]
    }
}

/// Average each metric across the repeats recorded per level, one row per
/// level in ascending concurrency order.
pub fn summarize(checkpoint: &Checkpoint) -> Vec<SummaryRow> {
    checkpoint
        .results
        .iter()
        .filter(|(_, runs)| !runs.is_empty())
        .map(|(&concurrency, runs)| {
            let n = runs.len() as f64;
            SummaryRow {
                concurrency,
                avg_tps_per_request: runs.iter().map(|r| r.avg_tps_per_request).sum::<f64>() / n,
                combined_tps: runs.iter().map(|r| r.combined_tps).sum::<f64>() / n,
                total_duration: runs.iter().map(|r| r.total_duration).sum::<f64>() / n,
                avg_time_per_request: runs.iter().map(|r| r.avg_time_per_request).sum::<f64>() / n,
                total_tokens: runs.iter().map(|r| r.total_tokens as f64).sum::<f64>() / n,
                price_per_1m_tokens: runs.iter().map(|r| r.price_per_1m_tokens).sum::<f64>() / n,
            }
        })
        .collect()
}

/// Write `rows` to `experiment_results.csv` inside `run_folder`.
pub fn write_summary_csv(run_folder: &Path, rows: &[SummaryRow]) -> BenchResult<PathBuf> {
    let path = run_folder.join(SUMMARY_FILE);
    let mut writer =
        csv::Writer::from_path(&path).map_err(|e| BenchError::Csv(e.to_string()))?;

    writer
        .write_record(SUMMARY_HEADER)
        .map_err(|e| BenchError::Csv(e.to_string()))?;
    for row in rows {
        writer
            .write_record(row.cells())
            .map_err(|e| BenchError::Csv(e.to_string()))?;
    }
    writer.flush().map_err(|e| BenchError::Csv(e.to_string()))?;

    info!(path = %path.display(), rows = rows.len(), "summary written");
    Ok(path)
}
