//! Error taxonomy for the benchmark engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while configuring or running a benchmark.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Invalid CLI or environment configuration. Reported before any
    /// backend call is made.
    #[error("configuration error: {0}")]
    Config(String),
    /// The backend rejected or failed a generation request.
    #[error("API error: {message} (status: {status:?})")]
    Api {
        status: Option<u16>,
        message: String,
    },
    /// A generation request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),
    /// Network-level failure reaching the backend.
    #[error("network error: {0}")]
    Network(String),
    /// Fallback tokenizer could not be constructed or used.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
    /// A batch finished with no measurable wall-clock span, so no
    /// throughput can be derived from it.
    #[error("batch completed with zero measurable duration")]
    ZeroDurationBatch,
    /// A batch finished having generated zero tokens; neither throughput
    /// nor price can be derived from it.
    #[error("batch completed with zero generated tokens")]
    ZeroTokenBatch,
    /// Reading or writing the checkpoint file failed. Fatal: a sweep
    /// without a trustworthy checkpoint cannot be resumed.
    #[error("checkpoint I/O error at {}: {source}", path.display())]
    CheckpointIo {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The checkpoint file exists but does not parse.
    #[error("malformed checkpoint at {}: {source}", path.display())]
    CheckpointFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Writing the summary CSV failed.
    #[error("failed to write summary CSV: {0}")]
    Csv(String),
}

/// Result alias used throughout the crate.
pub type BenchResult<T> = Result<T, BenchError>;

impl BenchError {
    /// Classify a reqwest failure into the timeout/network/API buckets.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            Self::Network(err.to_string())
        } else {
            Self::Api {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }

    /// True for errors that fail one measured unit. The sweep driver halts
    /// and leaves the checkpoint in place for these; everything else
    /// aborts the process.
    pub fn is_unit_failure(&self) -> bool {
        matches!(
            self,
            Self::Api { .. }
                | Self::Timeout(_)
                | Self::Network(_)
                | Self::ZeroDurationBatch
                | Self::ZeroTokenBatch
        )
    }
}
