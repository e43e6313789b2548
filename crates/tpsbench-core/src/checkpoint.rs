//! Sweep checkpoint persistence.
//!
//! The checkpoint is rewritten after every completed unit using atomic
//! write-then-rename: data is first written to a temporary file in the
//! run folder, `fsync`'d to disk, then atomically renamed to the target
//! path. On POSIX systems, `rename(2)` within the same filesystem is
//! atomic, so the checkpoint is never observable half-written and a crash
//! loses at most the in-flight unit.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{BenchError, BenchResult};
use crate::metrics::RunRecord;

/// Checkpoint file name inside a run folder.
pub const CHECKPOINT_FILE: &str = "checkpoint.json";

/// Identifies one sweep unit: a run index plus a concurrency level.
///
/// The canonical string form `"{run_index}_{concurrency}"` is what the
/// checkpoint stores in `completed_runs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExperimentKey {
    pub run_index: u32,
    pub concurrency: u32,
}

impl ExperimentKey {
    pub fn new(run_index: u32, concurrency: u32) -> Self {
        Self {
            run_index,
            concurrency,
        }
    }
}

impl fmt::Display for ExperimentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.run_index, self.concurrency)
    }
}

/// Persisted sweep state: everything needed to resume after interruption.
///
/// `results` maps each concurrency level to the records completed at that
/// level, in completion order; JSON object keys are the stringified
/// levels. `completed_runs` lists canonical key strings in completion
/// order and is the dedup set consulted on resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub results: BTreeMap<u32, Vec<RunRecord>>,
    pub completed_runs: Vec<String>,
}

impl Checkpoint {
    /// Whether `key` has already been executed.
    pub fn is_completed(&self, key: &ExperimentKey) -> bool {
        let canonical = key.to_string();
        self.completed_runs.iter().any(|k| *k == canonical)
    }

    /// Record a completed unit. Append-only; prior entries are never
    /// rewritten.
    pub fn record(&mut self, key: ExperimentKey, record: RunRecord) {
        self.results.entry(key.concurrency).or_default().push(record);
        self.completed_runs.push(key.to_string());
    }

    pub fn completed_count(&self) -> usize {
        self.completed_runs.len()
    }
}

/// Loads and atomically saves the checkpoint for one run folder.
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Open a store rooted at `dir`, creating the folder if needed.
    pub fn new(dir: impl AsRef<Path>) -> BenchResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| BenchError::CheckpointIo {
            path: dir.clone(),
            source: e,
        })?;
        Ok(Self { dir })
    }

    /// The run folder this store persists into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the checkpoint file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(CHECKPOINT_FILE)
    }

    /// Load the stored checkpoint, or an empty one when none exists yet.
    pub fn load(&self) -> BenchResult<Checkpoint> {
        let path = self.path();
        if !path.exists() {
            return Ok(Checkpoint::default());
        }

        let payload = fs::read(&path).map_err(|e| BenchError::CheckpointIo {
            path: path.clone(),
            source: e,
        })?;
        let checkpoint =
            serde_json::from_slice(&payload).map_err(|e| BenchError::CheckpointFormat {
                path,
                source: e,
            })?;
        Ok(checkpoint)
    }

    /// Persist the checkpoint atomically.
    ///
    /// 1. Serialize to a temporary file in the run folder (ensures same
    ///    filesystem).
    /// 2. `fsync` the temp file so bytes are durable on disk.
    /// 3. Atomically rename the temp file to the final path.
    ///
    /// If the process crashes at any point before the rename completes,
    /// the previous version of the file (if any) remains intact.
    pub fn save(&self, checkpoint: &Checkpoint) -> BenchResult<()> {
        let target = self.path();
        let payload =
            serde_json::to_vec_pretty(checkpoint).map_err(|e| BenchError::CheckpointFormat {
                path: target.clone(),
                source: e,
            })?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| BenchError::CheckpointIo {
            path: self.dir.clone(),
            source: e,
        })?;

        tmp.write_all(&payload).map_err(|e| BenchError::CheckpointIo {
            path: tmp.path().to_path_buf(),
            source: e,
        })?;

        tmp.as_file()
            .sync_all()
            .map_err(|e| BenchError::CheckpointIo {
                path: tmp.path().to_path_buf(),
                source: e,
            })?;

        tmp.persist(&target).map_err(|e| BenchError::CheckpointIo {
            path: target,
            source: e.error,
        })?;

        debug!(completed = checkpoint.completed_count(), "checkpoint saved");
        Ok(())
    }
}
