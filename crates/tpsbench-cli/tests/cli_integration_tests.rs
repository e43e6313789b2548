//! Integration tests for the tpsbench binary
//!
//! Validation errors and the report command are exercised end to end
//! through the compiled binary; no external service is contacted.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use tpsbench_core::checkpoint::{Checkpoint, CheckpointStore, ExperimentKey};
use tpsbench_core::metrics::RunRecord;

fn tpsbench() -> Command {
    Command::cargo_bin("tpsbench").expect("binary builds")
}

fn sample_record(combined_tps: f64) -> RunRecord {
    RunRecord {
        avg_tps_per_request: combined_tps / 4.0,
        combined_tps,
        total_duration: 10.0,
        avg_time_per_request: 2.5,
        total_tokens: 1000,
        price_per_1m_tokens: 0.2,
    }
}

#[test]
fn test_run_rejects_exponent_over_the_cap() {
    let temp = TempDir::new().unwrap();

    tpsbench()
        .current_dir(temp.path())
        .args(["run", "--max-exponent", "9"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("exceeds the API limit of 256"));
}

#[test]
fn test_single_rejects_request_counts_over_the_cap() {
    let temp = TempDir::new().unwrap();

    tpsbench()
        .current_dir(temp.path())
        .args(["single", "--requests", "300"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("must be between 1 and 256"));
}

#[test]
fn test_run_requires_gemini_credentials() {
    let temp = TempDir::new().unwrap();

    tpsbench()
        .current_dir(temp.path())
        .env_remove("GEMINI_API_KEY")
        .args(["run", "--backend", "gemini", "--max-exponent", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_run_requires_vertex_endpoint_settings() {
    let temp = TempDir::new().unwrap();

    tpsbench()
        .current_dir(temp.path())
        .env_remove("PROJECT_ID")
        .env_remove("ENDPOINT_ID")
        .env_remove("REGION")
        .env_remove("VERTEX_ACCESS_TOKEN")
        .args(["run", "--backend", "vertex", "--max-exponent", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not set"));
}

#[test]
fn test_report_summarizes_an_existing_run_folder() {
    let dir = TempDir::new().unwrap();

    let mut checkpoint = Checkpoint::default();
    checkpoint.record(ExperimentKey::new(0, 4), sample_record(100.0));
    checkpoint.record(ExperimentKey::new(1, 4), sample_record(200.0));
    CheckpointStore::new(dir.path())
        .unwrap()
        .save(&checkpoint)
        .unwrap();

    tpsbench()
        .arg("report")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("checkpoint loaded"))
        .stdout(predicate::str::contains("Parallel Requests"))
        .stdout(predicate::str::contains("150.00"));

    let csv = std::fs::read_to_string(dir.path().join("experiment_results.csv")).unwrap();
    let header = csv.lines().next().unwrap();
    assert_eq!(
        header,
        "Parallel Requests,Avg TPS per Request,Combined TPS,Total Duration,\
         Avg Time per Request,Total Tokens,Price per 1M Tokens"
    );
}

#[test]
fn test_report_rejects_a_folder_without_results() {
    let dir = TempDir::new().unwrap();

    tpsbench()
        .arg("report")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no completed experiments"));
}

#[test]
fn test_report_rejects_a_missing_folder() {
    let dir = TempDir::new().unwrap();

    tpsbench()
        .arg("report")
        .arg(dir.path().join("does_not_exist"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
