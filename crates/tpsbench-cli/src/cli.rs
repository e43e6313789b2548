//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use tpsbench_core::metrics::DEFAULT_HOURLY_COST;

/// Generation length cap requested from a backend unless overridden.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1000;

/// tpsbench - Measure LLM serving throughput across concurrency levels
#[derive(Parser)]
#[command(name = "tpsbench")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a resumable sweep over power-of-two concurrency levels
    Run(RunArgs),

    /// Run one measured batch at a single concurrency level
    Single(SingleArgs),

    /// Recompute the summary CSV from an existing run folder
    Report(ReportArgs),
}

/// Generation backend under measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Hosted Gemini API
    Gemini,
    /// Self-managed Vertex AI endpoint
    Vertex,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Vertex => "vertex",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// Backend to benchmark
    #[arg(long, value_enum, default_value_t = BackendKind::Vertex)]
    pub backend: BackendKind,

    /// Sweep concurrency levels 2^0 up to 2^MAX_EXPONENT (8 at most, for 256 parallel requests)
    #[arg(long, default_value_t = 2)]
    pub max_exponent: u32,

    /// Number of runs for each concurrency level
    #[arg(long, default_value_t = 1)]
    pub num_runs: u32,

    /// Run folder to use or resume from; a timestamped folder is created when omitted
    #[arg(long)]
    pub run_folder: Option<PathBuf>,

    /// Prompt sent by every measured request; defaults to the backend's standard prompt
    #[arg(long)]
    pub prompt: Option<String>,

    /// Generation length cap requested from the backend
    #[arg(long, default_value_t = DEFAULT_MAX_OUTPUT_TOKENS)]
    pub max_output_tokens: u32,

    /// Hourly serving cost in USD, used for the price column
    #[arg(long, default_value_t = DEFAULT_HOURLY_COST)]
    pub hourly_cost: f64,

    /// Per-request timeout in seconds; requests wait indefinitely when omitted
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Args)]
pub struct SingleArgs {
    /// Backend to benchmark
    #[arg(long, value_enum, default_value_t = BackendKind::Gemini)]
    pub backend: BackendKind,

    /// Number of parallel requests to make
    #[arg(long, default_value_t = 8)]
    pub requests: u32,

    /// Prompt sent by every request; defaults to the backend's standard prompt
    #[arg(long)]
    pub prompt: Option<String>,

    /// Generation length cap requested from the backend
    #[arg(long, default_value_t = DEFAULT_MAX_OUTPUT_TOKENS)]
    pub max_output_tokens: u32,

    /// Hourly serving cost in USD, used for the price figure
    #[arg(long, default_value_t = DEFAULT_HOURLY_COST)]
    pub hourly_cost: f64,

    /// Per-request timeout in seconds; requests wait indefinitely when omitted
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Run folder holding the checkpoint to summarize
    pub run_folder: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults_match_the_documented_sweep() {
        let cli = Cli::try_parse_from(["tpsbench", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.backend, BackendKind::Vertex);
        assert_eq!(args.max_exponent, 2);
        assert_eq!(args.num_runs, 1);
        assert!(args.run_folder.is_none());
        assert_eq!(args.max_output_tokens, 1000);
        assert!((args.hourly_cost - DEFAULT_HOURLY_COST).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_defaults_to_eight_requests() {
        let cli = Cli::try_parse_from(["tpsbench", "single"]).unwrap();
        let Commands::Single(args) = cli.command else {
            panic!("expected single subcommand");
        };
        assert_eq!(args.backend, BackendKind::Gemini);
        assert_eq!(args.requests, 8);
    }

    #[test]
    fn test_report_takes_a_positional_folder() {
        let cli = Cli::try_parse_from(["tpsbench", "report", "run_20240101_120000"]).unwrap();
        let Commands::Report(args) = cli.command else {
            panic!("expected report subcommand");
        };
        assert_eq!(args.run_folder, PathBuf::from("run_20240101_120000"));
    }
}
