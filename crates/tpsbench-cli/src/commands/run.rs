//! `tpsbench run` command implementation

use std::path::{Path, PathBuf};

use anyhow::bail;
use chrono::Local;
use colored::Colorize;
use tpsbench_core::metrics::DEFAULT_HOURLY_COST;
use tpsbench_core::summary::SUMMARY_FILE;
use tpsbench_core::sweep::{SweepConfig, SweepDriver, SweepOutcome};
use tracing::info;

use crate::cli::{DEFAULT_MAX_OUTPUT_TOKENS, RunArgs};
use crate::commands::{build_backend, build_tokenizer, default_prompt};
use crate::output;

/// Execute the `tpsbench run` command.
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let specified_folder = args.run_folder.is_some();
    let run_folder = match args.run_folder.clone() {
        Some(folder) => folder,
        None => PathBuf::from(format!("run_{}", Local::now().format("%Y%m%d_%H%M%S"))),
    };
    info!(folder = %run_folder.display(), backend = %args.backend, "run folder resolved");

    let prompt = args
        .prompt
        .clone()
        .unwrap_or_else(|| default_prompt(args.backend).to_string());

    let config = SweepConfig {
        max_exponent: args.max_exponent,
        num_runs: args.num_runs,
        run_folder: run_folder.clone(),
        prompt,
        hourly_cost: args.hourly_cost,
    };
    // Reject a bad configuration before any folder or backend is touched.
    config.validate()?;

    let backend = build_backend(args.backend, args.max_output_tokens, args.request_timeout_secs)?;
    let tokenizer = build_tokenizer()?;

    println!("Running experiments...");
    if specified_folder {
        println!("Using specified run folder: {}", run_folder.display());
    } else {
        println!("Created new run folder: {}", run_folder.display());
    }

    let driver = SweepDriver::new(config, backend, tokenizer)?;

    println!(
        "Starting experiments with {} different parallel request counts, {} runs each...",
        args.max_exponent + 1,
        args.num_runs
    );

    match driver.run(output::render_sweep_event).await? {
        SweepOutcome::Completed { rows } => {
            println!("\n{}", "All experiments completed.".green());
            output::print_summary_table(&rows);
            println!(
                "Raw data saved as '{}'",
                run_folder.join(SUMMARY_FILE).display()
            );
            Ok(())
        }
        SweepOutcome::Halted { key, error } => {
            let levels = driver.config().levels();
            let position = levels
                .iter()
                .position(|&level| level == key.concurrency)
                .map(|p| p + 1)
                .unwrap_or(0);

            println!(
                "{}",
                format!(
                    "Error during experiment with {} parallel requests: {}",
                    key.concurrency, error
                )
                .red()
            );
            println!(
                "\n{}",
                format!(
                    "Experiment failed at Run {}, Experiment {}/{} with {} parallel requests.",
                    key.run_index + 1,
                    position,
                    levels.len(),
                    key.concurrency
                )
                .red()
            );
            println!(
                "A checkpoint has been saved in the run folder: {}",
                run_folder.display()
            );
            println!("To resume the experiment, run the following command:");
            println!("{}", resume_command(&args, &run_folder));
            bail!(
                "sweep halted at run {}, {} parallel requests",
                key.run_index + 1,
                key.concurrency
            )
        }
    }
}

/// The exact command that resumes this sweep. Measurement flags that
/// differ from their defaults are carried along; a resumed sweep must
/// measure with the same parameters as the units already checkpointed.
fn resume_command(args: &RunArgs, run_folder: &Path) -> String {
    let mut command = format!(
        "tpsbench run --backend {} --max-exponent {} --num-runs {} --run-folder {}",
        args.backend,
        args.max_exponent,
        args.num_runs,
        run_folder.display()
    );
    if let Some(prompt) = &args.prompt {
        command.push_str(&format!(" --prompt \"{}\"", prompt.replace('"', "\\\"")));
    }
    if args.max_output_tokens != DEFAULT_MAX_OUTPUT_TOKENS {
        command.push_str(&format!(" --max-output-tokens {}", args.max_output_tokens));
    }
    if (args.hourly_cost - DEFAULT_HOURLY_COST).abs() > f64::EPSILON {
        command.push_str(&format!(" --hourly-cost {}", args.hourly_cost));
    }
    if let Some(secs) = args.request_timeout_secs {
        command.push_str(&format!(" --request-timeout-secs {secs}"));
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::BackendKind;

    fn base_args() -> RunArgs {
        RunArgs {
            backend: BackendKind::Vertex,
            max_exponent: 3,
            num_runs: 2,
            run_folder: None,
            prompt: None,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            hourly_cost: DEFAULT_HOURLY_COST,
            request_timeout_secs: None,
        }
    }

    #[test]
    fn test_resume_command_with_defaults_stays_minimal() {
        let command = resume_command(&base_args(), Path::new("run_x"));
        assert_eq!(
            command,
            "tpsbench run --backend vertex --max-exponent 3 --num-runs 2 --run-folder run_x"
        );
    }

    #[test]
    fn test_resume_command_carries_overridden_flags() {
        let mut args = base_args();
        args.prompt = Some("count to ten".to_string());
        args.max_output_tokens = 500;
        args.hourly_cost = 7.25;
        args.request_timeout_secs = Some(30);

        let command = resume_command(&args, Path::new("run_x"));
        assert_eq!(
            command,
            "tpsbench run --backend vertex --max-exponent 3 --num-runs 2 --run-folder run_x \
             --prompt \"count to ten\" --max-output-tokens 500 --hourly-cost 7.25 \
             --request-timeout-secs 30"
        );
    }

    #[test]
    fn test_resume_command_escapes_prompt_quotes() {
        let mut args = base_args();
        args.prompt = Some("say \"hi\"".to_string());
        let command = resume_command(&args, Path::new("run_x"));
        assert!(command.contains(" --prompt \"say \\\"hi\\\"\""));
    }
}
