//! tpsbench - Measure token-generation throughput of LLM serving backends

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Pick up GEMINI_API_KEY and friends from a local .env when present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    } else {
        tracing_subscriber::fmt().with_env_filter("info").init();
    }

    // Create async runtime for all commands
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_command_async(cli))
}

async fn run_command_async(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => commands::run::run(args).await,
        Commands::Single(args) => commands::single::run(args).await,
        Commands::Report(args) => commands::report::run(args),
    }
}
