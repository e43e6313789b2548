//! `tpsbench report` command implementation

use anyhow::bail;
use tpsbench_core::checkpoint::CheckpointStore;
use tpsbench_core::summary;
use tracing::info;

use crate::cli::ReportArgs;
use crate::output;

/// Execute the `tpsbench report` command: rebuild the summary from an
/// existing run folder's checkpoint, without issuing any requests.
pub fn run(args: ReportArgs) -> anyhow::Result<()> {
    if !args.run_folder.is_dir() {
        bail!("run folder {} does not exist", args.run_folder.display());
    }

    let store = CheckpointStore::new(&args.run_folder)?;
    let checkpoint = store.load()?;
    info!(completed = checkpoint.completed_count(), "checkpoint loaded");
    if checkpoint.completed_count() == 0 {
        bail!(
            "no completed experiments found in {}",
            args.run_folder.display()
        );
    }

    let rows = summary::summarize(&checkpoint);
    let csv_path = summary::write_summary_csv(&args.run_folder, &rows)?;

    output::print_summary_table(&rows);
    println!("Raw data saved as '{}'", csv_path.display());

    Ok(())
}
