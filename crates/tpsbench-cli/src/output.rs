//! Console rendering for sweep progress and the summary table.

use colored::Colorize;
use comfy_table::Table;
use tpsbench_core::metrics::RunRecord;
use tpsbench_core::summary::{SUMMARY_HEADER, SummaryRow};
use tpsbench_core::sweep::SweepEvent;

/// Print one sweep progress event.
pub fn render_sweep_event(event: SweepEvent) {
    match event {
        SweepEvent::WarmUpStarted => {
            println!("Performing warm-up call to the LLM...");
        }
        SweepEvent::WarmUpFinished => {
            println!("Warm-up call completed.");
        }
        SweepEvent::UnitSkipped { key } => {
            println!(
                "{}",
                format!(
                    "Skipping completed experiment: Run {}, {} parallel requests",
                    key.run_index + 1,
                    key.concurrency
                )
                .yellow()
            );
        }
        SweepEvent::UnitStarted {
            key,
            position,
            total,
        } => {
            println!(
                "\nRun {}, Experiment {}/{}: Running with {} parallel requests...",
                key.run_index + 1,
                position,
                total,
                key.concurrency
            );
        }
        SweepEvent::UnitCompleted {
            key,
            position,
            total,
            record,
        } => {
            println!("  Results for {} parallel requests:", key.concurrency);
            print_record_lines(&record);
            println!(
                "{}",
                format!(
                    "Run {}, Experiment {}/{} complete.",
                    key.run_index + 1,
                    position,
                    total
                )
                .green()
            );
        }
    }
}

/// The per-unit metric lines shared by sweep progress and single mode.
pub fn print_record_lines(record: &RunRecord) {
    println!(
        "  - Average individual TPS: {:.2}",
        record.avg_tps_per_request
    );
    println!("  - Combined TPS: {:.2}", record.combined_tps);
    println!("  - Total duration: {:.2} seconds", record.total_duration);
    println!(
        "  - Average time per request: {:.2} seconds",
        record.avg_time_per_request
    );
    println!("  - Total tokens: {}", record.total_tokens);
    println!(
        "  - Price per 1M tokens: ${:.4}",
        record.price_per_1m_tokens
    );
}

/// Render the per-level summary rows as a table.
pub fn print_summary_table(rows: &[SummaryRow]) {
    let mut table = Table::new();
    table.set_header(SUMMARY_HEADER);
    for row in rows {
        table.add_row(row.cells());
    }
    println!("{table}");
}
