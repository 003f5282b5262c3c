//! Run summary reporting.
//!
//! TTY mode gets a table, non-TTY gets a log line, mirroring how the
//! rest of the pipeline reports.

use std::time::Duration;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::worker::DispatchOutcome;

/// Aggregated counts for one generation run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    /// Items enumerated for this run (after filters and ledger skip)
    pub enumerated: usize,
    /// Catalog entries skipped as already completed
    pub skipped: usize,
    pub completed: usize,
    pub failed: usize,
    /// Items synthesized without lookup context
    pub degraded_lookups: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new(
        enumerated: usize,
        skipped: usize,
        outcome: DispatchOutcome,
        elapsed: Duration,
    ) -> Self {
        Self {
            enumerated,
            skipped,
            completed: outcome.completed,
            failed: outcome.failed,
            degraded_lookups: outcome.degraded_lookups,
            elapsed,
        }
    }

    /// Format summary table as a string.
    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Generation Run")
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Count").fg(Color::Cyan),
            ]);
        table.add_row(vec![
            Cell::new("Enumerated"),
            Cell::new(self.enumerated.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Skipped (already completed)"),
            Cell::new(self.skipped.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Completed").fg(Color::Green),
            Cell::new(self.completed.to_string()),
        ]);
        let failed_cell = if self.failed > 0 {
            Cell::new("Failed").fg(Color::Red)
        } else {
            Cell::new("Failed")
        };
        table.add_row(vec![failed_cell, Cell::new(self.failed.to_string())]);
        table.add_row(vec![
            Cell::new("Without lookup context"),
            Cell::new(self.degraded_lookups.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Elapsed"),
            Cell::new(format!("{:.1}s", self.elapsed.as_secs_f64())),
        ]);
        format!("\n{table}")
    }

    /// Print table (TTY mode).
    pub fn print(&self) {
        eprintln!("{}", self.format_table());
    }

    /// Log one summary line (non-TTY mode).
    pub fn log(&self) {
        log::info!(
            "Run finished: {} completed, {} failed, {} skipped, {} without lookup context [{:.1}s]",
            self.completed,
            self.failed,
            self.skipped,
            self.degraded_lookups,
            self.elapsed.as_secs_f64()
        );
    }
}
