//! Engine types
//!
//! Progress reporting and run summaries for the conversion engine.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Receives progress events while tables are converted
pub trait ProgressReporter {
    /// A table is about to be read
    fn table_started(&mut self, table: &str, input: &Path);

    /// A chunk was written; `total_rows` is the running count for the table
    fn chunk_written(&mut self, table: &str, chunk_rows: usize, total_rows: usize);

    /// A table finished successfully
    fn table_finished(&mut self, summary: &TableSummary);
}

/// Render a row count with `,` between groups of three digits
pub fn group_thousands(count: usize) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Reporter that logs progress through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn table_started(&mut self, table: &str, input: &Path) {
        info!(table, input = %input.display(), "Converting {table}");
    }

    fn chunk_written(&mut self, table: &str, chunk_rows: usize, total_rows: usize) {
        info!(table, chunk_rows, "+ {} rows", group_thousands(total_rows));
    }

    fn table_finished(&mut self, summary: &TableSummary) {
        match &summary.output {
            Some(output) => info!(
                table = %summary.table,
                output = %output.display(),
                row_groups = summary.row_groups,
                elapsed_ms = summary.elapsed_ms,
                "DONE {}: {} rows",
                summary.table,
                group_thousands(summary.rows)
            ),
            None => warn!(
                table = %summary.table,
                "DONE {}: input is empty, no file written",
                summary.table
            ),
        }
    }
}

/// Outcome of converting one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    /// Table name
    pub table: String,
    /// Source `.tbl` file
    pub input: PathBuf,
    /// Published Parquet file, `None` when nothing was written
    pub output: Option<PathBuf>,
    /// Rows written
    pub rows: usize,
    /// Chunks read
    pub chunks: usize,
    /// Row groups in the output file
    pub row_groups: usize,
    /// Wall-clock duration in milliseconds
    pub elapsed_ms: u64,
    /// Error text for a failed table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableSummary {
    /// Create an empty summary for a table
    pub fn new(table: impl Into<String>, input: impl Into<PathBuf>) -> Self {
        Self {
            table: table.into(),
            input: input.into(),
            ..Self::default()
        }
    }

    /// Check if the table failed
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Per-table results in conversion order
    pub tables: Vec<TableSummary>,
    /// Rows written across all tables
    pub total_rows: usize,
    /// Tables that failed
    pub failed: usize,
    /// Wall-clock duration in milliseconds
    pub elapsed_ms: u64,
}

impl RunReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a table result
    pub fn push(&mut self, summary: TableSummary) {
        self.total_rows += summary.rows;
        if summary.is_failed() {
            self.failed += 1;
        }
        self.tables.push(summary);
    }

    /// Check if every table succeeded
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Look up a table result by name
    pub fn table(&self, name: &str) -> Option<&TableSummary> {
        self.tables.iter().find(|t| t.table == name)
    }
}
