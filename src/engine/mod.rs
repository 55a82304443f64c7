//! Execution engine module
//!
//! Per-table conversion loop: read a chunk, build a batch, write it.
//!
//! # Overview
//!
//! The engine module provides:
//! - `TableConverter` - Converts one `.tbl` file into one Parquet file
//! - `Converter` - Resolves table names and file locations against a registry
//! - `ProgressReporter` - Running row counts as chunks are written
//! - `TableSummary` / `RunReport` - Results for logging and the JSON report

mod types;

pub use types::{group_thousands, ProgressReporter, RunReport, TableSummary, TracingReporter};

use crate::config::ConvertConfig;
use crate::decode::{ChunkBuilder, Coercer, TableSource};
use crate::error::Result;
use crate::output::{ParquetWriterConfig, StreamingWriter};
use crate::schema::{SchemaRegistry, TableSchema};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Extension of input extracts
pub const INPUT_EXTENSION: &str = "tbl";

/// Extension of output files
pub const OUTPUT_EXTENSION: &str = "parquet";

/// Converts a single table
pub struct TableConverter<'a> {
    schema: &'a TableSchema,
    config: &'a ConvertConfig,
}

impl<'a> TableConverter<'a> {
    /// Create a converter for `schema`
    pub fn new(schema: &'a TableSchema, config: &'a ConvertConfig) -> Self {
        Self { schema, config }
    }

    /// Get the table schema
    pub fn schema(&self) -> &TableSchema {
        self.schema
    }

    /// Convert `input` into `output`
    ///
    /// Chunks are processed strictly in order. The first error stops the
    /// table, discards the partial output along with any earlier file at
    /// `output`, and is returned with the table name attached. An empty
    /// input publishes nothing.
    pub fn convert(
        &self,
        input: &Path,
        output: &Path,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<TableSummary> {
        let table = self.schema.name();
        let start = Instant::now();
        reporter.table_started(table, input);

        let mut summary = TableSummary::new(table, input);
        let mut writer = StreamingWriter::new(
            output,
            self.schema.arrow_schema(),
            ParquetWriterConfig::from(self.config),
        );

        let written = match self
            .write_chunks(input, &mut writer, &mut summary, reporter)
            .and_then(|()| writer.finish())
        {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = writer.discard() {
                    warn!(table, error = %cleanup, "failed to discard output");
                }
                return Err(e.in_table(table));
            }
        };
        summary.output = written.path;
        summary.row_groups = written.row_groups;
        summary.elapsed_ms = elapsed_ms(start);

        reporter.table_finished(&summary);
        Ok(summary)
    }

    fn write_chunks(
        &self,
        input: &Path,
        writer: &mut StreamingWriter,
        summary: &mut TableSummary,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<()> {
        let chunk_size = self.config.effective_chunk_size();
        let chunks = TableSource::new(input).chunks(self.schema.raw_arity(), chunk_size)?;
        let builder = ChunkBuilder::new(self.schema, Coercer::new(self.config.date_format.as_str()));

        debug!(table = self.schema.name(), chunk_size, "reading chunks");

        for (index, chunk) in chunks.enumerate() {
            let records = chunk?;
            let batch = builder.build(index, &records)?;
            writer.write(&batch)?;

            summary.chunks += 1;
            summary.rows += batch.num_rows();
            reporter.chunk_written(self.schema.name(), batch.num_rows(), summary.rows);
        }

        Ok(())
    }
}

/// Converts tables of a registry between two directories
pub struct Converter<'a> {
    registry: &'a SchemaRegistry,
    config: &'a ConvertConfig,
}

impl<'a> Converter<'a> {
    /// Create a converter
    pub fn new(registry: &'a SchemaRegistry, config: &'a ConvertConfig) -> Self {
        Self { registry, config }
    }

    /// Convert `<input_dir>/<table>.tbl` into `<output_dir>/<table>.parquet`
    pub fn convert_table(
        &self,
        table: &str,
        input_dir: &Path,
        output_dir: &Path,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<TableSummary> {
        let schema = self.registry.get(table)?;
        TableConverter::new(schema, self.config).convert(
            &input_path(input_dir, table),
            &output_path(output_dir, table),
            reporter,
        )
    }
}

/// Location of a table's extract
pub fn input_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{table}.{INPUT_EXTENSION}"))
}

/// Location of a table's Parquet file
pub fn output_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{table}.{OUTPUT_EXTENSION}"))
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
