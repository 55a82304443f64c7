//! CLI runner - converts the selected tables

use crate::cli::commands::Cli;
use crate::config::ConvertConfig;
use crate::engine::{Converter, ProgressReporter, RunReport, TableSummary, TracingReporter};
use crate::error::{Error, Result};
use crate::schema::SchemaRegistry;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the command
    ///
    /// Returns the run report, or the first table error once the report
    /// (if requested) has been written.
    pub fn run(&self) -> Result<RunReport> {
        let registry = self.load_registry()?;

        if self.cli.list_tables {
            self.list_tables(&registry)?;
            return Ok(RunReport::new());
        }

        let config = self.build_config()?;
        let (input_dir, output_dir) = match (&self.cli.input_dir, &self.cli.output_dir) {
            (Some(input), Some(output)) => (input.as_path(), output.as_path()),
            _ => {
                return Err(Error::config(
                    "Both input and output directories are required",
                ))
            }
        };

        if !input_dir.is_dir() {
            return Err(Error::source_io(
                input_dir.display().to_string(),
                "input directory does not exist",
            ));
        }
        fs::create_dir_all(output_dir).map_err(|e| {
            Error::writer(
                output_dir.display().to_string(),
                format!("Failed to create output directory: {e}"),
            )
        })?;

        let mut reporter = TracingReporter;
        let (report, first_error) =
            convert_all(&registry, &config, input_dir, output_dir, &mut reporter)?;

        if let Some(path) = &self.cli.report {
            write_report(path, &report)?;
        }

        info!(
            tables = report.tables.len(),
            total_rows = report.total_rows,
            failed = report.failed,
            elapsed_ms = report.elapsed_ms,
            "conversion finished"
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    /// Registry from `--schemas`, or the built-in TPC-H tables
    fn load_registry(&self) -> Result<SchemaRegistry> {
        match &self.cli.schemas {
            Some(path) => SchemaRegistry::from_file(path),
            None => SchemaRegistry::tpch(),
        }
    }

    /// Config file settings overridden by command-line flags
    pub fn build_config(&self) -> Result<ConvertConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ConvertConfig::from_file(path)?,
            None => ConvertConfig::default(),
        };

        if let Some(mode) = self.cli.mode {
            config.mode = mode;
        }
        if let Some(size) = self.cli.chunk_size {
            config.chunk_size = Some(size);
        }
        if let Some(size) = self.cli.row_group_size {
            config.row_group_size = Some(size);
        }
        if let Some(compression) = self.cli.compression {
            config.compression = compression;
        }
        if let Some(format) = &self.cli.date_format {
            config.date_format.clone_from(format);
        }

        let tables: Vec<String> = self
            .cli
            .tables
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if !tables.is_empty() {
            config.tables = tables;
        }

        if self.cli.keep_going {
            config.keep_going = true;
        }
        if self.cli.no_dictionary {
            config.dictionary = false;
        }
        if self.cli.no_statistics {
            config.statistics = false;
        }

        config.validate()?;
        Ok(config)
    }

    fn list_tables(&self, registry: &SchemaRegistry) -> Result<()> {
        let tables: Vec<Value> = registry
            .tables()
            .iter()
            .map(|table| {
                let columns: Vec<Value> = table
                    .columns()
                    .iter()
                    .map(|column| {
                        json!({
                            "name": column.name,
                            "type": column.semantic_type.to_string(),
                            "nullable": column.nullable
                        })
                    })
                    .collect();

                json!({
                    "name": table.name(),
                    "columns": columns
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&tables)?);
        Ok(())
    }
}

/// Convert the configured tables in registry order
///
/// Fails up front on an unknown table name. A failing table is recorded in
/// the report; the run stops there unless `keep_going` is set. The first
/// table error is handed back alongside the report.
pub fn convert_all(
    registry: &SchemaRegistry,
    config: &ConvertConfig,
    input_dir: &Path,
    output_dir: &Path,
    reporter: &mut dyn ProgressReporter,
) -> Result<(RunReport, Option<Error>)> {
    let start = Instant::now();
    let tables = registry.select(&config.tables)?;
    let converter = Converter::new(registry, config);

    let mut report = RunReport::new();
    let mut first_error = None;

    for table in tables {
        let name = table.name();
        match converter.convert_table(name, input_dir, output_dir, reporter) {
            Ok(summary) => report.push(summary),
            Err(e) => {
                error!(table = name, error = %e, "table failed");

                let mut summary =
                    TableSummary::new(name, crate::engine::input_path(input_dir, name));
                summary.error = Some(e.to_string());
                report.push(summary);

                first_error.get_or_insert(e);
                if !config.keep_going {
                    break;
                }
            }
        }
    }

    report.elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok((report, first_error))
}

fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).map_err(|e| {
        Error::writer(
            path.display().to_string(),
            format!("Failed to write report: {e}"),
        )
    })
}
