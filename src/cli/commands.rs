//! CLI arguments

use crate::config::{CompressionCodec, ConversionMode};
use clap::Parser;
use std::path::PathBuf;

/// Convert pipe-delimited `.tbl` extracts into Parquet files
#[derive(Parser, Debug)]
#[command(name = "tbl2parquet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing `<table>.tbl` files
    #[arg(required_unless_present = "list_tables")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving `<table>.parquet` files (created if missing)
    #[arg(required_unless_present = "list_tables")]
    pub output_dir: Option<PathBuf>,

    /// Chunking preset
    #[arg(short, long)]
    pub mode: Option<ConversionMode>,

    /// Records per chunk (overrides the mode preset)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Maximum records per row group (overrides the mode preset)
    #[arg(long)]
    pub row_group_size: Option<usize>,

    /// Column compression
    #[arg(long)]
    pub compression: Option<CompressionCodec>,

    /// chrono format of date columns
    #[arg(long)]
    pub date_format: Option<String>,

    /// Schema registry file (YAML), built-in TPC-H tables when omitted
    #[arg(short, long)]
    pub schemas: Option<PathBuf>,

    /// Conversion settings file (YAML or JSON)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Tables to convert (comma-separated, empty = all)
    #[arg(short, long, value_delimiter = ',')]
    pub tables: Vec<String>,

    /// Continue with the remaining tables after a failure
    #[arg(short, long)]
    pub keep_going: bool,

    /// Write a JSON run report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Disable dictionary encoding
    #[arg(long)]
    pub no_dictionary: bool,

    /// Disable column statistics
    #[arg(long)]
    pub no_statistics: bool,

    /// Print the table registry and exit
    #[arg(long)]
    pub list_tables: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
