//! CLI module
//!
//! Command-line interface for converting a directory of `.tbl` extracts.
//!
//! # Usage
//!
//! - `tbl2parquet <input_dir> <output_dir>` - Convert every registry table
//! - `tbl2parquet --list-tables` - Print the table registry

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::{convert_all, Runner};
