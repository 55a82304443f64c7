// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # tbl2parquet
//!
//! Streaming conversion of pipe-delimited `.tbl` extracts (as produced by
//! TPC-H `dbgen`) into typed, Snappy-compressed Parquet files.
//!
//! ## Features
//!
//! - **Fixed Schemas**: Per-table column lists, built-in TPC-H or loaded from YAML
//! - **Exact Decimals**: Money columns parsed straight into `Decimal128(15, 2)`
//! - **Bounded Memory**: Input read and written one chunk at a time
//! - **Atomic Output**: A failed table never leaves a partial `.parquet` file
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tbl2parquet::{ConvertConfig, Converter, SchemaRegistry, TracingReporter};
//! use std::path::Path;
//!
//! let registry = SchemaRegistry::tpch()?;
//! let config = ConvertConfig::streaming().with_chunk_size(1_000_000);
//!
//! let summary = Converter::new(&registry, &config).convert_table(
//!     "lineitem",
//!     Path::new("data/tbl"),
//!     Path::new("data/parquet"),
//!     &mut TracingReporter,
//! )?;
//! println!("{} rows", summary.rows);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! <table>.tbl ──► DelimitedReader ──► ChunkBuilder ──► StreamingWriter ──► <table>.parquet
//!                  (chunks of raw     (Coercer per     (row groups,
//!                   records)           field)           temp + rename)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Conversion settings
pub mod config;

/// Table schemas and the schema registry
pub mod schema;

/// Reading and typing `.tbl` records
pub mod decode;

/// Parquet output
pub mod output;

/// Per-table conversion loop
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{CompressionCodec, ConversionMode, ConvertConfig};
pub use engine::{Converter, ProgressReporter, RunReport, TableConverter, TableSummary, TracingReporter};
pub use error::{Error, ErrorKind, Result};
pub use schema::{ColumnDef, SchemaRegistry, SemanticType, TableSchema};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
