//! Output module
//!
//! Writes Arrow RecordBatches to Parquet files.
//!
//! # Overview
//!
//! This module provides:
//! - `ParquetWriterConfig` - compression, row-group and encoding settings
//! - `StreamingWriter` - lazily opened, atomically published Parquet writer

mod writer;

pub use writer::{ParquetWriterConfig, StreamingWriter, WriteSummary, WriterPhase};
