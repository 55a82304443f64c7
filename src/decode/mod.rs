//! Input decoding module
//!
//! Reads `.tbl` extracts and turns them into typed Arrow batches.
//!
//! # Overview
//!
//! The decode module provides:
//! - `TableSource` / `DelimitedReader` - chunked reading of raw records
//! - `Coercer` - per-field conversion to the declared semantic type
//! - `ChunkBuilder` - assembly of a schema-conforming `RecordBatch` per chunk

mod builder;
mod coerce;
mod reader;

pub use builder::ChunkBuilder;
pub use coerce::{
    parse_date, parse_decimal, CoercionError, Coercer, TypedValue, DEFAULT_DATE_FORMAT,
};
pub use reader::{DelimitedReader, RawRecord, TableSource, DEFAULT_DELIMITER};

#[cfg(test)]
mod tests;
