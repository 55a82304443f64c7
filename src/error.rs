//! Error types for tbl2parquet
//!
//! This module defines the error hierarchy for the whole converter.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use crate::decode::CoercionError;
use thiserror::Error;

/// The main error type for tbl2parquet
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Schema Errors
    // ============================================================================
    #[error("Unknown table '{table}' (known tables: {known})")]
    UnknownTable { table: String, known: String },

    #[error("Invalid schema for table '{table}': {message}")]
    InvalidSchema { table: String, message: String },

    #[error("Batch does not match table schema: {message}")]
    SchemaMismatch { message: String },

    // ============================================================================
    // Input Errors
    // ============================================================================
    #[error("Failed to read source '{path}': {message}")]
    Source { path: String, message: String },

    #[error("Malformed record at line {line}: expected {expected} fields, found {found}")]
    MalformedRecord {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error(
        "Column '{column}' (chunk {chunk}, record {record}, line {line}): \
         cannot convert '{value}': {source}"
    )]
    Coercion {
        chunk: usize,
        record: usize,
        line: u64,
        column: String,
        value: String,
        #[source]
        source: CoercionError,
    },

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Failed to write '{path}': {message}")]
    Writer { path: String, message: String },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Table Errors
    // ============================================================================
    #[error("Table '{table}': {source}")]
    Table {
        table: String,
        #[source]
        source: Box<Error>,
    },
}

/// Category of a failure, independent of the context it was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    UnknownTable,
    MalformedRecord,
    IntegerParse,
    DateParse,
    DecimalParse,
    SchemaMismatch,
    WriterIo,
    SourceIo,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid schema error
    pub fn invalid_schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Create a source read error
    pub fn source_io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a writer error
    pub fn writer(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Writer {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Attach the table name to an error
    pub fn in_table(self, table: impl Into<String>) -> Self {
        Self::Table {
            table: table.into(),
            source: Box::new(self),
        }
    }

    /// Category of this error, looking through table context
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_)
            | Error::InvalidSchema { .. } => ErrorKind::Config,
            Error::UnknownTable { .. } => ErrorKind::UnknownTable,
            Error::SchemaMismatch { .. } | Error::Arrow(_) => ErrorKind::SchemaMismatch,
            Error::Source { .. } => ErrorKind::SourceIo,
            Error::MalformedRecord { .. } => ErrorKind::MalformedRecord,
            Error::Coercion { source, .. } => match source {
                CoercionError::IntegerParse { .. } => ErrorKind::IntegerParse,
                CoercionError::DateParse { .. } => ErrorKind::DateParse,
                CoercionError::DecimalParse { .. } => ErrorKind::DecimalParse,
            },
            Error::Writer { .. } | Error::Parquet(_) | Error::Io(_) => ErrorKind::WriterIo,
            Error::Table { source, .. } => source.kind(),
        }
    }

    /// Name of the table this error was raised for, if known
    pub fn table(&self) -> Option<&str> {
        match self {
            Error::Table { table, .. } => Some(table),
            _ => None,
        }
    }
}

/// Result type alias for tbl2parquet
pub type Result<T> = std::result::Result<T, Error>;
