//! Conversion configuration
//!
//! Settings shared by every table of a run. They can come from a YAML or
//! JSON file and are then overridden by command-line flags.

use crate::decode::DEFAULT_DATE_FORMAT;
use crate::error::{Error, Result};
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Records per chunk in streaming mode
pub const STREAM_CHUNK_SIZE: usize = 5_000_000;

/// Row-group size used by the Parquet writer when none is configured
pub const DEFAULT_ROW_GROUP_SIZE: usize = 1024 * 1024;

/// Row-group size in bulk mode
pub const BULK_ROW_GROUP_SIZE: usize = 100_000;

// ============================================================================
// Mode
// ============================================================================

/// How input files are chunked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMode {
    /// Bounded chunks, row groups left to the writer default
    #[default]
    Stream,
    /// The whole file as one chunk, small row groups
    Bulk,
}

impl ConversionMode {
    /// Chunk size implied by the mode
    pub fn chunk_size(self) -> usize {
        match self {
            ConversionMode::Stream => STREAM_CHUNK_SIZE,
            ConversionMode::Bulk => usize::MAX,
        }
    }

    /// Row-group size implied by the mode
    pub fn row_group_size(self) -> usize {
        match self {
            ConversionMode::Stream => DEFAULT_ROW_GROUP_SIZE,
            ConversionMode::Bulk => BULK_ROW_GROUP_SIZE,
        }
    }
}

// ============================================================================
// Compression
// ============================================================================

/// Compression codec applied to every column chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    /// LZ4 raw block format
    Lz4,
    /// Uncompressed
    None,
}

impl From<CompressionCodec> for Compression {
    fn from(codec: CompressionCodec) -> Self {
        match codec {
            CompressionCodec::Snappy => Compression::SNAPPY,
            CompressionCodec::Zstd => Compression::ZSTD(ZstdLevel::default()),
            CompressionCodec::Gzip => Compression::GZIP(GzipLevel::default()),
            CompressionCodec::Lz4 => Compression::LZ4_RAW,
            CompressionCodec::None => Compression::UNCOMPRESSED,
        }
    }
}

// ============================================================================
// Convert Config
// ============================================================================

/// Settings for converting a set of tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Chunking preset
    pub mode: ConversionMode,

    /// Records per chunk, overrides the mode preset
    pub chunk_size: Option<usize>,

    /// Maximum records per row group, overrides the mode preset
    pub row_group_size: Option<usize>,

    /// Column compression
    pub compression: CompressionCodec,

    /// chrono format of date columns
    pub date_format: String,

    /// Dictionary-encode columns
    pub dictionary: bool,

    /// Write column statistics
    pub statistics: bool,

    /// Tables to convert, empty means all
    pub tables: Vec<String>,

    /// Continue with remaining tables after a failure
    pub keep_going: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            mode: ConversionMode::default(),
            chunk_size: None,
            row_group_size: None,
            compression: CompressionCodec::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            dictionary: true,
            statistics: true,
            tables: Vec::new(),
            keep_going: false,
        }
    }
}

impl ConvertConfig {
    /// Create a config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Streaming preset
    #[must_use]
    pub fn streaming() -> Self {
        Self::default()
    }

    /// Bulk preset
    #[must_use]
    pub fn bulk() -> Self {
        Self {
            mode: ConversionMode::Bulk,
            ..Self::default()
        }
    }

    /// Load a config from a YAML or JSON file (by extension, YAML otherwise)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config: Self = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the conversion mode
    #[must_use]
    pub fn with_mode(mut self, mode: ConversionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set records per chunk
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    /// Set maximum records per row group
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = Some(size);
        self
    }

    /// Set compression codec
    #[must_use]
    pub fn with_compression(mut self, compression: CompressionCodec) -> Self {
        self.compression = compression;
        self
    }

    /// Set date format
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Enable or disable dictionary encoding
    #[must_use]
    pub fn with_dictionary(mut self, enabled: bool) -> Self {
        self.dictionary = enabled;
        self
    }

    /// Enable or disable statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics = enabled;
        self
    }

    /// Restrict the run to these tables
    #[must_use]
    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = tables;
        self
    }

    /// Continue after a failed table
    #[must_use]
    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Records per chunk after applying the mode preset
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or_else(|| self.mode.chunk_size())
    }

    /// Row-group size after applying the mode preset
    pub fn effective_row_group_size(&self) -> usize {
        self.row_group_size
            .unwrap_or_else(|| self.mode.row_group_size())
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == Some(0) {
            return Err(Error::invalid_value("chunk_size", "must be greater than zero"));
        }
        if self.row_group_size == Some(0) {
            return Err(Error::invalid_value(
                "row_group_size",
                "must be greater than zero",
            ));
        }
        if self.date_format.trim().is_empty() {
            return Err(Error::invalid_value("date_format", "cannot be empty"));
        }
        Ok(())
    }
}
