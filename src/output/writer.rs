//! Streaming Parquet writer
//!
//! Writes a sequence of Arrow RecordBatches into one Parquet file. The file
//! is built under a temporary name and only renamed into place once the
//! footer has been written, so readers never see a partial artifact. A run
//! that publishes nothing removes whatever an earlier run left at the path.

use crate::config::ConvertConfig;
use crate::error::{Error, Result};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix of the in-progress file
const TEMP_SUFFIX: &str = ".tmp";

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
    dictionary_enabled: bool,
    statistics_enabled: bool,
}

impl ParquetWriterConfig {
    /// Get compression codec
    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Get dictionary encoding enabled
    #[must_use]
    pub fn is_dictionary_enabled(&self) -> bool {
        self.dictionary_enabled
    }

    /// Get statistics enabled
    #[must_use]
    pub fn is_statistics_enabled(&self) -> bool {
        self.statistics_enabled
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: crate::config::DEFAULT_ROW_GROUP_SIZE,
            dictionary_enabled: true,
            statistics_enabled: true,
        }
    }
}

impl From<&ConvertConfig> for ParquetWriterConfig {
    fn from(config: &ConvertConfig) -> Self {
        Self::new()
            .with_compression(config.compression.into())
            .with_row_group_size(config.effective_row_group_size())
            .with_dictionary(config.dictionary)
            .with_statistics(config.statistics)
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    /// Enable or disable dictionary encoding
    #[must_use]
    pub fn with_dictionary(mut self, enabled: bool) -> Self {
        self.dictionary_enabled = enabled;
        self
    }

    /// Enable or disable statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    /// Build writer properties
    fn build_properties(&self) -> WriterProperties {
        let mut builder = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size);

        if !self.dictionary_enabled {
            builder = builder.set_dictionary_enabled(false);
        }

        if !self.statistics_enabled {
            builder = builder.set_statistics_enabled(EnabledStatistics::None);
        }

        builder.build()
    }
}

/// Lifecycle of a [`StreamingWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterPhase {
    /// No batch received yet, nothing on disk
    Unopened,
    /// Temporary file open and receiving batches
    Open,
    /// Finished or aborted, no further writes accepted
    Closed,
}

enum WriterState {
    Unopened,
    Open(ArrowWriter<File>),
    Closed,
}

/// Outcome of a finished writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    /// Final artifact, `None` when no batch was ever written
    pub path: Option<PathBuf>,
    /// Rows written
    pub rows: usize,
    /// Row groups in the footer
    pub row_groups: usize,
}

/// Parquet writer that opens lazily and publishes atomically
pub struct StreamingWriter {
    path: PathBuf,
    temp_path: PathBuf,
    schema: SchemaRef,
    config: ParquetWriterConfig,
    state: WriterState,
    rows_written: usize,
}

impl StreamingWriter {
    /// Create a writer for `path`; nothing is created until the first batch
    pub fn new(path: impl AsRef<Path>, schema: SchemaRef, config: ParquetWriterConfig) -> Self {
        let path = path.as_ref().to_path_buf();
        let temp_path = temp_path_for(&path);
        Self {
            path,
            temp_path,
            schema,
            config,
            state: WriterState::Unopened,
            rows_written: 0,
        }
    }

    /// Final artifact path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path used while the file is being written
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> WriterPhase {
        match self.state {
            WriterState::Unopened => WriterPhase::Unopened,
            WriterState::Open(_) => WriterPhase::Open,
            WriterState::Closed => WriterPhase::Closed,
        }
    }

    /// Get the number of rows written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Append a batch, opening the file on the first call
    ///
    /// A failed write aborts the writer.
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        if matches!(self.state, WriterState::Closed) {
            return Err(self.error("writer is already closed"));
        }

        if batch.schema() != self.schema {
            return Err(Error::schema_mismatch(format!(
                "batch schema {:?} differs from writer schema {:?}",
                batch.schema(),
                self.schema
            )));
        }

        if matches!(self.state, WriterState::Unopened) {
            self.open()?;
        }

        let WriterState::Open(writer) = &mut self.state else {
            return Err(self.error("writer is not open"));
        };

        if let Err(e) = writer.write(batch) {
            self.abort();
            return Err(self.error(format!("Failed to write batch: {e}")));
        }

        self.rows_written += batch.num_rows();
        Ok(())
    }

    /// Flush the last row group and footer, then move the file into place
    pub fn finish(&mut self) -> Result<WriteSummary> {
        match std::mem::replace(&mut self.state, WriterState::Closed) {
            WriterState::Unopened => {
                debug!(path = %self.path.display(), "writer closed without data");
                self.remove_published()?;
                Ok(WriteSummary {
                    path: None,
                    rows: 0,
                    row_groups: 0,
                })
            }
            WriterState::Open(writer) => {
                let metadata = match writer.close() {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        self.remove_temp();
                        return Err(self.error(format!("Failed to close Parquet writer: {e}")));
                    }
                };

                if let Err(e) = fs::rename(&self.temp_path, &self.path) {
                    self.remove_temp();
                    return Err(self.error(format!("Failed to publish file: {e}")));
                }

                debug!(
                    path = %self.path.display(),
                    rows = self.rows_written,
                    row_groups = metadata.row_groups.len(),
                    "writer closed"
                );

                Ok(WriteSummary {
                    path: Some(self.path.clone()),
                    rows: self.rows_written,
                    row_groups: metadata.row_groups.len(),
                })
            }
            WriterState::Closed => Err(self.error("writer is already closed")),
        }
    }

    /// Discard everything written so far
    pub fn abort(&mut self) {
        if let WriterState::Open(writer) =
            std::mem::replace(&mut self.state, WriterState::Closed)
        {
            drop(writer);
            warn!(path = %self.path.display(), "discarding partial output");
            self.remove_temp();
        }
    }

    /// Abort and also delete a file left at the final path by an earlier run
    pub fn discard(&mut self) -> Result<()> {
        self.abort();
        self.remove_published()
    }

    fn remove_published(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                warn!(path = %self.path.display(), "removed stale output");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.error(format!("Failed to remove stale output: {e}"))),
        }
    }

    fn open(&mut self) -> Result<()> {
        let file = File::create(&self.temp_path).map_err(|e| {
            Error::writer(
                self.temp_path.display().to_string(),
                format!("Failed to create file: {e}"),
            )
        })?;

        let props = self.config.build_properties();
        let writer = ArrowWriter::try_new(file, self.schema.clone(), Some(props)).map_err(|e| {
            self.remove_temp();
            self.error(format!("Failed to create Parquet writer: {e}"))
        })?;

        debug!(
            path = %self.temp_path.display(),
            row_group_size = self.config.row_group_size(),
            "writer opened"
        );
        self.state = WriterState::Open(writer);
        Ok(())
    }

    fn remove_temp(&self) {
        match fs::remove_file(&self.temp_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.temp_path.display(),
                error = %e,
                "failed to remove temporary file"
            ),
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::writer(self.path.display().to_string(), message)
    }
}

impl Drop for StreamingWriter {
    fn drop(&mut self) {
        self.abort();
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}
