//! Delimited record reader
//!
//! Splits `|`-delimited table extracts into bounded chunks of raw records.
//! Lines usually end with a trailing delimiter, which yields one extra
//! empty field after the last column. That field is optional and ignored.

use crate::error::{Error, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Field delimiter of `.tbl` extracts
pub const DEFAULT_DELIMITER: u8 = b'|';

/// Upper bound on records preallocated per chunk
const PREALLOC_LIMIT: usize = 64 * 1024;

/// One input line split into raw string fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    line: u64,
    fields: StringRecord,
}

impl RawRecord {
    /// Wrap a parsed record found at `line` (1-based)
    pub fn new(line: u64, fields: StringRecord) -> Self {
        Self { line, fields }
    }

    /// Build a record from individual fields
    pub fn from_fields<I, S>(line: u64, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut record = StringRecord::new();
        for field in fields {
            record.push_field(field.as_ref());
        }
        Self::new(line, record)
    }

    /// Line number in the source
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Number of fields, including the trailing one
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the line produced no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index)
    }

    /// Check the record splits into `arity` fields, or `arity - 1` when the
    /// trailing field is absent
    pub fn check_arity(&self, arity: usize) -> Result<()> {
        let found = self.fields.len();
        if found == arity || found + 1 == arity {
            Ok(())
        } else {
            Err(Error::MalformedRecord {
                line: self.line,
                expected: arity,
                found,
            })
        }
    }
}

/// A `.tbl` file on disk
///
/// Each call to [`TableSource::chunks`] re-opens the file, so the chunk
/// sequence can always be restarted from the first record.
#[derive(Debug, Clone)]
pub struct TableSource {
    path: PathBuf,
    delimiter: u8,
}

impl TableSource {
    /// Source reading `path` with the default delimiter
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Use a different single-byte delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file and return a lazy chunk iterator
    pub fn chunks(&self, arity: usize, chunk_size: usize) -> Result<DelimitedReader<File>> {
        let file = File::open(&self.path).map_err(|e| {
            Error::source_io(self.path.display().to_string(), format!("Failed to open: {e}"))
        })?;

        Ok(DelimitedReader::new(
            file,
            self.path.display().to_string(),
            arity,
            chunk_size,
        )
        .with_delimiter(self.delimiter))
    }
}

/// Lazy sequence of record chunks read from any byte source
pub struct DelimitedReader<R: Read> {
    reader: csv::Reader<R>,
    source: String,
    arity: usize,
    chunk_size: usize,
    finished: bool,
}

impl<R: Read> DelimitedReader<R> {
    /// Create a reader yielding chunks of at most `chunk_size` records of `arity` fields
    pub fn new(inner: R, source: impl Into<String>, arity: usize, chunk_size: usize) -> Self {
        Self {
            reader: build_csv_reader(inner, DEFAULT_DELIMITER),
            source: source.into(),
            arity,
            chunk_size: chunk_size.max(1),
            finished: false,
        }
    }

    /// Use a different single-byte delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        if delimiter != DEFAULT_DELIMITER {
            self.reader = build_csv_reader(self.reader.into_inner(), delimiter);
        }
        self
    }

    /// Read the next chunk, `None` once the source is exhausted
    pub fn next_chunk(&mut self) -> Result<Option<Vec<RawRecord>>> {
        if self.finished {
            return Ok(None);
        }

        let mut records = Vec::with_capacity(self.chunk_size.min(PREALLOC_LIMIT));

        while records.len() < self.chunk_size {
            let mut fields = StringRecord::new();
            let more = match self.reader.read_record(&mut fields) {
                Ok(more) => more,
                Err(e) => {
                    self.finished = true;
                    return Err(Error::source_io(&self.source, e.to_string()));
                }
            };

            if !more {
                self.finished = true;
                break;
            }

            let line = fields.position().map_or(0, csv::Position::line);
            let record = RawRecord::new(line, fields);
            if let Err(e) = record.check_arity(self.arity) {
                self.finished = true;
                return Err(e);
            }
            records.push(record);
        }

        if records.is_empty() {
            Ok(None)
        } else {
            Ok(Some(records))
        }
    }
}

impl<R: Read> Iterator for DelimitedReader<R> {
    type Item = Result<Vec<RawRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}

fn build_csv_reader<R: Read>(inner: R, delimiter: u8) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(inner)
}
