//! Columnar chunk builder
//!
//! Coerces a chunk of raw records and assembles an Arrow `RecordBatch`
//! matching the table schema column for column.

use super::coerce::{CoercionError, Coercer, TypedValue};
use super::reader::RawRecord;
use crate::error::{Error, Result};
use crate::schema::{ColumnDef, SemanticType, TableSchema};
use arrow::array::{
    ArrayRef, Date32Builder, Decimal128Builder, Int32Builder, Int64Builder, StringBuilder,
};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Average bytes reserved per string value
const STRING_BYTES_HINT: usize = 16;

/// Builds one `RecordBatch` per chunk for a single table
#[derive(Debug, Clone)]
pub struct ChunkBuilder<'a> {
    schema: &'a TableSchema,
    coercer: Coercer,
}

impl<'a> ChunkBuilder<'a> {
    /// Create a builder for `schema`
    pub fn new(schema: &'a TableSchema, coercer: Coercer) -> Self {
        Self { schema, coercer }
    }

    /// Table schema this builder targets
    pub fn schema(&self) -> &TableSchema {
        self.schema
    }

    /// Coerce every field of `records` and assemble a batch
    ///
    /// The first failing field aborts the whole chunk; nothing is skipped.
    pub fn build(&self, chunk_index: usize, records: &[RawRecord]) -> Result<RecordBatch> {
        let arity = self.schema.raw_arity();
        let mut columns = self
            .schema
            .columns()
            .iter()
            .map(|c| ColumnBuilder::new(c.semantic_type, records.len()))
            .collect::<Result<Vec<_>>>()?;

        for (record_index, record) in records.iter().enumerate() {
            record.check_arity(arity)?;

            for (field_index, (column, builder)) in self
                .schema
                .columns()
                .iter()
                .zip(columns.iter_mut())
                .enumerate()
            {
                let raw = record.get(field_index).unwrap_or_default();

                if raw.is_empty() && empty_is_null(column) {
                    builder.append_null();
                    continue;
                }

                let fail = |source| Error::Coercion {
                    chunk: chunk_index,
                    record: record_index,
                    line: record.line(),
                    column: column.name.clone(),
                    value: raw.to_string(),
                    source,
                };

                let value = self
                    .coercer
                    .coerce(raw, column.semantic_type)
                    .map_err(fail)?;
                if !column.nullable && matches!(value, TypedValue::Decimal { value: None, .. }) {
                    return Err(fail(CoercionError::DecimalParse {
                        reason: "empty value in a non-nullable column".to_string(),
                    }));
                }
                builder.append(&column.name, value)?;
            }
        }

        let arrays: Vec<ArrayRef> = columns.into_iter().map(ColumnBuilder::finish).collect();
        RecordBatch::try_new(self.schema.arrow_schema(), arrays)
            .map_err(|e| Error::schema_mismatch(e.to_string()))
    }
}

/// Strings keep empty values; other nullable columns store them as null
fn empty_is_null(column: &ColumnDef) -> bool {
    column.nullable && column.semantic_type != SemanticType::Utf8String
}

/// Typed Arrow builder for one column
enum ColumnBuilder {
    Int32(Int32Builder),
    Int64(Int64Builder),
    Utf8(StringBuilder),
    Decimal(Decimal128Builder),
    Date(Date32Builder),
}

impl ColumnBuilder {
    fn new(semantic_type: SemanticType, capacity: usize) -> Result<Self> {
        Ok(match semantic_type {
            SemanticType::Int32 => Self::Int32(Int32Builder::with_capacity(capacity)),
            SemanticType::Int64 => Self::Int64(Int64Builder::with_capacity(capacity)),
            SemanticType::Utf8String => Self::Utf8(StringBuilder::with_capacity(
                capacity,
                capacity * STRING_BYTES_HINT,
            )),
            SemanticType::FixedDecimal { precision, scale } => Self::Decimal(
                Decimal128Builder::with_capacity(capacity)
                    .with_precision_and_scale(precision, scale)
                    .map_err(|e| Error::schema_mismatch(e.to_string()))?,
            ),
            SemanticType::Date => Self::Date(Date32Builder::with_capacity(capacity)),
        })
    }

    fn append_null(&mut self) {
        match self {
            Self::Int32(b) => b.append_null(),
            Self::Int64(b) => b.append_null(),
            Self::Utf8(b) => b.append_null(),
            Self::Decimal(b) => b.append_null(),
            Self::Date(b) => b.append_null(),
        }
    }

    fn append(&mut self, column: &str, value: TypedValue<'_>) -> Result<()> {
        match (self, value) {
            (Self::Int32(b), TypedValue::Int32(v)) => b.append_value(v),
            (Self::Int64(b), TypedValue::Int64(v)) => b.append_value(v),
            (Self::Utf8(b), TypedValue::Utf8(v)) => b.append_value(v),
            (Self::Decimal(b), TypedValue::Decimal { value, .. }) => b.append_option(value),
            (Self::Date(b), TypedValue::Date(v)) => b.append_value(v),
            (_, other) => {
                return Err(Error::schema_mismatch(format!(
                    "column '{column}' cannot hold value {other:?}"
                )))
            }
        }
        Ok(())
    }

    fn finish(self) -> ArrayRef {
        match self {
            Self::Int32(mut b) => Arc::new(b.finish()),
            Self::Int64(mut b) => Arc::new(b.finish()),
            Self::Utf8(mut b) => Arc::new(b.finish()),
            Self::Decimal(mut b) => Arc::new(b.finish()),
            Self::Date(mut b) => Arc::new(b.finish()),
        }
    }
}
