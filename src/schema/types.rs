//! Schema types

use crate::error::{Error, Result};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Precision used for money and quantity columns
pub const DECIMAL_PRECISION: u8 = 15;

/// Scale used for money and quantity columns
pub const DECIMAL_SCALE: i8 = 2;

/// Largest precision an Arrow `Decimal128` can hold
pub const MAX_DECIMAL_PRECISION: u8 = 38;

/// Semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SemanticType {
    Int32,
    Int64,
    Utf8String,
    FixedDecimal { precision: u8, scale: i8 },
    Date,
}

impl SemanticType {
    /// The pipeline's fixed-point decimal, `decimal(15, 2)`
    pub const fn decimal() -> Self {
        SemanticType::FixedDecimal {
            precision: DECIMAL_PRECISION,
            scale: DECIMAL_SCALE,
        }
    }

    /// Arrow type this column is materialized as
    pub fn arrow_type(&self) -> DataType {
        match self {
            SemanticType::Int32 => DataType::Int32,
            SemanticType::Int64 => DataType::Int64,
            SemanticType::Utf8String => DataType::Utf8,
            SemanticType::FixedDecimal { precision, scale } => {
                DataType::Decimal128(*precision, *scale)
            }
            SemanticType::Date => DataType::Date32,
        }
    }

    /// Whether an empty field becomes null when the column does not say otherwise
    pub fn nullable_by_default(&self) -> bool {
        matches!(self, SemanticType::FixedDecimal { .. })
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if let SemanticType::FixedDecimal { precision, scale } = self {
            if *precision == 0 || *precision > MAX_DECIMAL_PRECISION {
                return Err(format!(
                    "decimal precision must be between 1 and {MAX_DECIMAL_PRECISION}, got {precision}"
                ));
            }
            if *scale < 0 || *scale as u8 > *precision {
                return Err(format!(
                    "decimal scale must be between 0 and the precision ({precision}), got {scale}"
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Int32 => write!(f, "int32"),
            SemanticType::Int64 => write!(f, "int64"),
            SemanticType::Utf8String => write!(f, "string"),
            SemanticType::FixedDecimal { precision, scale } => {
                write!(f, "decimal({precision}, {scale})")
            }
            SemanticType::Date => write!(f, "date"),
        }
    }
}

impl FromStr for SemanticType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let parsed = match normalized.as_str() {
            "int32" | "int" | "integer" => SemanticType::Int32,
            "int64" | "bigint" => SemanticType::Int64,
            "string" | "utf8" | "text" => SemanticType::Utf8String,
            "date" => SemanticType::Date,
            "decimal" => SemanticType::decimal(),
            other => parse_decimal_type(other)?,
        };
        parsed.validate()?;
        Ok(parsed)
    }
}

/// Parse `decimal(p, s)`
fn parse_decimal_type(s: &str) -> std::result::Result<SemanticType, String> {
    let args = s
        .strip_prefix("decimal(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| format!("unknown column type '{s}'"))?;

    let (precision, scale) = args
        .split_once(',')
        .ok_or_else(|| format!("decimal type '{s}' must be written as decimal(precision, scale)"))?;

    let precision = precision
        .trim()
        .parse::<u8>()
        .map_err(|e| format!("invalid decimal precision in '{s}': {e}"))?;
    let scale = scale
        .trim()
        .parse::<i8>()
        .map_err(|e| format!("invalid decimal scale in '{s}': {e}"))?;

    Ok(SemanticType::FixedDecimal { precision, scale })
}

impl TryFrom<String> for SemanticType {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SemanticType> for String {
    fn from(value: SemanticType) -> Self {
        value.to_string()
    }
}

/// A single column of a table schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name, as written to the output
    pub name: String,
    /// Declared type
    pub semantic_type: SemanticType,
    /// Whether an empty field is stored as null
    pub nullable: bool,
}

impl ColumnDef {
    /// Create a column using the type's default null policy
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            nullable: semantic_type.nullable_by_default(),
        }
    }

    /// Override the null policy
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Arrow field for this column
    pub fn arrow_field(&self) -> Field {
        Field::new(&self.name, self.semantic_type.arrow_type(), self.nullable)
    }
}

/// Ordered, immutable column list for one table
#[derive(Debug, Clone)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnDef>,
    arrow_schema: SchemaRef,
}

impl TableSchema {
    /// Create a table schema, validating names and types
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_schema(name, "table name cannot be empty"));
        }
        if columns.is_empty() {
            return Err(Error::invalid_schema(name, "table must have at least one column"));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if column.name.trim().is_empty() {
                return Err(Error::invalid_schema(&name, "column name cannot be empty"));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(Error::invalid_schema(
                    &name,
                    format!("duplicate column '{}'", column.name),
                ));
            }
            column
                .semantic_type
                .validate()
                .map_err(|message| Error::invalid_schema(&name, message))?;
        }

        let fields: Vec<Field> = columns.iter().map(ColumnDef::arrow_field).collect();
        let arrow_schema = Arc::new(Schema::new(fields));

        Ok(Self {
            name,
            columns,
            arrow_schema,
        })
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in output order
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Number of declared columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false, a schema has at least one column
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of fields an input line splits into, counting the trailing field
    pub fn raw_arity(&self) -> usize {
        self.columns.len() + 1
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Arrow schema shared by every batch and the output file
    pub fn arrow_schema(&self) -> SchemaRef {
        Arc::clone(&self.arrow_schema)
    }
}

impl PartialEq for TableSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.columns == other.columns
    }
}
