//! Schema module
//!
//! Declares the fixed per-table column lists the converter works against.
//!
//! # Features
//!
//! - **Semantic Types**: Int32, Int64, String, Decimal(p, s) and Date columns
//! - **Null Policy**: Per-column control over whether empty fields become null
//! - **Registry**: Ordered table set, built-in TPC-H or loaded from YAML
//! - **Arrow Mapping**: Every table schema carries its Arrow schema

mod registry;
mod types;

pub use registry::{SchemaRegistry, TPCH_SCHEMAS};
pub use types::{
    ColumnDef, SemanticType, TableSchema, DECIMAL_PRECISION, DECIMAL_SCALE, MAX_DECIMAL_PRECISION,
};
