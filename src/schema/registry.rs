//! Table schema registry
//!
//! Schemas are declared in YAML. The TPC-H definitions are embedded in the
//! binary so the common case needs no schema file at all.

use super::types::{ColumnDef, SemanticType, TableSchema};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Embedded TPC-H schema definitions
pub const TPCH_SCHEMAS: &str = include_str!("../../schemas/tpch.yaml");

/// YAML document layout
#[derive(Debug, Deserialize)]
struct RegistryDefinition {
    tables: Vec<TableDefinition>,
}

#[derive(Debug, Deserialize)]
struct TableDefinition {
    name: String,
    columns: Vec<ColumnDefinition>,
}

#[derive(Debug, Deserialize)]
struct ColumnDefinition {
    name: String,
    #[serde(rename = "type")]
    semantic_type: SemanticType,
    #[serde(default)]
    nullable: Option<bool>,
}

/// Immutable set of table schemas, in the order tables should be converted
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    tables: Vec<TableSchema>,
}

impl SchemaRegistry {
    /// Create a registry from already-built schemas
    pub fn new(tables: Vec<TableSchema>) -> Result<Self> {
        if tables.is_empty() {
            return Err(Error::config("Schema registry must define at least one table"));
        }

        let mut seen = HashSet::new();
        for table in &tables {
            if !seen.insert(table.name()) {
                return Err(Error::config(format!(
                    "Duplicate table '{}' in schema registry",
                    table.name()
                )));
            }
        }

        Ok(Self { tables })
    }

    /// The built-in TPC-H registry
    pub fn tpch() -> Result<Self> {
        Self::from_yaml_str(TPCH_SCHEMAS)
    }

    /// Load a registry from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read schema file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load a registry from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let def: RegistryDefinition = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse schema YAML: {e}")))?;

        let tables = def
            .tables
            .into_iter()
            .map(|table| {
                let columns = table
                    .columns
                    .into_iter()
                    .map(|c| {
                        let column = ColumnDef::new(c.name, c.semantic_type);
                        match c.nullable {
                            Some(nullable) => column.with_nullable(nullable),
                            None => column,
                        }
                    })
                    .collect();
                TableSchema::new(table.name, columns)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(tables)
    }

    /// Look up a table schema by name
    pub fn get(&self, name: &str) -> Result<&TableSchema> {
        self.tables
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| Error::UnknownTable {
                table: name.to_string(),
                known: self.table_names().join(", "),
            })
    }

    /// All schemas in registry order
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    /// All table names in registry order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(TableSchema::name).collect()
    }

    /// Resolve a subset of tables, keeping registry order
    ///
    /// An empty filter selects every table.
    pub fn select(&self, names: &[String]) -> Result<Vec<&TableSchema>> {
        if names.is_empty() {
            return Ok(self.tables.iter().collect());
        }

        for name in names {
            self.get(name)?;
        }

        Ok(self
            .tables
            .iter()
            .filter(|t| names.iter().any(|n| n == t.name()))
            .collect())
    }
}
