//! Column schema definition.

use serde::{Deserialize, Serialize};

use super::types::ColumnType;

/// Schema for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name, exactly as it appears in the source header.
    pub name: String,
    /// Zero-based position in the table.
    pub position: usize,
    /// Declared (Parquet) or inferred (delimited text) data type.
    pub column_type: ColumnType,
    /// Whether null values are present.
    pub nullable: bool,
}

impl ColumnSchema {
    /// Create a new column schema.
    pub fn new(name: impl Into<String>, position: usize, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            position,
            column_type,
            nullable: false,
        }
    }

    /// Mark the column as containing nulls.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}
