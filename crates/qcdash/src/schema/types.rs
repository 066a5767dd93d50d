//! Core type definitions for schema representation.

use serde::{Deserialize, Serialize};

/// Declared or inferred data type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Whole numbers of any width.
    Integer,
    /// Floating-point or decimal numbers.
    Float,
    /// Text/string values.
    String,
    /// Boolean values (true/false).
    Boolean,
    /// Date and time values.
    DateTime,
    /// Date only (no time component).
    Date,
    /// Unable to determine type (e.g. a column of nulls).
    Unknown,
}

impl ColumnType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Returns true if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::DateTime | ColumnType::Date)
    }
}

impl Default for ColumnType {
    fn default() -> Self {
        ColumnType::Unknown
    }
}

/// How the dashboard treats a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Filterable by exact value through a dropdown.
    Categorical,
    /// Summarised and plotted.
    Numerical,
    /// Sample identity; neither filtered on nor summarised.
    Identifier,
}
