//! Typed in-memory tables.
//!
//! A [`Dataset`] is immutable once built: filtering produces index lists over
//! it, never a modified copy.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::schema::TableSchema;

/// A single typed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Build a float cell, mapping NaN and infinities to null.
    pub fn float(v: f64) -> Self {
        if v.is_finite() {
            Value::Float(v)
        } else {
            Value::Null
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell. Text and booleans are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) if f.is_finite() => Some(*f),
            _ => None,
        }
    }

    /// Numeric view that also reads numeric text, for cells of a numerical
    /// column that were kept as text.
    pub fn parse_f64(&self) -> Option<f64> {
        match self {
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            other => other.as_f64(),
        }
    }

    /// Exact equality against a filter value.
    ///
    /// Comparison is symmetric in the cell and filter types: when one side is
    /// text and the other a number or boolean, the text is parsed as that
    /// type. Text against text is case-sensitive. Null cells never match.
    pub fn matches(&self, wanted: &Value) -> bool {
        match (self, wanted) {
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Text(a), Value::Integer(b)) => match a.trim().parse::<i64>() {
                Ok(a) => a == *b,
                Err(_) => a.trim().parse::<f64>().is_ok_and(|a| a == *b as f64),
            },
            (Value::Text(a), Value::Float(b)) => a.trim().parse::<f64>().is_ok_and(|a| a == *b),
            (Value::Text(a), Value::Boolean(b)) => a.parse::<bool>().is_ok_and(|a| a == *b),
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Integer(_) | Value::Float(_) | Value::Boolean(_), Value::Text(_)) => {
                wanted.matches(self)
            }
            (Value::Integer(_) | Value::Float(_), other) => {
                match (self.as_f64(), other.as_f64()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Boolean(_), _) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One row keyed by column name, in schema order.
pub type Row = IndexMap<String, Value>;

/// A loaded table: schema plus row-major typed cells in file order.
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: TableSchema,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Build a dataset, checking that every row has exactly the schema's columns.
    pub fn new(schema: TableSchema, rows: Vec<Vec<Value>>) -> Result<Self> {
        let width = schema.column_count();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(DashboardError::Schema(format!(
                "row {} has {} cells, expected {}",
                idx + 1,
                row.len(),
                width
            )));
        }
        Ok(Self { schema, rows })
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.schema.column_count()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, or `UnknownColumn`.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.schema
            .position_of(name)
            .ok_or_else(|| DashboardError::UnknownColumn(name.to_string()))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// All values of one column in row order.
    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |r| &r[col])
    }

    /// Take the schema and rows apart.
    pub fn into_parts(self) -> (TableSchema, Vec<Vec<Value>>) {
        (self.schema, self.rows)
    }

    /// Materialise a row as a name → value map.
    pub fn row_map(&self, row: usize) -> Option<Row> {
        let cells = self.rows.get(row)?;
        Some(
            self.schema
                .columns
                .iter()
                .zip(cells)
                .map(|(c, v)| (c.name.clone(), v.clone()))
                .collect(),
        )
    }
}
