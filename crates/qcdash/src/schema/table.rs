//! Table-level schema definition.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::column::ColumnSchema;

/// Schema for an entire table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Schemas for each column, in file order.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Create a table schema with the given columns.
    pub fn with_columns(columns: Vec<ColumnSchema>) -> Self {
        Self { columns }
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column by name.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Compare column names with another schema, ignoring order and types.
    ///
    /// Returns `(missing, unexpected)`: names of `self` absent from `other`,
    /// and names of `other` absent from `self`. Both empty means the sets match.
    pub fn name_difference(&self, other: &TableSchema) -> (Vec<String>, Vec<String>) {
        let ours: BTreeSet<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        let theirs: BTreeSet<&str> = other.columns.iter().map(|c| c.name.as_str()).collect();

        let missing = ours.difference(&theirs).map(|s| s.to_string()).collect();
        let unexpected = theirs.difference(&ours).map(|s| s.to_string()).collect();
        (missing, unexpected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    fn schema(names: &[&str]) -> TableSchema {
        TableSchema::with_columns(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| ColumnSchema::new(*n, i, ColumnType::String))
                .collect(),
        )
    }

    #[test]
    fn test_name_difference_ignores_order() {
        let a = schema(&["Sample_Name", "Q30", "Assay"]);
        let b = schema(&["Assay", "Sample_Name", "Q30"]);
        let (missing, unexpected) = a.name_difference(&b);
        assert!(missing.is_empty());
        assert!(unexpected.is_empty());
    }

    #[test]
    fn test_name_difference_reports_both_sides() {
        let a = schema(&["Sample_Name", "Q30"]);
        let b = schema(&["Sample_Name", "Q20", "Lane"]);
        let (missing, unexpected) = a.name_difference(&b);
        assert_eq!(missing, vec!["Q30"]);
        assert_eq!(unexpected, vec!["Lane", "Q20"]);
    }

    #[test]
    fn test_lookup() {
        let s = schema(&["a", "b"]);
        assert_eq!(s.position_of("b"), Some(1));
        assert!(s.get_column("c").is_none());
        assert_eq!(s.column_names(), vec!["a", "b"]);
    }
}
