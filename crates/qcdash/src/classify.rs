//! Column classification.
//!
//! Splits a dataset's columns into categorical (filtered by dropdown) and
//! numerical (summarised and plotted), and enumerates dropdown options.
//! Identifier columns are excluded from both lists whatever their type.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use crate::schema::ColumnKind;

/// Sentinel option meaning "no constraint on this column".
pub const ALL: &str = "All";

/// Classifier configuration.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Column names treated as sample identity (case-insensitive).
    pub identifier_columns: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            identifier_columns: ["sample_name", "sample", "samplename", "sample name"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ClassifierConfig {
    /// Add another identifier column name.
    pub fn with_identifier(mut self, name: impl Into<String>) -> Self {
        self.identifier_columns.push(name.into());
        self
    }

    /// Whether a column name follows the identifier convention.
    pub fn is_identifier(&self, name: &str) -> bool {
        let name = name.trim();
        self.identifier_columns
            .iter()
            .any(|id| id.trim().eq_ignore_ascii_case(name))
    }
}

/// Result of classifying a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Filterable text-like columns, in schema order.
    pub categorical: Vec<String>,
    /// Quantity columns, in schema order.
    pub numerical: Vec<String>,
    /// First identifier column, used to label overlay points.
    pub identifier: Option<String>,
    /// Dropdown options per categorical column: `All` then the distinct
    /// observed values in sorted order.
    pub filter_options: IndexMap<String, Vec<String>>,
}

impl Classification {
    /// Kind of a named column, if it exists in the classified schema.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        if self.numerical.iter().any(|c| c == name) {
            Some(ColumnKind::Numerical)
        } else if self.categorical.iter().any(|c| c == name) {
            Some(ColumnKind::Categorical)
        } else if self.identifier.as_deref() == Some(name) {
            Some(ColumnKind::Identifier)
        } else {
            None
        }
    }
}

/// Classifies columns of a loaded dataset.
#[derive(Debug, Clone, Default)]
pub struct ColumnClassifier {
    config: ClassifierConfig,
}

impl ColumnClassifier {
    /// Create a classifier with the default identifier convention.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom configuration.
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify every column of `dataset`.
    ///
    /// Integer and float columns are numerical. Text, boolean, date and
    /// untyped columns are categorical.
    pub fn classify(&self, dataset: &Dataset) -> Result<Classification> {
        if dataset.column_count() == 0 {
            return Err(DashboardError::Schema("dataset has no columns".to_string()));
        }
        if dataset.is_empty() {
            return Err(DashboardError::Schema("dataset has no rows".to_string()));
        }

        let mut categorical = Vec::new();
        let mut numerical = Vec::new();
        let mut identifier = None;
        let mut filter_options = IndexMap::new();

        for (idx, column) in dataset.schema().columns.iter().enumerate() {
            if self.config.is_identifier(&column.name) {
                identifier.get_or_insert_with(|| column.name.clone());
                continue;
            }

            if column.column_type.is_numeric() {
                numerical.push(column.name.clone());
                continue;
            }

            let distinct: BTreeSet<String> = dataset
                .column_values(idx)
                .filter(|v| !v.is_null())
                .map(|v| v.to_string())
                .filter(|v| v != ALL)
                .collect();

            let mut options = Vec::with_capacity(distinct.len() + 1);
            options.push(ALL.to_string());
            options.extend(distinct);

            categorical.push(column.name.clone());
            filter_options.insert(column.name.clone(), options);
        }

        log::debug!(
            "classified {} categorical, {} numerical columns (identifier: {:?})",
            categorical.len(),
            numerical.len(),
            identifier
        );

        Ok(Classification {
            categorical,
            numerical,
            identifier,
            filter_options,
        })
    }
}
