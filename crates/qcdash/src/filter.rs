//! Filter engine.
//!
//! A [`FilterSpec`] maps column names to either a concrete value or the `All`
//! sentinel. Constraints combine with AND; there is no OR or negation. The
//! same spec is applied independently to the baseline and to the overlay.
//!
//! A [`RangeSpec`] adds inclusive numeric bounds on numerical columns. It is
//! kept apart from the spec so exact-match semantics stay exact; a range is
//! applied to a view the spec has already narrowed.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::classify::ALL;
use crate::dataset::{Dataset, Row, Value};
use crate::error::{DashboardError, Result};

/// Selection for a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// No constraint.
    All,
    /// Keep rows whose cell equals this value exactly.
    Exact(Value),
}

impl FilterValue {
    pub fn is_all(&self) -> bool {
        matches!(self, FilterValue::All)
    }
}

/// Null, empty text and the literal `All` are all "no constraint".
impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FilterValue::All,
            Value::Text(ref s) if s.is_empty() || s == ALL => FilterValue::All,
            other => FilterValue::Exact(other),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::from(Value::Text(value.to_string()))
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FilterValue::All => serializer.serialize_str(ALL),
            FilterValue::Exact(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(FilterValue::from(Value::deserialize(deserializer)?))
    }
}

/// Column → selection mapping. Columns absent from the spec are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    constraints: IndexMap<String, FilterValue>,
}

impl FilterSpec {
    /// A spec that matches every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<FilterValue>) {
        self.constraints.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&FilterValue> {
        self.constraints.get(column)
    }

    /// Every column named by the spec, including `All` entries.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.constraints.keys().map(|k| k.as_str())
    }

    /// Non-`All` constraints.
    pub fn active(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.constraints.iter().filter_map(|(k, v)| match v {
            FilterValue::All => None,
            FilterValue::Exact(value) => Some((k.as_str(), value)),
        })
    }

    /// True when no constraint is active.
    pub fn is_unconstrained(&self) -> bool {
        self.active().next().is_none()
    }

    /// Build a spec from `COLUMN=VALUE` expressions.
    ///
    /// Values are taken as text; numeric and boolean cells still match them
    /// through [`Value::matches`].
    pub fn parse_assignments<'a>(exprs: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut spec = FilterSpec::new();
        for expr in exprs {
            let (column, value) = expr.split_once('=').ok_or_else(|| {
                DashboardError::InvalidFilter(format!("expected COLUMN=VALUE, got '{expr}'"))
            })?;
            let column = column.trim();
            if column.is_empty() {
                return Err(DashboardError::InvalidFilter(format!(
                    "missing column name in '{expr}'"
                )));
            }
            spec.insert(column, value);
        }
        Ok(spec)
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for FilterSpec {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut spec = FilterSpec::new();
        for (k, v) in iter {
            spec.insert(k, v);
        }
        spec
    }
}

/// Inclusive bounds on one numerical column. A missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Both bounds closed.
    pub fn between(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|lo| value >= lo) && self.max.is_none_or(|hi| value <= hi)
    }

    fn validate(&self, column: &str) -> Result<()> {
        if self.min.is_some_and(|v| !v.is_finite()) || self.max.is_some_and(|v| !v.is_finite()) {
            return Err(DashboardError::InvalidFilter(format!(
                "range on '{column}' has a non-finite bound"
            )));
        }
        if let (Some(lo), Some(hi)) = (self.min, self.max) {
            if lo > hi {
                return Err(DashboardError::InvalidFilter(format!(
                    "range on '{column}' has min {lo} above max {hi}"
                )));
            }
        }
        Ok(())
    }
}

/// Column → bounds mapping for numerical columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeSpec {
    bounds: IndexMap<String, NumericRange>,
}

impl RangeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, range: NumericRange) -> Self {
        self.insert(column, range);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, range: NumericRange) {
        self.bounds.insert(column.into(), range);
    }

    pub fn get(&self, column: &str) -> Option<&NumericRange> {
        self.bounds.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NumericRange)> {
        self.bounds.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Build ranges from `COLUMN=MIN:MAX` expressions; either bound may be
    /// left empty (`Q30=90:`).
    pub fn parse_assignments<'a>(exprs: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut ranges = RangeSpec::new();
        for expr in exprs {
            let invalid = || {
                DashboardError::InvalidFilter(format!("expected COLUMN=MIN:MAX, got '{expr}'"))
            };
            let (column, bounds) = expr.split_once('=').ok_or_else(invalid)?;
            let (lo, hi) = bounds.split_once(':').ok_or_else(invalid)?;
            let column = column.trim();
            if column.is_empty() {
                return Err(invalid());
            }
            let bound = |text: &str| -> Result<Option<f64>> {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                text.parse::<f64>().map(Some).map_err(|_| invalid())
            };
            ranges.insert(column, NumericRange::new(bound(lo)?, bound(hi)?));
        }
        Ok(ranges)
    }
}

/// A transient subset of a dataset: row positions in original order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Positions of the matching rows in the source dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Matching rows' cells, in order.
    pub fn rows(&self) -> impl Iterator<Item = &'a [Value]> + '_ {
        let rows = self.dataset.rows();
        self.indices.iter().map(move |&i| rows[i].as_slice())
    }

    /// One column's cells over the matching rows.
    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &'a Value> + '_ {
        self.rows().map(move |r| &r[col])
    }

    /// Matching rows materialised as name → value maps.
    pub fn to_rows(&self) -> Vec<Row> {
        self.indices
            .iter()
            .filter_map(|&i| self.dataset.row_map(i))
            .collect()
    }
}

/// Apply a filter spec to a dataset.
///
/// Fails with `UnknownColumn` if any key of `spec` is not in the schema, even
/// when its value is `All`.
pub fn apply<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> Result<FilteredView<'a>> {
    for column in spec.columns() {
        dataset.column_index(column)?;
    }

    let active: Vec<(usize, &Value)> = spec
        .active()
        .map(|(col, value)| Ok((dataset.column_index(col)?, value)))
        .collect::<Result<_>>()?;

    let indices: Vec<usize> = dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| active.iter().all(|(col, wanted)| row[*col].matches(wanted)))
        .map(|(i, _)| i)
        .collect();

    log::debug!(
        "filter matched {} of {} rows ({} active constraints)",
        indices.len(),
        dataset.row_count(),
        active.len()
    );

    Ok(FilteredView { dataset, indices })
}

/// Keep the rows of `view` whose cells fall inside every range.
///
/// Null and non-numeric cells are outside any range on their column. Fails
/// with `UnknownColumn` for a column not in the schema and with
/// `InvalidFilter` for inverted or non-finite bounds.
pub fn restrict<'a>(view: FilteredView<'a>, ranges: &RangeSpec) -> Result<FilteredView<'a>> {
    if ranges.is_empty() {
        return Ok(view);
    }

    let dataset = view.dataset;
    let bounds: Vec<(usize, &NumericRange)> = ranges
        .iter()
        .map(|(col, range)| {
            range.validate(col)?;
            Ok((dataset.column_index(col)?, range))
        })
        .collect::<Result<_>>()?;

    let rows = dataset.rows();
    let before = view.indices.len();
    let indices: Vec<usize> = view
        .indices
        .into_iter()
        .filter(|&i| {
            bounds
                .iter()
                .all(|(col, range)| rows[i][*col].parse_f64().is_some_and(|v| range.contains(v)))
        })
        .collect();

    log::debug!("ranges kept {} of {} rows", indices.len(), before);

    Ok(FilteredView { dataset, indices })
}
