//! Descriptive aggregates over a filtered view.
//!
//! These back the summary metrics, category distributions and correlation
//! heatmap of the dashboard. All of them read the baseline view they are given
//! and nothing else; the box-plot statistics live in [`crate::stats`].

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::Value;
use crate::error::Result;
use crate::filter::FilteredView;

/// Count, mean and extremes of one numerical column.
///
/// `mean`, `min` and `max` are absent when `count` is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericAggregate {
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericAggregate {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut agg = Self::default();
        let mut sum = 0.0;
        for v in values {
            agg.count += 1;
            sum += v;
            agg.min = Some(agg.min.map_or(v, |m| m.min(v)));
            agg.max = Some(agg.max.map_or(v, |m| m.max(v)));
        }
        if agg.count > 0 {
            agg.mean = Some(sum / agg.count as f64);
        }
        agg
    }
}

/// Aggregates keyed by column name, in the order the columns were requested.
pub type MetricsMap = IndexMap<String, NumericAggregate>;

/// Occurrences of one categorical value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Numerical aggregates of the rows sharing one categorical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBreakdown {
    pub value: String,
    /// Rows in the group, including those with nulls in a metric column.
    pub rows: usize,
    pub metrics: MetricsMap,
}

/// Pairwise Pearson coefficients between numerical columns.
///
/// `coefficients[i][j]` pairs `columns[i]` with `columns[j]` over the rows
/// where both are present; it is absent when fewer than two such rows exist
/// or either side is constant. `sample_sizes` holds those row counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub coefficients: Vec<Vec<Option<f64>>>,
    pub sample_sizes: Vec<Vec<usize>>,
}

impl CorrelationMatrix {
    /// Coefficient between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.coefficients[i][j]
    }
}

/// Count, mean, min and max of every numerical column.
pub fn column_metrics(view: &FilteredView<'_>, numerical: &[String]) -> Result<MetricsMap> {
    let dataset = view.dataset();
    let mut metrics = MetricsMap::with_capacity(numerical.len());
    for column in numerical {
        let col = dataset.column_index(column)?;
        let values = view.column_values(col).filter_map(Value::parse_f64);
        metrics.insert(column.clone(), NumericAggregate::from_values(values));
    }
    Ok(metrics)
}

/// Occurrences of each non-null value of `column`.
///
/// Most frequent first; equal counts are in code-point order of the value.
pub fn value_counts(view: &FilteredView<'_>, column: &str) -> Result<Vec<ValueCount>> {
    let col = view.dataset().column_index(column)?;

    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for value in view.column_values(col).filter(|v| !v.is_null()) {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }

    let mut counts: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    Ok(counts)
}

/// Group rows by the value of `column` and aggregate each numerical column.
///
/// Groups are in code-point order; rows with a null group value are left out.
pub fn breakdown(
    view: &FilteredView<'_>,
    column: &str,
    numerical: &[String],
) -> Result<Vec<GroupBreakdown>> {
    let dataset = view.dataset();
    let group_col = dataset.column_index(column)?;
    let metric_cols: Vec<usize> = numerical
        .iter()
        .map(|c| dataset.column_index(c))
        .collect::<Result<_>>()?;

    let mut groups: BTreeMap<String, Vec<&[Value]>> = BTreeMap::new();
    for row in view.rows() {
        if row[group_col].is_null() {
            continue;
        }
        groups.entry(row[group_col].to_string()).or_default().push(row);
    }

    Ok(groups
        .into_iter()
        .map(|(value, rows)| {
            let metrics = numerical
                .iter()
                .zip(&metric_cols)
                .map(|(name, &col)| {
                    let agg = NumericAggregate::from_values(
                        rows.iter().filter_map(|r| r[col].parse_f64()),
                    );
                    (name.clone(), agg)
                })
                .collect();
            GroupBreakdown {
                value,
                rows: rows.len(),
                metrics,
            }
        })
        .collect())
}

/// Pearson correlation between every pair of numerical columns.
pub fn correlation(view: &FilteredView<'_>, numerical: &[String]) -> Result<CorrelationMatrix> {
    let dataset = view.dataset();
    let columns: Vec<Vec<Option<f64>>> = numerical
        .iter()
        .map(|c| {
            let col = dataset.column_index(c)?;
            Ok(view.column_values(col).map(Value::parse_f64).collect())
        })
        .collect::<Result<_>>()?;

    let n = numerical.len();
    let mut coefficients = vec![vec![None; n]; n];
    let mut sample_sizes = vec![vec![0; n]; n];

    for i in 0..n {
        for j in i..n {
            let pairs: Vec<(f64, f64)> = columns[i]
                .iter()
                .zip(&columns[j])
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .collect();
            let r = pearson(&pairs);
            coefficients[i][j] = r;
            coefficients[j][i] = r;
            sample_sizes[i][j] = pairs.len();
            sample_sizes[j][i] = pairs.len();
        }
    }

    Ok(CorrelationMatrix {
        columns: numerical.to_vec(),
        coefficients,
        sample_sizes,
    })
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for &(x, y) in pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}
