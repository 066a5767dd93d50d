//! Box-plot statistics per numerical column.
//!
//! Quartiles use the continuous (linear interpolation) percentile: for
//! percentile `p` over `n` sorted values the rank is `p * (n - 1)`, and the
//! result interpolates between the two order statistics around that rank.
//! This is the same definition as SQL `PERCENTILE_CONT` and NumPy's default
//! `linear` method, so results can be cross-checked against either.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::Value;
use crate::error::Result;
use crate::filter::FilteredView;

/// Continuous percentile of an ascending-sorted slice. `p` is in `[0, 1]`.
///
/// Returns `None` for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let p = p.clamp(0.0, 1.0);
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Min, quartiles and max.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    /// Summarise a set of values in any order. `None` when empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            min: *sorted.first()?,
            q1: percentile(&sorted, 0.25)?,
            median: percentile(&sorted, 0.5)?,
            q3: percentile(&sorted, 0.75)?,
            max: *sorted.last()?,
        })
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// An overlay sample plotted against the baseline distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayPoint {
    pub value: f64,
    /// The overlay row's identifier, or `#<row>` when there is none.
    pub label: String,
}

/// Statistics for one numerical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBundle {
    /// Number of baseline values summarised.
    pub count: usize,
    /// Absent when the filtered baseline has no values for this column.
    #[serde(flatten)]
    pub summary: Option<FiveNumberSummary>,
    /// Baseline values in row order, not deduplicated or sorted.
    pub points: Vec<f64>,
    /// Overlay values in row order with their labels.
    pub overlay_points: Vec<OverlayPoint>,
}

impl StatBundle {
    /// Build a bundle from baseline values and overlay points.
    pub fn new(points: Vec<f64>, overlay_points: Vec<OverlayPoint>) -> Self {
        Self {
            count: points.len(),
            summary: FiveNumberSummary::from_values(&points),
            points,
            overlay_points,
        }
    }

    /// Whether the baseline had no values for this column.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
    }
}

/// Statistics keyed by column name, in the order the columns were requested.
pub type StatsMap = IndexMap<String, StatBundle>;

/// Compute a bundle for each numerical column.
///
/// Baseline values come from `baseline` only; the overlay contributes labelled
/// points and never affects the summary. `identifier` names the column whose
/// value labels overlay points.
pub fn compute_stats(
    baseline: &FilteredView<'_>,
    overlay: Option<&FilteredView<'_>>,
    numerical: &[String],
    identifier: Option<&str>,
) -> Result<StatsMap> {
    let mut stats = StatsMap::with_capacity(numerical.len());

    for column in numerical {
        let col = baseline.dataset().column_index(column)?;
        let points: Vec<f64> = baseline
            .column_values(col)
            .filter_map(Value::as_f64)
            .collect();

        let overlay_points = match overlay {
            Some(view) => overlay_points(view, column, identifier)?,
            None => Vec::new(),
        };

        stats.insert(column.clone(), StatBundle::new(points, overlay_points));
    }

    Ok(stats)
}

/// Labelled overlay values for one column.
///
/// Overlay column types are not required to match the baseline's, so numeric
/// text cells are accepted here.
fn overlay_points(
    view: &FilteredView<'_>,
    column: &str,
    identifier: Option<&str>,
) -> Result<Vec<OverlayPoint>> {
    let dataset = view.dataset();
    let col = dataset.column_index(column)?;
    let id_col = identifier.and_then(|id| dataset.schema().position_of(id));

    let points = view
        .indices()
        .iter()
        .filter_map(|&row| {
            let value = dataset.get(row, col)?.parse_f64()?;
            let label = id_col
                .and_then(|id| dataset.get(row, id))
                .filter(|v| !v.is_null())
                .map(|v| v.to_string())
                .unwrap_or_else(|| format!("#{}", row + 1));
            Some(OverlayPoint { value, label })
        })
        .collect();

    Ok(points)
}
