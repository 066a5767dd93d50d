//! Main Dashboard struct and public API.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::{self, CorrelationMatrix, GroupBreakdown, MetricsMap, ValueCount};
use crate::cascade;
use crate::classify::{Classification, ClassifierConfig, ColumnClassifier};
use crate::dataset::{Dataset, Row};
use crate::error::{DashboardError, Result};
use crate::filter::{FilterSpec, FilteredView, RangeSpec, apply, restrict};
use crate::input::{self, ParserConfig, SourceMetadata};
use crate::stats::{StatsMap, compute_stats};
use crate::store::{DatasetStore, LoadedDataset};

/// Configuration for loading and classifying datasets.
#[derive(Debug, Clone, Default)]
pub struct DashboardConfig {
    /// Parser configuration for delimited text.
    pub parser: ParserConfig,
    /// Identifier column convention.
    pub classifier: ClassifierConfig,
}

/// What a baseline load reports back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSummary {
    pub categorical_columns: Vec<String>,
    pub numerical_columns: Vec<String>,
    pub identifier_column: Option<String>,
    /// Dropdown options per categorical column, `All` first.
    pub filter_options: IndexMap<String, Vec<String>>,
    pub total_row_count: usize,
    pub source: SourceMetadata,
}

/// What an overlay load reports back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlaySummary {
    pub overlay_row_count: usize,
    pub source: SourceMetadata,
}

/// Filtered rows from the baseline and the overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub matched_count: usize,
    pub total_count: usize,
    pub overlay_rows: Vec<Row>,
    pub overlay_matched_count: usize,
}

/// The query layer: one shared store plus the load/filter/stats operations.
///
/// `Dashboard` is `Send + Sync`; share it behind an `Arc` between request
/// handlers. Queries run concurrently against snapshots, loads are serialized
/// by the store's lock.
#[derive(Debug, Default)]
pub struct Dashboard {
    config: DashboardConfig,
    classifier: ColumnClassifier,
    store: DatasetStore,
}

impl Dashboard {
    /// Create a dashboard with default configuration.
    pub fn new() -> Self {
        Self::with_config(DashboardConfig::default())
    }

    /// Create a dashboard with custom configuration.
    pub fn with_config(config: DashboardConfig) -> Self {
        let classifier = ColumnClassifier::with_config(config.classifier.clone());
        Self {
            config,
            classifier,
            store: DatasetStore::new(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Load a baseline file from disk.
    pub fn load_baseline_path(&self, path: impl AsRef<Path>) -> Result<LoadSummary> {
        let (dataset, source) = input::load_path(path, &self.config.parser)?;
        self.load_baseline(dataset, source)
    }

    /// Load a baseline from uploaded bytes; `name` is an optional file name hint.
    pub fn load_baseline_bytes(&self, contents: &[u8], name: Option<&str>) -> Result<LoadSummary> {
        let (dataset, source) = input::load_bytes(contents, name, &self.config.parser)?;
        self.load_baseline(dataset, source)
    }

    /// Classify and store an already parsed baseline, dropping any overlay.
    pub fn load_baseline(&self, dataset: Dataset, source: SourceMetadata) -> Result<LoadSummary> {
        let classification = self.classifier.classify(&dataset)?;
        let loaded = self.store.load_baseline(LoadedDataset {
            dataset,
            source,
            classification,
        });

        log::info!(
            "loaded baseline {}: {} rows, {} categorical, {} numerical columns",
            loaded.source.file,
            loaded.dataset.row_count(),
            loaded.classification.categorical.len(),
            loaded.classification.numerical.len()
        );

        let c = &loaded.classification;
        Ok(LoadSummary {
            categorical_columns: c.categorical.clone(),
            numerical_columns: c.numerical.clone(),
            identifier_column: c.identifier.clone(),
            filter_options: c.filter_options.clone(),
            total_row_count: loaded.dataset.row_count(),
            source: loaded.source.clone(),
        })
    }

    /// Load an overlay file from disk.
    pub fn load_overlay_path(&self, path: impl AsRef<Path>) -> Result<OverlaySummary> {
        let (dataset, source) = input::load_path(path, &self.overlay_parser()?)?;
        self.load_overlay(dataset, source)
    }

    /// Load an overlay from uploaded bytes.
    pub fn load_overlay_bytes(&self, contents: &[u8], name: Option<&str>) -> Result<OverlaySummary> {
        let (dataset, source) = input::load_bytes(contents, name, &self.overlay_parser()?)?;
        self.load_overlay(dataset, source)
    }

    /// Parser settings for an overlay: columns take the baseline's types
    /// instead of being inferred from the (usually much smaller) overlay.
    fn overlay_parser(&self) -> Result<ParserConfig> {
        let baseline = self.store.snapshot()?.baseline;
        Ok(self
            .config
            .parser
            .clone()
            .with_column_types(baseline.dataset.schema()))
    }

    /// Store an already parsed overlay.
    ///
    /// Columns are re-typed to the baseline's types so one filter value
    /// selects the same cells in both tables. Fails with `SchemaMismatch` if
    /// its column names differ from the baseline's, and with `NoDataLoaded`
    /// if there is no baseline.
    pub fn load_overlay(&self, dataset: Dataset, source: SourceMetadata) -> Result<OverlaySummary> {
        let baseline = self.store.snapshot()?.baseline;
        let dataset = input::conform_types(dataset, baseline.dataset.schema())?;
        let classification = self.classifier.classify(&dataset)?;
        let loaded = self.store.load_overlay(LoadedDataset {
            dataset,
            source,
            classification,
        })?;

        log::info!(
            "loaded overlay {}: {} rows",
            loaded.source.file,
            loaded.dataset.row_count()
        );

        Ok(OverlaySummary {
            overlay_row_count: loaded.dataset.row_count(),
            source: loaded.source.clone(),
        })
    }

    /// Drop the overlay, if any. Returns whether one was loaded.
    pub fn clear_overlay(&self) -> bool {
        let cleared = self.store.clear_overlay();
        if cleared {
            log::info!("overlay cleared");
        }
        cleared
    }

    pub fn has_baseline(&self) -> bool {
        self.store.has_baseline()
    }

    pub fn has_overlay(&self) -> bool {
        self.store.has_overlay()
    }

    /// Column classification of the current baseline.
    pub fn columns(&self) -> Result<Classification> {
        Ok(self.store.snapshot()?.baseline.classification.clone())
    }

    /// Dropdown options of the current baseline.
    pub fn filter_options(&self) -> Result<IndexMap<String, Vec<String>>> {
        Ok(self.store.snapshot()?.baseline.classification.filter_options.clone())
    }

    /// Metadata of the current baseline and overlay sources.
    pub fn sources(&self) -> Result<(SourceMetadata, Option<SourceMetadata>)> {
        let snapshot = self.store.snapshot()?;
        Ok((
            snapshot.baseline.source.clone(),
            snapshot.overlay.as_ref().map(|o| o.source.clone()),
        ))
    }

    /// Rows of the baseline and overlay that match `spec`.
    pub fn query(&self, spec: &FilterSpec) -> Result<QueryResult> {
        self.query_within(spec, &RangeSpec::new())
    }

    /// Rows of the baseline and overlay that match `spec` and fall inside
    /// `ranges`.
    pub fn query_within(&self, spec: &FilterSpec, ranges: &RangeSpec) -> Result<QueryResult> {
        let snapshot = self.store.snapshot()?;
        let baseline = &snapshot.baseline;
        let view = select(baseline, spec, ranges)?;

        let overlay_rows = match &snapshot.overlay {
            Some(overlay) => select_overlay(baseline, overlay, spec, ranges)?.to_rows(),
            None => Vec::new(),
        };

        Ok(QueryResult {
            matched_count: view.len(),
            rows: view.to_rows(),
            total_count: baseline.dataset.row_count(),
            overlay_matched_count: overlay_rows.len(),
            overlay_rows,
        })
    }

    /// Box-plot statistics for every numerical column under `spec`.
    pub fn stats(&self, spec: &FilterSpec) -> Result<StatsMap> {
        self.stats_within(spec, &RangeSpec::new())
    }

    /// Box-plot statistics under `spec` and `ranges`. The ranges narrow the
    /// overlay the same way they narrow the baseline.
    pub fn stats_within(&self, spec: &FilterSpec, ranges: &RangeSpec) -> Result<StatsMap> {
        let snapshot = self.store.snapshot()?;
        let baseline = &snapshot.baseline;
        let view = select(baseline, spec, ranges)?;
        let overlay_view = match &snapshot.overlay {
            Some(overlay) => Some(select_overlay(baseline, overlay, spec, ranges)?),
            None => None,
        };

        compute_stats(
            &view,
            overlay_view.as_ref(),
            &baseline.classification.numerical,
            baseline.classification.identifier.as_deref(),
        )
    }

    /// Count, mean, min and max of each numerical column over the selected
    /// baseline rows.
    pub fn metrics(&self, spec: &FilterSpec, ranges: &RangeSpec) -> Result<MetricsMap> {
        let baseline = self.store.snapshot()?.baseline;
        let view = select(&baseline, spec, ranges)?;
        aggregate::column_metrics(&view, &baseline.classification.numerical)
    }

    /// How often each value of a categorical column occurs in the selected
    /// baseline rows.
    pub fn value_counts(
        &self,
        spec: &FilterSpec,
        ranges: &RangeSpec,
        column: &str,
    ) -> Result<Vec<ValueCount>> {
        let baseline = self.store.snapshot()?.baseline;
        check_categorical(&baseline, column)?;
        let view = select(&baseline, spec, ranges)?;
        aggregate::value_counts(&view, column)
    }

    /// Numerical aggregates per value of a categorical column.
    pub fn breakdown(
        &self,
        spec: &FilterSpec,
        ranges: &RangeSpec,
        column: &str,
    ) -> Result<Vec<GroupBreakdown>> {
        let baseline = self.store.snapshot()?.baseline;
        check_categorical(&baseline, column)?;
        let view = select(&baseline, spec, ranges)?;
        aggregate::breakdown(&view, column, &baseline.classification.numerical)
    }

    /// Pearson correlation between the numerical columns of the selected
    /// baseline rows.
    pub fn correlation(&self, spec: &FilterSpec, ranges: &RangeSpec) -> Result<CorrelationMatrix> {
        let baseline = self.store.snapshot()?.baseline;
        let view = select(&baseline, spec, ranges)?;
        aggregate::correlation(&view, &baseline.classification.numerical)
    }

    /// Packages valid for an assay type; see [`cascade::packages_for`].
    pub fn packages_for(&self, assay_type: &str) -> Option<&'static [&'static str]> {
        cascade::packages_for(assay_type)
    }

    /// Currently stored baseline, for callers that need direct access.
    pub fn baseline(&self) -> Result<Arc<LoadedDataset>> {
        Ok(self.store.snapshot()?.baseline)
    }
}

/// Apply `spec`, then `ranges`, to a loaded dataset. Ranges may only name
/// the baseline's numerical columns.
fn select<'a>(
    loaded: &'a LoadedDataset,
    spec: &FilterSpec,
    ranges: &RangeSpec,
) -> Result<FilteredView<'a>> {
    check_ranges(loaded, ranges)?;
    restrict(apply(&loaded.dataset, spec)?, ranges)
}

/// Overlay selection, with ranges checked against the baseline's columns.
fn select_overlay<'a>(
    baseline: &LoadedDataset,
    overlay: &'a LoadedDataset,
    spec: &FilterSpec,
    ranges: &RangeSpec,
) -> Result<FilteredView<'a>> {
    check_ranges(baseline, ranges)?;
    restrict(apply(&overlay.dataset, spec)?, ranges)
}

fn check_ranges(loaded: &LoadedDataset, ranges: &RangeSpec) -> Result<()> {
    for (column, _) in ranges.iter() {
        loaded.dataset.column_index(column)?;
        if !loaded.classification.numerical.iter().any(|c| c == column) {
            return Err(DashboardError::InvalidFilter(format!(
                "'{column}' is not a numerical column"
            )));
        }
    }
    Ok(())
}

fn check_categorical(loaded: &LoadedDataset, column: &str) -> Result<()> {
    loaded.dataset.column_index(column)?;
    if !loaded.classification.categorical.iter().any(|c| c == column) {
        return Err(DashboardError::InvalidFilter(format!(
            "'{column}' is not a categorical column"
        )));
    }
    Ok(())
}
