//! qcdash: query layer for sequencing QC dashboards.
//!
//! Loads a baseline table of per-sample QC metrics, splits its columns into
//! categorical filters and numerical metrics, and answers filtered queries
//! with box-plot statistics. A second "overlay" table with the same columns
//! can be loaded to plot new samples against the baseline distribution.
//!
//! # Core Principles
//!
//! - **Read-only**: Loaded tables are immutable; filtering yields row views
//! - **One filter, two tables**: The same spec narrows baseline and overlay
//! - **Overlay never skews**: Box-plot statistics come from the baseline only
//!
//! # Example
//!
//! ```no_run
//! use qcdash::{Dashboard, FilterSpec};
//!
//! let dashboard = Dashboard::new();
//! dashboard.load_baseline_path("qc_runs.csv").unwrap();
//!
//! let spec = FilterSpec::new().with("Assay", "mRNA Enrichment");
//! let stats = dashboard.stats(&spec).unwrap();
//! for (column, bundle) in &stats {
//!     println!("{column}: {} values", bundle.count);
//! }
//! ```

pub mod aggregate;
pub mod cascade;
pub mod classify;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod input;
pub mod schema;
pub mod stats;
pub mod store;

mod dashboard;

pub use crate::dashboard::{Dashboard, DashboardConfig, LoadSummary, OverlaySummary, QueryResult};
pub use aggregate::{CorrelationMatrix, GroupBreakdown, MetricsMap, NumericAggregate, ValueCount};
pub use classify::{ALL, Classification, ClassifierConfig, ColumnClassifier};
pub use dataset::{Dataset, Row, Value};
pub use error::{DashboardError, Result};
pub use filter::{FilterSpec, FilterValue, FilteredView, NumericRange, RangeSpec};
pub use input::{ParserConfig, SourceMetadata};
pub use schema::{ColumnKind, ColumnSchema, ColumnType, TableSchema};
pub use stats::{FiveNumberSummary, OverlayPoint, StatBundle, StatsMap};
