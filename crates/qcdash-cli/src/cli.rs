//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use qcdash::{ClassifierConfig, DashboardConfig, FilterSpec, ParserConfig, RangeSpec};

/// qcdash: sequencing QC dashboard
#[derive(Parser)]
#[command(name = "qcdash")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the dashboard JSON API
    Serve {
        /// Baseline file to load at startup (CSV/TSV/Parquet)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Overlay file to load at startup
        #[arg(long, requires = "file")]
        overlay: Option<PathBuf>,

        /// Port for web server
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Largest accepted upload, in megabytes
        #[arg(long, default_value = "256")]
        max_upload_mb: usize,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Print box-plot statistics for every numerical column
    Summary {
        /// Baseline file (CSV/TSV/Parquet)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Overlay file plotted against the baseline
        #[arg(long)]
        overlay: Option<PathBuf>,

        #[command(flatten)]
        select: SelectArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Print the rows matching a filter
    Query {
        /// Baseline file (CSV/TSV/Parquet)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Overlay file filtered alongside the baseline
        #[arg(long)]
        overlay: Option<PathBuf>,

        #[command(flatten)]
        select: SelectArgs,

        /// Maximum rows to print
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Print value counts and per-value metrics of a categorical column
    Breakdown {
        /// Baseline file (CSV/TSV/Parquet)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Categorical column to group by
        #[arg(short, long, value_name = "COLUMN")]
        by: String,

        #[command(flatten)]
        select: SelectArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Print the correlation matrix of the numerical columns
    Correlation {
        /// Baseline file (CSV/TSV/Parquet)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Show which packages are valid for an assay type
    Packages {
        /// Assay type (omit to list every type)
        #[arg(value_name = "TYPE")]
        assay_type: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Row selection shared by the commands that filter.
#[derive(Args, Clone, Debug, Default)]
pub struct SelectArgs {
    /// Filter as COLUMN=VALUE (repeatable, combined with AND)
    #[arg(short, long = "filter", value_name = "COLUMN=VALUE")]
    pub filters: Vec<String>,

    /// Inclusive range on a numerical column as COLUMN=MIN:MAX; either bound may be empty
    #[arg(short, long = "range", value_name = "COLUMN=MIN:MAX")]
    pub ranges: Vec<String>,
}

impl SelectArgs {
    pub fn selection(&self) -> qcdash::Result<(FilterSpec, RangeSpec)> {
        let spec = FilterSpec::parse_assignments(self.filters.iter().map(String::as_str))?;
        let ranges = RangeSpec::parse_assignments(self.ranges.iter().map(String::as_str))?;
        Ok((spec, ranges))
    }
}

/// Options shared by every command that loads files.
#[derive(Args, Clone, Debug, Default)]
pub struct LoadArgs {
    /// Field delimiter (auto-detected when omitted)
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Extra identifier column name (repeatable)
    #[arg(long = "id-column", value_name = "NAME")]
    pub id_columns: Vec<String>,
}

impl LoadArgs {
    /// Build the library configuration from the flags.
    pub fn dashboard_config(&self) -> Result<DashboardConfig, String> {
        let mut parser = ParserConfig::default();
        if let Some(d) = self.delimiter {
            let byte = u8::try_from(d)
                .ok()
                .filter(u8::is_ascii)
                .ok_or_else(|| format!("Delimiter must be a single ASCII character, got '{d}'"))?;
            parser = parser.with_delimiter(byte);
        }

        let classifier = self
            .id_columns
            .iter()
            .fold(ClassifierConfig::default(), |c, name| c.with_identifier(name.clone()));

        Ok(DashboardConfig { parser, classifier })
    }
}
