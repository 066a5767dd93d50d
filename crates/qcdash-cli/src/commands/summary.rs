//! Summary command - box-plot statistics and means for a filtered table.

use std::path::PathBuf;

use colored::Colorize;
use qcdash::cascade::display_label;
use qcdash::{FilterSpec, RangeSpec};

use super::load_dashboard;
use crate::cli::{LoadArgs, SelectArgs};

pub fn run(
    file: PathBuf,
    overlay: Option<PathBuf>,
    select: &SelectArgs,
    json_output: bool,
    load: &LoadArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (spec, ranges) = select.selection()?;
    let dashboard = load_dashboard(&file, overlay.as_deref(), load)?;

    let result = dashboard.query_within(&spec, &ranges)?;
    let stats = dashboard.stats_within(&spec, &ranges)?;
    let metrics = dashboard.metrics(&spec, &ranges)?;

    if json_output {
        let output = serde_json::json!({
            "file": file.display().to_string(),
            "filters": spec,
            "ranges": ranges,
            "matched_count": result.matched_count,
            "total_count": result.total_count,
            "overlay_matched_count": result.overlay_matched_count,
            "stats": stats,
            "metrics": metrics,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Statistics for".cyan().bold(),
        file.display().to_string().white()
    );
    print_selection(&spec, &ranges);
    println!(
        "  Matched: {} of {} rows",
        result.matched_count.to_string().white().bold(),
        result.total_count
    );
    if overlay.is_some() {
        println!(
            "  Overlay: {} matching rows",
            result.overlay_matched_count.to_string().magenta()
        );
    }
    println!();

    if stats.is_empty() {
        println!("{}", "No numerical columns found.".yellow());
        return Ok(());
    }

    let width = stats.keys().map(|k| k.len()).max().unwrap_or(0).max(6);
    println!(
        "  {:<width$}  {:>6}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}",
        "Column", "N", "Mean", "Min", "Q1", "Median", "Q3", "Max"
    );

    for (column, bundle) in &stats {
        let mean = metrics.get(column).and_then(|m| m.mean).unwrap_or(f64::NAN);
        match &bundle.summary {
            Some(s) => println!(
                "  {:<width$}  {:>6}  {:>10.2}  {:>10.3}  {:>10.3}  {:>10.3}  {:>10.3}  {:>10.3}",
                column, bundle.count, mean, s.min, s.q1, s.median, s.q3, s.max
            ),
            None => println!(
                "  {:<width$}  {:>6}  {}",
                column,
                0,
                "no values".dimmed()
            ),
        }

        for point in &bundle.overlay_points {
            println!(
                "  {:<width$}  {} {} = {}",
                "",
                "◆".magenta(),
                point.label,
                point.value
            );
        }
    }

    Ok(())
}

/// Print the active filters and ranges, if any.
pub fn print_selection(spec: &FilterSpec, ranges: &RangeSpec) {
    if !spec.is_unconstrained() {
        let active: Vec<String> = spec
            .active()
            .map(|(col, value)| format!("{}={}", display_label(col), value))
            .collect();
        println!("  Filters: {}", active.join(", "));
    }
    if !ranges.is_empty() {
        let bounds: Vec<String> = ranges
            .iter()
            .map(|(col, r)| {
                let lo = r.min.map(|v| v.to_string()).unwrap_or_default();
                let hi = r.max.map(|v| v.to_string()).unwrap_or_default();
                format!("{col}={lo}:{hi}")
            })
            .collect();
        println!("  Ranges:  {}", bounds.join(", "));
    }
}
