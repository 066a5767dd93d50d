//! Breakdown command - value counts and per-value metrics of one column.

use std::path::PathBuf;

use colored::Colorize;
use qcdash::cascade::display_label;

use super::load_dashboard;
use super::summary::print_selection;
use crate::cli::{LoadArgs, SelectArgs};

pub fn run(
    file: PathBuf,
    by: &str,
    select: &SelectArgs,
    json_output: bool,
    load: &LoadArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (spec, ranges) = select.selection()?;
    let dashboard = load_dashboard(&file, None, load)?;

    let counts = dashboard.value_counts(&spec, &ranges, by)?;
    let groups = dashboard.breakdown(&spec, &ranges, by)?;

    if json_output {
        let output = serde_json::json!({
            "file": file.display().to_string(),
            "column": by,
            "counts": counts,
            "groups": groups,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Breakdown by".cyan().bold(),
        display_label(by).white().bold()
    );
    print_selection(&spec, &ranges);
    println!();

    if counts.is_empty() {
        println!("{}", "No matching rows.".yellow());
        return Ok(());
    }

    let total: usize = counts.iter().map(|c| c.count).sum();
    let width = counts.iter().map(|c| c.value.len()).max().unwrap_or(0).max(5);
    for count in &counts {
        let share = 100.0 * count.count as f64 / total as f64;
        println!(
            "  {:<width$}  {:>6}  {:>5.1}%",
            count.value, count.count, share
        );
    }

    for group in &groups {
        println!();
        println!("  {} ({} rows)", group.value.bold(), group.rows);
        for (column, agg) in &group.metrics {
            match (agg.mean, agg.min, agg.max) {
                (Some(mean), Some(min), Some(max)) => println!(
                    "    {:<20}  mean {:>10.2}  min {:>10.2}  max {:>10.2}  n {}",
                    column, mean, min, max, agg.count
                ),
                _ => println!("    {:<20}  {}", column, "no values".dimmed()),
            }
        }
    }

    Ok(())
}
