//! Correlation command - Pearson matrix of the numerical columns.

use std::path::PathBuf;

use colored::Colorize;

use super::load_dashboard;
use super::summary::print_selection;
use crate::cli::{LoadArgs, SelectArgs};

pub fn run(
    file: PathBuf,
    select: &SelectArgs,
    json_output: bool,
    load: &LoadArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (spec, ranges) = select.selection()?;
    let dashboard = load_dashboard(&file, None, load)?;
    let matrix = dashboard.correlation(&spec, &ranges)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&matrix)?);
        return Ok(());
    }

    println!("{}", "Correlation matrix".cyan().bold());
    print_selection(&spec, &ranges);
    println!();

    if matrix.columns.is_empty() {
        println!("{}", "No numerical columns found.".yellow());
        return Ok(());
    }

    let width = matrix.columns.iter().map(|c| c.len()).max().unwrap_or(0).max(6);
    let header: Vec<String> = matrix
        .columns
        .iter()
        .map(|c| format!("{:>width$}", c))
        .collect();
    println!("  {:<width$}  {}", "", header.join("  ").bold());

    for (name, row) in matrix.columns.iter().zip(&matrix.coefficients) {
        let cells: Vec<String> = row
            .iter()
            .map(|r| match r {
                Some(r) => format!("{:>width$.2}", r),
                None => format!("{:>width$}", "-"),
            })
            .collect();
        println!("  {:<width$}  {}", name, cells.join("  "));
    }

    Ok(())
}
